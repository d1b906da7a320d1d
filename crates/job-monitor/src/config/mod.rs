pub mod cli;
pub mod daemon;
pub mod job_types;

pub use cli::*;
pub use daemon::*;
pub use job_types::*;
