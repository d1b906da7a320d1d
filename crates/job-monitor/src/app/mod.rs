//! Application module
//!
//! Wiring and lifecycle of the monitor daemon: building services, spawning
//! one watcher task per job type, and shutting down on SIGTERM / SIGINT.

pub mod builder;
pub mod core;
pub mod services;
pub mod tasks;

pub use builder::ApplicationBuilder;
pub use core::Application;
pub use services::ApplicationServices;
