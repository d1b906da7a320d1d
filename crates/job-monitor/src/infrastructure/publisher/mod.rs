pub mod channel;
pub mod http;

pub use channel::ChannelPublisher;
pub use http::HttpPublisher;
