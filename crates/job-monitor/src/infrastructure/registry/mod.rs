pub mod memory;
pub mod redis;

pub use memory::InMemoryContainerRegistry;
pub use self::redis::RedisContainerRegistry;
