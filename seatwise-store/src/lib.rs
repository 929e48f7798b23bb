pub mod app_config;
pub mod kafka;
pub mod memory;
pub mod redis_store;

pub use app_config::Config;
pub use kafka::{KafkaJobSource, KafkaQueue};
pub use memory::{MemoryQueue, MemoryStore};
pub use redis_store::RedisStore;
