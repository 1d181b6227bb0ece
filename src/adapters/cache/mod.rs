//! Response cache adapters.
//!
//! - `InMemoryResponseCache` - process-local map with lazy expiry
//! - `RedisResponseCache` - shared cache with server-side expiry

mod in_memory;
mod redis_cache;

pub use in_memory::InMemoryResponseCache;
pub use redis_cache::RedisResponseCache;
