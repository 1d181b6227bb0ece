//! Cache Store Port - backing storage for the response cache.
//!
//! Expiry is TTL-only. Adapters may drop entries early (eviction, restarts);
//! callers treat every error as a miss.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::routing::{CacheEntry, CacheKey};

/// Cache backend failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache entry could not be decoded: {0}")]
    Serialization(String),
}

/// Port for a TTL key/value store of cached turns.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live entry for `key`, or `None` if absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Stores `entry` for at most `ttl`.
    async fn put(&self, entry: CacheEntry, ttl: Duration) -> Result<(), CacheError>;
}
