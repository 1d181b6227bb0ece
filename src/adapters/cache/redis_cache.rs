//! Redis-backed response cache for multi-instance deployments.
//!
//! Entries are stored as JSON under `agent-router:response:<key>` with
//! `SET ... EX ttl`, so Redis handles expiry.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::routing::{CacheEntry, CacheKey};
use crate::ports::{CacheError, CacheStore};

const KEY_PREFIX: &str = "agent-router:response:";

#[derive(Clone)]
pub struct RedisResponseCache {
    conn: MultiplexedConnection,
}

impl RedisResponseCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }
}

fn redis_key(key: &CacheKey) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

#[async_trait]
impl CacheStore for RedisResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(redis_key(key))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn put(&self, entry: CacheEntry, ttl: Duration) -> Result<(), CacheError> {
        let json =
            serde_json::to_string(&entry).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(redis_key(&entry.key))
            .arg(json)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        let key = CacheKey::from_hex("abc123");
        assert_eq!(redis_key(&key), "agent-router:response:abc123");
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let result = RedisResponseCache::connect("redis://127.0.0.1:9/").await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }
}
