//! ResponseCache - best-effort memo of completed turns.
//!
//! Keyed before routing on (normalized text, recent history hash, user), so a
//! hit skips classification as well as generation. Expiry is TTL-only.
//! Backend failures are logged and treated as misses; they never fail a turn.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::conversation::Message;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::routing::{CacheEntry, CacheKey, Intent};
use crate::ports::CacheStore;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    /// Number of trailing history messages folded into the key.
    pub history_turns: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(30 * 60),
            history_turns: 3,
        }
    }
}

#[derive(Clone)]
pub struct ResponseCache {
    store: Option<Arc<dyn CacheStore>>,
    settings: CacheSettings,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, settings: CacheSettings) -> Self {
        let store = settings.enabled.then_some(store);
        Self { store, settings }
    }

    /// A cache that never hits and never stores.
    pub fn disabled() -> Self {
        Self {
            store: None,
            settings: CacheSettings {
                enabled: false,
                ..CacheSettings::default()
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn key_for(&self, text: &str, history: &[Message], user_id: &UserId) -> CacheKey {
        CacheKey::derive(text, history, self.settings.history_turns, user_id)
    }

    /// Live entry for `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let store = self.store.as_ref()?;

        match store.get(key).await {
            Ok(Some(entry)) if !entry.is_expired_at(&Timestamp::now()) => Some(entry),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cache_key = %key,
                    "Cache lookup failed, treating as miss"
                );
                None
            }
        }
    }

    /// Stores a completed turn for the configured TTL.
    pub async fn put(
        &self,
        key: CacheKey,
        response: &str,
        intent: Intent,
        agent: &str,
        confidence: f64,
    ) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let entry = CacheEntry {
            key,
            response: response.to_string(),
            intent,
            agent: agent.to_string(),
            confidence,
            expires_at: Timestamp::now().plus(self.settings.ttl),
        };

        if let Err(e) = store.put(entry, self.settings.ttl).await {
            tracing::warn!(error = %e, "Cache write failed, continuing without caching");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryResponseCache;
    use crate::ports::CacheError;
    use async_trait::async_trait;

    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn put(&self, _entry: CacheEntry, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[tokio::test]
    async fn round_trips_within_ttl() {
        let cache = ResponseCache::new(
            Arc::new(InMemoryResponseCache::new()),
            CacheSettings::default(),
        );
        let key = cache.key_for("Hello!", &[], &user());

        cache.put(key.clone(), "Hi!", Intent::Greeting, "GreetingAgent", 0.95).await;

        let hit = cache.get(&key).await.unwrap();
        assert_eq!(hit.response, "Hi!");
        assert_eq!(hit.intent, Intent::Greeting);
        assert_eq!(hit.confidence, 0.95);
    }

    #[tokio::test]
    async fn misses_after_ttl() {
        let cache = ResponseCache::new(
            Arc::new(InMemoryResponseCache::new()),
            CacheSettings {
                ttl: Duration::from_millis(20),
                ..CacheSettings::default()
            },
        );
        let key = cache.key_for("Hello!", &[], &user());
        cache.put(key.clone(), "Hi!", Intent::Greeting, "GreetingAgent", 0.95).await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn backend_failures_are_misses() {
        let cache = ResponseCache::new(Arc::new(BrokenCache), CacheSettings::default());
        let key = cache.key_for("Hello!", &[], &user());

        cache.put(key.clone(), "Hi!", Intent::Greeting, "GreetingAgent", 0.95).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn disabled_cache_never_stores() {
        let backend = InMemoryResponseCache::new();
        let cache = ResponseCache::new(
            Arc::new(backend.clone()),
            CacheSettings {
                enabled: false,
                ..CacheSettings::default()
            },
        );
        let key = cache.key_for("Hello!", &[], &user());

        cache.put(key.clone(), "Hi!", Intent::Greeting, "GreetingAgent", 0.95).await;

        assert!(!cache.is_enabled());
        assert!(backend.is_empty().await);
        assert!(ResponseCache::disabled().get(&key).await.is_none());
    }
}
