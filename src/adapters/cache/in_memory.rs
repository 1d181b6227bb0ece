//! In-memory response cache for single-instance deployments and tests.
//!
//! Expiry is lazy: expired entries are dropped when read, or in bulk by
//! `purge_expired`. Keys fold in recent history, so most are never read
//! again; long-running processes drive `run_purge` in the background.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time;

use crate::domain::foundation::Timestamp;
use crate::domain::routing::{CacheEntry, CacheKey};
use crate::ports::{CacheError, CacheStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Timestamp::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(&now));
        before - entries.len()
    }

    /// Purges expired entries every `interval` until `shutdown` flips to true.
    pub async fn run_purge(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
                _ = ticker.tick() => {
                    let removed = self.purge_expired().await;
                    if removed > 0 {
                        tracing::debug!(removed, "Purged expired cache entries");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let now = Timestamp::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired_at(&now) => return Ok(Some(entry.clone())),
                Some(_) => {}
            }
        }

        // Expired: remove unless a fresher entry was written meanwhile.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired_at(&now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, mut entry: CacheEntry, ttl: Duration) -> Result<(), CacheError> {
        let deadline = Timestamp::now().plus(ttl);
        if deadline.is_before(&entry.expires_at) {
            entry.expires_at = deadline;
        }
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }
}
