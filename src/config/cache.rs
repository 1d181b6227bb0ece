//! Response cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::CacheSettings;

/// Response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: CacheBackend,

    /// Redis connection URL for the redis backend
    pub redis_url: Option<String>,

    /// Entry lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Trailing history messages folded into the cache key
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// How often the memory backend sweeps out expired entries
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            enabled: self.enabled,
            ttl: self.ttl(),
            history_turns: self.history_turns,
        }
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("cache.ttl_secs"));
        }
        if self.backend == CacheBackend::Memory && self.purge_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("cache.purge_interval_secs"));
        }
        if self.backend == CacheBackend::Redis {
            let url = self
                .redis_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or(ValidationError::MissingRequired("CACHE__REDIS_URL"))?;
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            backend: CacheBackend::default(),
            redis_url: None,
            ttl_secs: default_ttl(),
            history_turns: default_history_turns(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_ttl() -> u64 {
    1800
}

fn default_history_turns() -> usize {
    3
}

fn default_purge_interval() -> u64 {
    60
}
