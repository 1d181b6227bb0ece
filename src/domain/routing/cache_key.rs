//! Response cache keys and entries.
//!
//! Keys are derived before routing so a hit saves the classification call as
//! well as generation. The resolved intent is therefore not part of the key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::conversation::{recent, Message};
use crate::domain::foundation::{Timestamp, UserId};

use super::Intent;

const FIELD_SEPARATOR: &[u8] = b"\x1f";

/// Lowercases, trims, and collapses internal whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hash of the last `turns` messages, oldest first.
pub fn history_signature(history: &[Message], turns: usize) -> String {
    let mut hasher = Sha256::new();
    for message in recent(history, turns) {
        hasher.update(message.role().as_str().as_bytes());
        hasher.update(b":");
        hasher.update(message.content().as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }
    format!("{:x}", hasher.finalize())
}

/// Stable key identifying (normalized text, recent history, user).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(text: &str, history: &[Message], history_turns: usize, user_id: &UserId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_text(text).as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(history_signature(history, history_turns).as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(user_id.as_str().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wraps an already-derived key.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A previously produced reply, valid until `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub response: String,
    pub intent: Intent,
    pub agent: String,
    pub confidence: f64,
    pub expires_at: Timestamp,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        !self.expires_at.is_after(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConversationId;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn message(content: &str) -> Message {
        Message::user(
            ConversationId::new("conv-1").unwrap(),
            user("u1"),
            content,
            Timestamp::now(),
        )
    }

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize_text("  Hello   WORLD\n\t!  "), "hello world !");
    }

    #[test]
    fn key_ignores_formatting_differences() {
        let a = CacheKey::derive("Hello there", &[], 3, &user("u1"));
        let b = CacheKey::derive("  hello   THERE ", &[], 3, &user("u1"));
        assert_eq!(a, b);
    }

    #[test]
    fn key_depends_on_user() {
        let a = CacheKey::derive("Hello", &[], 3, &user("u1"));
        let b = CacheKey::derive("Hello", &[], 3, &user("u2"));
        assert_ne!(a, b);
    }

    #[test]
    fn key_depends_on_recent_history_only() {
        let older = vec![message("old"), message("a"), message("b"), message("c")];
        let other_older = vec![message("different"), message("a"), message("b"), message("c")];
        let changed_recent = vec![message("old"), message("a"), message("b"), message("z")];

        let base = CacheKey::derive("Hi", &older, 3, &user("u1"));
        assert_eq!(base, CacheKey::derive("Hi", &other_older, 3, &user("u1")));
        assert_ne!(base, CacheKey::derive("Hi", &changed_recent, 3, &user("u1")));
    }

    #[test]
    fn key_is_hex_sha256() {
        let key = CacheKey::derive("Hello", &[], 3, &user("u1"));
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn entry_expiry_is_exclusive_of_deadline() {
        let now = Timestamp::now();
        let entry = CacheEntry {
            key: CacheKey::from_hex("k"),
            response: "hi".to_string(),
            intent: Intent::Greeting,
            agent: "GreetingAgent".to_string(),
            confidence: 0.9,
            expires_at: now,
        };
        assert!(entry.is_expired_at(&now));
        assert!(!entry.is_expired_at(&Timestamp::from_datetime(
            *now.as_datetime() - chrono::Duration::seconds(1)
        )));
    }
}
