//! Routing configuration: confidence threshold, fallback, deadlines.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::routing::ClassifierSettings;
use crate::application::{OrchestratorSettings, DEFAULT_APOLOGY};
use crate::domain::routing::Intent;

/// Routing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Minimum confidence (inclusive) to honor the predicted intent
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Intent used when confidence is low or classification fails
    #[serde(default = "default_fallback_intent")]
    pub fallback_intent: Intent,

    /// Trailing history messages shown to the classifier and agents
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    #[serde(default = "default_classification_timeout_ms")]
    pub classification_timeout_ms: u64,

    #[serde(default = "default_handler_timeout_ms")]
    pub handler_timeout_ms: u64,

    /// Extra classification attempts after the first failure
    #[serde(default = "default_classification_retries")]
    pub classification_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    #[serde(default)]
    pub classifier: ClassifierBackend,
}

/// Which classification capability to run
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    #[default]
    Llm,
    /// Deterministic keyword rules, no provider calls
    Keyword,
}

impl RoutingConfig {
    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            min_confidence: self.min_confidence,
            fallback_intent: self.fallback_intent,
            max_history_turns: self.max_history_turns,
            timeout: Duration::from_millis(self.classification_timeout_ms),
            retries: self.classification_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            handler_timeout: Duration::from_millis(self.handler_timeout_ms),
            max_message_chars: self.max_message_chars,
            apology: DEFAULT_APOLOGY.to_string(),
        }
    }

    /// Validate routing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ValidationError::InvalidConfidence(self.min_confidence));
        }
        if !self.fallback_intent.is_routable() {
            return Err(ValidationError::InvalidFallbackIntent(
                self.fallback_intent.to_string(),
            ));
        }
        if self.classification_timeout_ms == 0 {
            return Err(ValidationError::MustBePositive("routing.classification_timeout_ms"));
        }
        if self.handler_timeout_ms == 0 {
            return Err(ValidationError::MustBePositive("routing.handler_timeout_ms"));
        }
        if self.max_message_chars == 0 {
            return Err(ValidationError::MustBePositive("routing.max_message_chars"));
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            fallback_intent: default_fallback_intent(),
            max_history_turns: default_max_history_turns(),
            classification_timeout_ms: default_classification_timeout_ms(),
            handler_timeout_ms: default_handler_timeout_ms(),
            classification_retries: default_classification_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_message_chars: default_max_message_chars(),
            classifier: ClassifierBackend::default(),
        }
    }
}

fn default_min_confidence() -> f64 {
    0.6
}

fn default_fallback_intent() -> Intent {
    Intent::Greeting
}

fn default_max_history_turns() -> usize {
    6
}

fn default_classification_timeout_ms() -> u64 {
    5_000
}

fn default_handler_timeout_ms() -> u64 {
    30_000
}

fn default_classification_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_max_message_chars() -> usize {
    10_000
}
