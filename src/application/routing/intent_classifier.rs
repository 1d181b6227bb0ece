//! IntentClassifier - turns a message plus recent history into an `IntentResult`.
//!
//! Wraps the external `ClassificationService` with:
//! - a bounded history window (oldest turns dropped first)
//! - a bounded number of retries with a fixed backoff
//! - one overall deadline covering every attempt
//! - the confidence threshold and fallback policy
//!
//! It never returns an error. An outage becomes a fallback result with
//! `classification_unavailable` set and confidence 0.0.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::conversation::{recent, Message};
use crate::domain::routing::{
    ConfidencePolicy, Intent, IntentResult, TurnContext, DEFAULT_MIN_CONFIDENCE,
};
use crate::ports::{ClassificationPrompt, ClassificationService, ClassifierError, RawClassification};

/// Tuning for the classifier wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub min_confidence: f64,
    pub fallback_intent: Intent,
    pub max_history_turns: usize,
    /// Deadline for the whole classification, retries included.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            fallback_intent: Intent::Greeting,
            max_history_turns: 6,
            timeout: Duration::from_secs(5),
            retries: 1,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

pub struct IntentClassifier {
    service: Arc<dyn ClassificationService>,
    settings: ClassifierSettings,
    policy: ConfidencePolicy,
}

impl IntentClassifier {
    pub fn new(service: Arc<dyn ClassificationService>, settings: ClassifierSettings) -> Self {
        let policy = ConfidencePolicy::new(settings.min_confidence, settings.fallback_intent);
        Self {
            service,
            settings,
            policy,
        }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Classifies `text` in the context of `history` (oldest first).
    pub async fn classify(&self, text: &str, history: &[Message]) -> IntentResult {
        let prompt = render_prompt(text, recent(history, self.settings.max_history_turns));
        self.classify_prompt(prompt).await
    }

    /// Like `classify`, with the prompt tagged by the turn it belongs to.
    pub async fn classify_turn(
        &self,
        context: &TurnContext,
        text: &str,
        history: &[Message],
    ) -> IntentResult {
        let prompt = render_prompt(text, recent(history, self.settings.max_history_turns))
            .with_context(context.clone());
        self.classify_prompt(prompt).await
    }

    async fn classify_prompt(&self, prompt: ClassificationPrompt) -> IntentResult {
        let outcome = tokio::time::timeout(self.settings.timeout, self.attempt(&prompt)).await;

        match outcome {
            Ok(Ok(raw)) => {
                let predicted = Intent::parse_label(&raw.label);
                if predicted.is_none() {
                    tracing::debug!(
                        label = %raw.label,
                        "Classifier returned an unrecognized label"
                    );
                }
                let result = self.policy.apply(predicted, raw.confidence);
                if result.below_threshold {
                    tracing::info!(
                        predicted = %result.predicted,
                        confidence = result.confidence,
                        min_confidence = self.settings.min_confidence,
                        fallback = %result.label,
                        "Classification not trusted, routing to fallback"
                    );
                }
                result
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Classifier unavailable, routing to fallback");
                self.policy.unavailable()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.settings.timeout.as_millis() as u64,
                    "Classification deadline exceeded, routing to fallback"
                );
                self.policy.unavailable()
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &ClassificationPrompt,
    ) -> Result<RawClassification, ClassifierError> {
        let mut attempt = 0;
        loop {
            match self.service.classify(prompt).await {
                Ok(raw) => return Ok(raw),
                Err(e) if attempt < self.settings.retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        backoff_ms = self.settings.retry_backoff.as_millis() as u64,
                        "Classification attempt failed, retrying"
                    );
                    tokio::time::sleep(self.settings.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Renders the classification prompt: prior turns, then the new message.
pub fn render_prompt(text: &str, window: &[Message]) -> ClassificationPrompt {
    let mut rendered = String::new();
    if !window.is_empty() {
        rendered.push_str("Conversation so far:\n");
        for message in window {
            rendered.push_str(message.role().as_str());
            rendered.push_str(": ");
            rendered.push_str(message.content());
            rendered.push('\n');
        }
        rendered.push('\n');
    }
    rendered.push_str("User Message: \"");
    rendered.push_str(text);
    rendered.push('"');

    ClassificationPrompt::new(rendered, text)
}
