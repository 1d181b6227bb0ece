//! Classification Service Port - the external intent classification capability.
//!
//! Implementations receive a fully rendered prompt and return the label and
//! confidence the model produced. Thresholding, retries, deadlines, and the
//! fallback policy all live in the `IntentClassifier` component, not here.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::routing::TurnContext;

/// Prompt handed to the classification capability.
///
/// `text` is the full rendered prompt (recent history plus the new message).
/// `message` is the new message alone, for backends that do not need context.
/// `context` identifies the turn when the prompt was rendered for one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationPrompt {
    pub text: String,
    pub message: String,
    pub context: Option<TurnContext>,
}

impl ClassificationPrompt {
    pub fn new(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: TurnContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Raw, unvalidated classification output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClassification {
    /// Label as emitted; may lie outside the known intent set.
    pub label: String,
    /// Confidence as emitted; may lie outside [0, 1].
    pub confidence: f64,
}

impl RawClassification {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Why the classification capability could not answer.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// Transport failure or provider outage.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded its deadline.
    #[error("classifier timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The reply could not be interpreted.
    #[error("malformed classifier reply: {0}")]
    Malformed(String),
}

/// Port for the intent classification capability.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Classify one rendered prompt.
    ///
    /// # Errors
    ///
    /// - `Unavailable` on transport or provider failure
    /// - `Timeout` if the underlying call timed out
    /// - `Malformed` if the reply could not be parsed
    async fn classify(
        &self,
        prompt: &ClassificationPrompt,
    ) -> Result<RawClassification, ClassifierError>;
}
