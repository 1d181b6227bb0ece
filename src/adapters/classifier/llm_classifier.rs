//! LLM-backed classification service.
//!
//! Asks the model for a single JSON object `{"intent": ..., "confidence": ...}`
//! and parses it. Surrounding prose and markdown fences are tolerated; a reply
//! without a usable object or confidence is `Malformed`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, ClassificationPrompt, ClassificationService, ClassifierError,
    CompletionRequest, MessageRole, RawClassification, RequestMetadata,
};

const SYSTEM_PROMPT: &str = r#"You are a precise intent classifier. Classify the user's latest message into exactly ONE category, using earlier turns only as context.

Categories, applied in this order:
1. greeting - ONLY simple greetings or small talk with no other request ("Hello", "Good morning", "How are you?")
2. database - employee data, staff information, company records, or record operations ("List employees", "Show John's details", "Delete employee EMP123")
3. celebration - celebration posts, announcements, or wishes for birthdays, anniversaries, promotions, achievements, festivals, events ("Create a birthday post for John")
4. email - ONLY when "email" or "letter" is explicitly mentioned in the context of writing or drafting ("Write an email to my manager")
5. research - requests for information, explanations, or knowledge ("Explain machine learning")
6. unknown - none of the above, or the message is unintelligible

Rules:
- "post", "wishes", "announcement", or "celebrate" means celebration, NOT email
- "write an EMAIL for a birthday" is email because email is explicit

Respond with ONLY a JSON object and nothing else:
{"intent": "<category>", "confidence": <number between 0 and 1>}"#;

/// Classification service that asks an LLM.
pub struct LlmClassificationService {
    provider: Arc<dyn AIProvider>,
    max_tokens: u32,
}

impl LlmClassificationService {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            max_tokens: 50,
        }
    }

    pub fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }
}

#[async_trait]
impl ClassificationService for LlmClassificationService {
    async fn classify(
        &self,
        prompt: &ClassificationPrompt,
    ) -> Result<RawClassification, ClassifierError> {
        let metadata = match &prompt.context {
            Some(context) => RequestMetadata::for_turn(context),
            None => RequestMetadata::new("intent-classification"),
        };
        let request = CompletionRequest::new(metadata)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, prompt.text.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0);

        let response = self.provider.complete(request).await.map_err(|err| match err {
            AIError::Timeout { timeout_secs } => {
                ClassifierError::Timeout(Duration::from_secs(u64::from(timeout_secs)))
            }
            other => ClassifierError::Unavailable(other.to_string()),
        })?;

        parse_reply(&response.content)
    }
}

/// Extracts `{"intent", "confidence"}` from a model reply.
pub fn parse_reply(content: &str) -> Result<RawClassification, ClassifierError> {
    let start = content
        .find('{')
        .ok_or_else(|| {
            ClassifierError::Malformed(format!("no JSON object in {:?}", truncate(content)))
        })?;
    let end = content
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| {
            ClassifierError::Malformed(format!("unterminated JSON in {:?}", truncate(content)))
        })?;

    let value: Value = serde_json::from_str(&content[start..=end])
        .map_err(|e| ClassifierError::Malformed(format!("invalid JSON: {}", e)))?;

    let label = value
        .get("intent")
        .or_else(|| value.get("label"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClassifierError::Malformed("missing \"intent\" field".to_string()))?;

    let confidence = match value.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|c| c.is_finite())
    .ok_or_else(|| {
        ClassifierError::Malformed("missing or non-numeric \"confidence\"".to_string())
    })?;

    Ok(RawClassification::new(label.trim(), confidence))
}

fn truncate(s: &str) -> String {
    s.chars().take(80).collect()
}
