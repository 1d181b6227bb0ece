//! Mock AI Provider for tests and offline runs.
//!
//! Replies are scripted up front and consumed in order; once the script is
//! exhausted every call gets the default reply. Each request is recorded so
//! tests can inspect exactly what the classifier or an agent sent.
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"intent": "greeting", "confidence": 0.95}"#)
//!     .with_error(AIError::unavailable("overloaded"))
//!     .with_delay(Duration::from_millis(100));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

const MOCK_MODEL: &str = "mock-model-1";

#[derive(Debug, Clone)]
pub struct MockAIProvider {
    script: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    default_reply: String,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rough token estimate: four characters per token, at least one.
fn estimate_tokens(text: &str) -> u32 {
    (text.len() / 4).max(1) as u32
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: "Mock response".to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        locked(&self.script).push_back(Ok(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: AIError) -> Self {
        locked(&self.script).push_back(Err(error));
        self
    }

    /// Reply used once the script is exhausted.
    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.default_reply = content.into();
        self
    }

    /// Latency added before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    /// Every request received, oldest first.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        locked(&self.calls).clone()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let prompt_tokens = request
            .system_prompt
            .iter()
            .map(String::as_str)
            .chain(request.messages.iter().map(|m| m.content.as_str()))
            .map(estimate_tokens)
            .sum();
        locked(&self.calls).push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = locked(&self.script).pop_front();
        let content = next.unwrap_or_else(|| Ok(self.default_reply.clone()))?;
        let completion_tokens = estimate_tokens(&content);

        Ok(CompletionResponse {
            content,
            usage: TokenUsage::new(prompt_tokens, completion_tokens),
            model: MOCK_MODEL.to_string(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", MOCK_MODEL)
    }
}
