//! Agent Handler Port - the capability that produces reply text.
//!
//! Every agent, whatever its specialty, is reached through this one trait.
//! The registry maps intents to `Arc<dyn AgentHandler>` once at startup.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::conversation::Message;
use crate::domain::routing::TurnContext;

/// Reply produced by an agent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentReply {
    pub content: String,
    /// Optional free-form details (model used, token counts, ...).
    pub metadata: BTreeMap<String, String>,
}

impl AgentReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Agent failure. Never surfaced to the end user.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The generation backend failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The backend answered with nothing usable.
    #[error("agent produced an empty response")]
    EmptyResponse,

    /// Any other internal failure.
    #[error("agent failure: {0}")]
    Internal(String),
}

/// Port for a specialized responder.
#[async_trait]
pub trait AgentHandler: Send + Sync {
    /// Name recorded on persisted replies.
    fn name(&self) -> &str;

    /// Produce a reply to `message` given the prior `history`, oldest first.
    ///
    /// `context` identifies the turn; outbound calls should carry its
    /// request id.
    async fn handle(
        &self,
        context: &TurnContext,
        message: &str,
        history: &[Message],
    ) -> Result<AgentReply, HandlerError>;
}
