//! ClearConversationHandler - removes a conversation's history.
//!
//! Idempotent: clearing an unknown or empty conversation succeeds. Waits for
//! any in-flight turn on the same conversation before clearing.

use crate::application::routing::ConversationStateStore;
use crate::domain::foundation::ConversationId;

use super::RoutingError;

/// Command to clear a conversation.
#[derive(Debug, Clone)]
pub struct ClearConversationCommand {
    pub conversation_id: String,
}

impl ClearConversationCommand {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearConversationResult {
    pub conversation_id: ConversationId,
}

pub struct ClearConversationHandler {
    state: ConversationStateStore,
}

impl ClearConversationHandler {
    pub fn new(state: ConversationStateStore) -> Self {
        Self { state }
    }

    pub async fn handle(
        &self,
        cmd: ClearConversationCommand,
    ) -> Result<ClearConversationResult, RoutingError> {
        let conversation_id = ConversationId::new(cmd.conversation_id)?;

        self.state.clear(&conversation_id).await.map_err(|e| {
            tracing::error!(
                conversation_id = %conversation_id,
                error = %e,
                "Failed to clear conversation"
            );
            RoutingError::from(e)
        })?;

        tracing::info!(conversation_id = %conversation_id, "Conversation cleared");
        Ok(ClearConversationResult { conversation_id })
    }
}
