//! GetHistoryHandler - read-only view of a conversation.
//!
//! Reads straight through to the store without taking the conversation
//! lock, so a turn being written concurrently may not be visible yet.

use crate::application::routing::ConversationStateStore;
use crate::domain::conversation::Message;
use crate::domain::foundation::ConversationId;

use super::RoutingError;

/// Query for a conversation's messages.
#[derive(Debug, Clone)]
pub struct GetHistoryQuery {
    pub conversation_id: String,
}

impl GetHistoryQuery {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetHistoryResult {
    pub conversation_id: ConversationId,
    /// Oldest first.
    pub messages: Vec<Message>,
}

pub struct GetHistoryHandler {
    state: ConversationStateStore,
}

impl GetHistoryHandler {
    pub fn new(state: ConversationStateStore) -> Self {
        Self { state }
    }

    pub async fn handle(&self, query: GetHistoryQuery) -> Result<GetHistoryResult, RoutingError> {
        let conversation_id = ConversationId::new(query.conversation_id)?;
        let messages = self.state.load(&conversation_id).await?;

        Ok(GetHistoryResult {
            conversation_id,
            messages,
        })
    }
}
