//! Conversation - ordered, append-only message log.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp, UserId};

use super::Message;

/// A conversation and its full message history.
///
/// Created implicitly by the first append. Messages are kept in append order,
/// which is also strictly increasing timestamp order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    user_id: UserId,
    messages: Vec<Message>,
    created_at: Timestamp,
    last_activity_at: Timestamp,
}

impl Conversation {
    /// Starts a conversation from its first batch of messages.
    ///
    /// Returns `None` for an empty batch: a conversation never exists without messages.
    pub fn start(id: ConversationId, messages: Vec<Message>) -> Option<Self> {
        let first = messages.first()?;
        let user_id = first.user_id().clone();
        let created_at = first.timestamp();
        let last_activity_at = messages.last().map(|m| m.timestamp()).unwrap_or(created_at);

        Some(Self {
            id,
            user_id,
            messages,
            created_at,
            last_activity_at,
        })
    }

    /// Appends messages in order.
    pub fn extend(&mut self, messages: &[Message]) {
        if let Some(last) = messages.last() {
            self.last_activity_at = last.timestamp();
        }
        self.messages.extend_from_slice(messages);
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
