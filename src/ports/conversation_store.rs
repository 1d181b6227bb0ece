//! Conversation Store Port - Interface for persisting conversation messages.
//!
//! The durable medium behind the conversation state store. Implementations
//! must keep messages in append order and make each `append` call atomic:
//! either every message of the batch becomes visible or none does.
//!
//! Serialization of concurrent writers is not the adapter's job; the
//! `ConversationStateStore` holds a per-conversation lock around every turn.

use async_trait::async_trait;

use crate::domain::conversation::Message;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during conversation storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The medium could not be reached or refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("Corrupt conversation data: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StorageError::Unavailable(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        StorageError::Corrupt(message.into())
    }
}

/// Port for loading and appending conversation messages
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load every message of a conversation, oldest first.
    ///
    /// An unknown conversation yields an empty vector, not an error.
    async fn load(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, StorageError>;

    /// Append messages, in order, as one atomic operation.
    ///
    /// Creates the conversation if it does not exist yet.
    async fn append(
        &self,
        conversation_id: &ConversationId,
        messages: &[Message],
    ) -> Result<(), StorageError>;

    /// Remove every message of a conversation.
    ///
    /// Succeeds silently for unknown or already empty conversations.
    async fn clear(&self, conversation_id: &ConversationId) -> Result<(), StorageError>;
}
