//! In-Memory Conversation Store Adapter
//!
//! Keeps every conversation in a map. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StorageError};

/// In-memory storage for conversations
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
}

impl InMemoryConversationStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversations holding at least one message
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Full conversation record, including its header
    pub async fn load_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Option<Conversation> {
        self.conversations.read().await.get(conversation_id).cloned()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, StorageError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .get(conversation_id)
            .map(|c| c.messages().to_vec())
            .unwrap_or_default())
    }

    async fn append(
        &self,
        conversation_id: &ConversationId,
        messages: &[Message],
    ) -> Result<(), StorageError> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut conversations = self.conversations.write().await;
        match conversations.get_mut(conversation_id) {
            Some(conversation) => conversation.extend(messages),
            None => {
                if let Some(conversation) =
                    Conversation::start(conversation_id.clone(), messages.to_vec())
                {
                    conversations.insert(conversation_id.clone(), conversation);
                }
            }
        }
        Ok(())
    }

    async fn clear(&self, conversation_id: &ConversationId) -> Result<(), StorageError> {
        self.conversations.write().await.remove(conversation_id);
        Ok(())
    }
}
