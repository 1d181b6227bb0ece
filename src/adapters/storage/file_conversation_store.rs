//! File-based Conversation Store Adapter
//!
//! One YAML document per conversation under the base directory. Writes go to
//! a temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written conversation behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StorageError};

/// File-based storage for conversations
#[derive(Debug, Clone)]
pub struct FileConversationStore {
    base_path: PathBuf,
}

impl FileConversationStore {
    /// Create a store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileConversationStore::new("./data/conversations");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn file_path(&self, conversation_id: &ConversationId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", conversation_id))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::unavailable(e.to_string()))
    }

    async fn read(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, StorageError> {
        let path = self.file_path(conversation_id);

        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::unavailable(e.to_string())),
        };

        serde_yaml::from_str(&yaml)
            .map(Some)
            .map_err(|e| StorageError::corrupt(format!("{}: {}", path.display(), e)))
    }

    async fn write(&self, conversation: &Conversation) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        let path = self.file_path(conversation.id());
        let tmp = path.with_extension("yaml.tmp");

        let yaml = serde_yaml::to_string(conversation)
            .map_err(|e| StorageError::unavailable(format!("serialize: {}", e)))?;

        fs::write(&tmp, yaml)
            .await
            .map_err(|e| StorageError::unavailable(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::unavailable(e.to_string()))
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn load(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, StorageError> {
        Ok(self
            .read(conversation_id)
            .await?
            .map(Conversation::into_messages)
            .unwrap_or_default())
    }

    async fn append(
        &self,
        conversation_id: &ConversationId,
        messages: &[Message],
    ) -> Result<(), StorageError> {
        let conversation = match self.read(conversation_id).await? {
            Some(mut existing) => {
                existing.extend(messages);
                existing
            }
            None => match Conversation::start(conversation_id.clone(), messages.to_vec()) {
                Some(started) => started,
                None => return Ok(()),
            },
        };

        self.write(&conversation).await
    }

    async fn clear(&self, conversation_id: &ConversationId) -> Result<(), StorageError> {
        match fs::remove_file(self.file_path(conversation_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::unavailable(e.to_string())),
        }
    }
}
