//! PostgreSQL implementation of ConversationStore.
//!
//! Messages are ordered by a `BIGSERIAL seq` column rather than timestamps,
//! so replay order is exactly insertion order. Each append runs in one
//! transaction together with the conversation header upsert.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{Message, Role};
use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};
use crate::ports::{ConversationStore, StorageError};

/// PostgreSQL implementation of ConversationStore.
#[derive(Clone)]
pub struct PostgresConversationStore {
    pool: PgPool,
}

impl PostgresConversationStore {
    /// Creates a new PostgresConversationStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn load(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, role, content, agent_name, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("Failed to fetch messages: {}", e)))?;

        rows.iter()
            .map(|row| row_to_message(conversation_id, row))
            .collect()
    }

    async fn append(
        &self,
        conversation_id: &ConversationId,
        messages: &[Message],
    ) -> Result<(), StorageError> {
        let (first, last) = match (messages.first(), messages.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(()),
        };

        let mut tx = self.pool.begin().await.map_err(|e| {
            StorageError::unavailable(format!("Failed to start transaction: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_id, created_at, last_activity_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET last_activity_at = EXCLUDED.last_activity_at
            "#,
        )
        .bind(conversation_id.as_str())
        .bind(first.user_id().as_str())
        .bind(*first.timestamp().as_datetime())
        .bind(*last.timestamp().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::unavailable(format!("Failed to upsert conversation: {}", e)))?;

        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO messages (id, conversation_id, user_id, role, content, agent_name, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(*message.id().as_uuid())
            .bind(conversation_id.as_str())
            .bind(message.user_id().as_str())
            .bind(message.role().as_str())
            .bind(message.content())
            .bind(message.agent_name())
            .bind(*message.timestamp().as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::unavailable(format!("Failed to insert message: {}", e)))?;
        }

        tx.commit().await.map_err(|e| {
            StorageError::unavailable(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(())
    }

    async fn clear(&self, conversation_id: &ConversationId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            StorageError::unavailable(format!("Failed to start transaction: {}", e))
        })?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(conversation_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::unavailable(format!("Failed to delete messages: {}", e)))?;

        sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(conversation_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::unavailable(format!("Failed to delete conversation: {}", e))
            })?;

        tx.commit().await.map_err(|e| {
            StorageError::unavailable(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(())
    }
}

fn row_to_message(conversation_id: &ConversationId, row: &PgRow) -> Result<Message, StorageError> {
    let decode =
        |e: sqlx::Error| StorageError::corrupt(format!("Failed to decode message row: {}", e));

    let id: uuid::Uuid = row.try_get("id").map_err(decode)?;
    let user_id: String = row.try_get("user_id").map_err(decode)?;
    let role: String = row.try_get("role").map_err(decode)?;
    let content: String = row.try_get("content").map_err(decode)?;
    let agent_name: Option<String> = row.try_get("agent_name").map_err(decode)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(decode)?;

    let role = Role::parse(&role)
        .ok_or_else(|| StorageError::corrupt(format!("Unknown message role: {}", role)))?;
    let user_id = UserId::new(user_id).map_err(|e| StorageError::corrupt(e.to_string()))?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        conversation_id.clone(),
        user_id,
        role,
        content,
        agent_name,
        Timestamp::from_datetime(created_at),
    ))
}
