//! Message entity for conversations.
//!
//! Messages are immutable records of one side of a turn. User messages carry
//! the text the user sent; agent messages carry the reply and the name of the
//! agent that produced it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Text sent by the end user.
    User,
    /// Reply produced by a routed agent.
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
        }
    }

    /// Parses the persisted representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "agent" => Some(Role::Agent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `id` is globally unique
/// - agent messages always carry `agent_name`; user messages never do
/// - nothing changes after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    conversation_id: ConversationId,
    user_id: UserId,
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_name: Option<String>,
    timestamp: Timestamp,
}

impl Message {
    /// Creates a user message.
    pub fn user(
        conversation_id: ConversationId,
        user_id: UserId,
        content: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            user_id,
            role: Role::User,
            content: content.into(),
            agent_name: None,
            timestamp,
        }
    }

    /// Creates an agent reply attributed to `agent_name`.
    pub fn agent(
        conversation_id: ConversationId,
        user_id: UserId,
        content: impl Into<String>,
        agent_name: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            user_id,
            role: Role::Agent,
            content: content.into(),
            agent_name: Some(agent_name.into()),
            timestamp,
        }
    }

    /// Reconstitutes a message from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: MessageId,
        conversation_id: ConversationId,
        user_id: UserId,
        role: Role,
        content: String,
        agent_name: Option<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            user_id,
            role,
            content,
            agent_name,
            timestamp,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Returns at most the `n` most recent messages, oldest first.
pub fn recent(history: &[Message], n: usize) -> &[Message] {
    let start = history.len().saturating_sub(n);
    &history[start..]
}
