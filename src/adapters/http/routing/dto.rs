//! Request and response bodies for the conversation endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{GetHistoryResult, ProcessMessageResult};
use crate::domain::conversation::Message;

/// Body of `POST /conversations/:conversation_id/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub response: String,
    pub intent: String,
    pub agent: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub used_fallback: bool,
    pub from_cache: bool,
    pub request_id: String,
}

impl From<ProcessMessageResult> for SendMessageResponse {
    fn from(result: ProcessMessageResult) -> Self {
        Self {
            response: result.response,
            intent: result.intent.to_string(),
            agent: result.agent,
            confidence: result.confidence,
            timestamp: *result.timestamp.as_datetime(),
            used_fallback: result.used_fallback,
            from_cache: result.from_cache,
            request_id: result.request_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            role: message.role().as_str().to_string(),
            content: message.content().to_string(),
            agent: message.agent_name().map(str::to_string),
            timestamp: *message.timestamp().as_datetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub messages: Vec<MessageView>,
}

impl From<GetHistoryResult> for HistoryResponse {
    fn from(result: GetHistoryResult) -> Self {
        Self {
            conversation_id: result.conversation_id.to_string(),
            messages: result.messages.iter().map(MessageView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearConversationResponse {
    pub conversation_id: String,
    pub cleared: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self {
            code: "INVALID_BODY".to_string(),
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            code: "SERVICE_UNAVAILABLE".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConversationId, Timestamp, UserId};

    #[test]
    fn send_message_request_deserializes() {
        let json = r#"{"user_id": "u-1", "message": "Hello!"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, "u-1");
        assert_eq!(req.message, "Hello!");
    }

    #[test]
    fn user_message_view_omits_agent() {
        let message = Message::user(
            ConversationId::new("c1").unwrap(),
            UserId::new("u1").unwrap(),
            "hi",
            Timestamp::now(),
        );
        let json = serde_json::to_value(MessageView::from(&message)).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
        assert!(json.get("agent").is_none());
    }

    #[test]
    fn error_response_codes() {
        assert_eq!(ErrorResponse::bad_request("x").code, "BAD_REQUEST");
        assert_eq!(
            ErrorResponse::service_unavailable("x").code,
            "SERVICE_UNAVAILABLE"
        );
    }
}
