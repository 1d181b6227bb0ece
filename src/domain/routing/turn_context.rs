//! Identity of the turn being processed.
//!
//! Handed to the classifier and the routed agent so every outbound call
//! carries the same correlation id as the turn that caused it.

use crate::domain::foundation::{ConversationId, RequestId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub request_id: RequestId,
    pub conversation_id: ConversationId,
    pub user_id: UserId,
}

impl TurnContext {
    pub fn new(request_id: RequestId, conversation_id: ConversationId, user_id: UserId) -> Self {
        Self {
            request_id,
            conversation_id,
            user_id,
        }
    }
}
