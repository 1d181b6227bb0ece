//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait, and validation
//! errors used across the routing domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConversationId, MessageId, RequestId, UserId, MAX_EXTERNAL_ID_LEN};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
