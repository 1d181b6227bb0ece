//! Conversation routing handlers.
//!
//! - `ProcessMessageHandler` - one chat turn, end to end
//! - `ClearConversationHandler` - idempotent history removal
//! - `GetHistoryHandler` - lock-free history read

mod clear_conversation;
mod error;
mod get_history;
mod process_message;

pub use clear_conversation::{
    ClearConversationCommand, ClearConversationHandler, ClearConversationResult,
};
pub use error::RoutingError;
pub use get_history::{GetHistoryHandler, GetHistoryQuery, GetHistoryResult};
pub use process_message::{
    OrchestratorSettings, ProcessMessageCommand, ProcessMessageHandler, ProcessMessageResult,
    DEFAULT_APOLOGY,
};
