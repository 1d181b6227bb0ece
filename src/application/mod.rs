//! Application layer - routing components and the command/query handlers.
//!
//! `routing` holds the components a turn is built from; `handlers` composes
//! them into the operations the transport layer calls.

pub mod handlers;
pub mod routing;

pub use handlers::routing::{
    ClearConversationCommand, ClearConversationHandler, ClearConversationResult,
    GetHistoryHandler, GetHistoryQuery, GetHistoryResult, OrchestratorSettings,
    ProcessMessageCommand, ProcessMessageHandler, ProcessMessageResult, RoutingError,
    DEFAULT_APOLOGY,
};
pub use routing::{
    AgentRegistry, CacheSettings, ClassifierSettings, ConversationStateStore, IntentClassifier,
    ResponseCache,
};
