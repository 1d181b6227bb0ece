//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the routing core and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - LLM completions (used by the LLM classifier and agents)
//! - `ClassificationService` - raw intent classification
//! - `AgentHandler` - reply generation for one intent
//! - `ConversationStore` - durable message log
//! - `CacheStore` - TTL storage for cached turns

mod agent_handler;
mod ai_provider;
mod cache_store;
mod classification_service;
mod conversation_store;

pub use agent_handler::{AgentHandler, AgentReply, HandlerError};
pub use ai_provider::{
    AIError, AIProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use cache_store::{CacheError, CacheStore};
pub use classification_service::{
    ClassificationPrompt, ClassificationService, ClassifierError, RawClassification,
};
pub use conversation_store::{ConversationStore, StorageError};
