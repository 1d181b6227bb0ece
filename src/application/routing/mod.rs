//! Routing components composed by the message orchestrator.
//!
//! - `IntentClassifier` - thresholded, retried, deadline-bounded classification
//! - `AgentRegistry` - total intent to handler lookup
//! - `ConversationStateStore` - per-conversation locking over the store port
//! - `ResponseCache` - best-effort turn cache

mod agent_registry;
mod intent_classifier;
mod response_cache;
mod state_store;

pub use agent_registry::{AgentRegistry, AgentRegistryBuilder, RegistryError, ResolvedAgent};
pub use intent_classifier::{render_prompt, ClassifierSettings, IntentClassifier};
pub use response_cache::{CacheSettings, ResponseCache};
pub use state_store::{ConversationLease, ConversationStateStore};
