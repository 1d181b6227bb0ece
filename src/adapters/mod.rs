//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the routing core to external systems:
//! - `ai` - LLM providers (OpenAI-compatible, mock)
//! - `classifier` - classification capabilities (LLM, keyword, scripted)
//! - `agents` - agent handlers (LLM-backed, scripted)
//! - `storage` - conversation stores (in-memory, YAML files)
//! - `postgres` - PostgreSQL conversation store
//! - `cache` - response cache stores (in-memory, Redis)
//! - `http` - axum REST transport

pub mod agents;
pub mod ai;
pub mod cache;
pub mod classifier;
pub mod http;
pub mod postgres;
pub mod storage;

pub use agents::{LlmAgent, ScriptedAgent};
pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use cache::{InMemoryResponseCache, RedisResponseCache};
pub use classifier::{KeywordClassificationService, LlmClassificationService, ScriptedClassifier};
pub use postgres::PostgresConversationStore;
pub use storage::{FileConversationStore, InMemoryConversationStore};
