//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! - `PostgresConversationStore` - Conversation headers plus an ordered message log

mod conversation_store;

pub use conversation_store::PostgresConversationStore;
