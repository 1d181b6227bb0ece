//! Routing domain - intents, agents, classification results, and turn stages.
//!
//! Everything here is pure: no I/O, no clocks beyond `Timestamp::now`.

mod agent_kind;
mod cache_key;
mod intent;
mod intent_result;
mod turn_context;
mod turn_stage;

pub use agent_kind::{profiles, AgentKind, AgentProfile};
pub use cache_key::{history_signature, normalize_text, CacheEntry, CacheKey};
pub use intent::{Intent, UnrecognizedIntent};
pub use intent_result::{ConfidencePolicy, IntentResult, RoutingDecision, DEFAULT_MIN_CONFIDENCE};
pub use turn_context::TurnContext;
pub use turn_stage::TurnStage;
