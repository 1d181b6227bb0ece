//! Agent Handler Adapters.
//!
//! - `LlmAgent` - one generic handler per `AgentKind`, backed by an `AIProvider`
//! - `ScriptedAgent` - fixed, echoing, failing or slow handler for tests

mod llm_agent;
mod scripted_agent;

pub use llm_agent::{LlmAgent, DEFAULT_AGENT_HISTORY};
pub use scripted_agent::{AgentCall, Script, ScriptedAgent};
