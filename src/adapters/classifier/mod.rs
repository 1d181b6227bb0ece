//! Classification Service Adapters.
//!
//! - `LlmClassificationService` - asks an `AIProvider` for a JSON verdict
//! - `KeywordClassificationService` - offline rule-based fallback
//! - `ScriptedClassifier` - replayable double for tests

mod keyword_classifier;
mod llm_classifier;
mod scripted_classifier;

pub use keyword_classifier::KeywordClassificationService;
pub use llm_classifier::{parse_reply, LlmClassificationService};
pub use scripted_classifier::ScriptedClassifier;
