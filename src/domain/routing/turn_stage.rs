//! Lifecycle of a single processed turn.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Stage of a turn inside the orchestrator.
///
/// `Classifying` is skipped on a cache hit, and so is `Handling`.
/// `Errored` is reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnStage {
    Received,
    LoadingHistory,
    CacheCheck,
    Classifying,
    Routing,
    Handling,
    Persisting,
    Completed,
    Errored,
}

impl TurnStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStage::Received => "RECEIVED",
            TurnStage::LoadingHistory => "LOADING_HISTORY",
            TurnStage::CacheCheck => "CACHE_CHECK",
            TurnStage::Classifying => "CLASSIFYING",
            TurnStage::Routing => "ROUTING",
            TurnStage::Handling => "HANDLING",
            TurnStage::Persisting => "PERSISTING",
            TurnStage::Completed => "COMPLETED",
            TurnStage::Errored => "ERRORED",
        }
    }
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for TurnStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TurnStage::*;
        match self {
            Received => vec![LoadingHistory, Errored],
            LoadingHistory => vec![CacheCheck, Errored],
            CacheCheck => vec![Classifying, Persisting, Errored],
            Classifying => vec![Routing, Errored],
            Routing => vec![Handling, Errored],
            Handling => vec![Persisting, Errored],
            Persisting => vec![Completed, Errored],
            Completed | Errored => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TurnStage::*;

    #[test]
    fn full_miss_path_is_valid() {
        let path = [
            Received,
            LoadingHistory,
            CacheCheck,
            Classifying,
            Routing,
            Handling,
            Persisting,
            Completed,
        ];
        let mut stage = Received;
        for next in &path[1..] {
            stage = stage.transition_to(*next).unwrap();
        }
        assert!(stage.is_terminal());
    }

    #[test]
    fn cache_hit_skips_to_persisting() {
        assert!(CacheCheck.can_transition_to(&Persisting));
    }

    #[test]
    fn cannot_skip_loading_history() {
        assert!(Received.transition_to(CacheCheck).is_err());
    }

    #[test]
    fn every_live_stage_can_error() {
        for stage in [
            Received,
            LoadingHistory,
            CacheCheck,
            Classifying,
            Routing,
            Handling,
            Persisting,
        ] {
            assert!(stage.can_transition_to(&Errored), "{} -> ERRORED", stage);
        }
        assert!(Errored.is_terminal());
        assert!(Completed.is_terminal());
    }
}
