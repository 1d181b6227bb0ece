//! Intent - closed set of request categories a message can be routed by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a user's request.
///
/// `Unknown` is the classifier's explicit "none of the above" answer; it never
/// has an agent of its own and always routes to the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Research,
    Email,
    Database,
    Celebration,
    Unknown,
}

impl Intent {
    /// Intents that map to a dedicated agent.
    pub const ROUTABLE: [Intent; 5] = [
        Intent::Greeting,
        Intent::Research,
        Intent::Email,
        Intent::Database,
        Intent::Celebration,
    ];

    /// Canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Research => "research",
            Intent::Email => "email",
            Intent::Database => "database",
            Intent::Celebration => "celebration",
            Intent::Unknown => "unknown",
        }
    }

    /// Parses a label as a model might emit it.
    ///
    /// Case and surrounding whitespace/punctuation are ignored. `event` is
    /// accepted as an alias of `celebration`. Returns `None` for anything
    /// outside the closed set.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
            .trim()
            .to_ascii_lowercase();

        match cleaned.as_str() {
            "greeting" => Some(Intent::Greeting),
            "research" => Some(Intent::Research),
            "email" => Some(Intent::Email),
            "database" => Some(Intent::Database),
            "celebration" | "event" => Some(Intent::Celebration),
            "unknown" => Some(Intent::Unknown),
            _ => None,
        }
    }

    /// True for every intent except `Unknown`.
    pub fn is_routable(&self) -> bool {
        !matches!(self, Intent::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is outside the closed intent set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized intent label: {0}")]
pub struct UnrecognizedIntent(pub String);

impl FromStr for Intent {
    type Err = UnrecognizedIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| UnrecognizedIntent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_labels() {
        for intent in Intent::ROUTABLE {
            assert_eq!(Intent::parse_label(intent.as_str()), Some(intent));
        }
        assert_eq!(Intent::parse_label("unknown"), Some(Intent::Unknown));
    }

    #[test]
    fn parsing_ignores_case_whitespace_and_quotes() {
        assert_eq!(Intent::parse_label("  Greeting\n"), Some(Intent::Greeting));
        assert_eq!(Intent::parse_label("\"EMAIL\""), Some(Intent::Email));
        assert_eq!(Intent::parse_label("research."), Some(Intent::Research));
    }

    #[test]
    fn event_is_an_alias_of_celebration() {
        assert_eq!(Intent::parse_label("event"), Some(Intent::Celebration));
    }

    #[test]
    fn labels_outside_the_set_do_not_parse() {
        assert_eq!(Intent::parse_label("weather"), None);
        assert_eq!(Intent::parse_label(""), None);
        assert!("sports".parse::<Intent>().is_err());
    }

    #[test]
    fn unknown_is_not_routable() {
        assert!(!Intent::Unknown.is_routable());
        assert!(Intent::ROUTABLE.iter().all(Intent::is_routable));
    }

    #[test]
    fn serializes_as_lowercase_label() {
        let json = serde_json::to_string(&Intent::Celebration).unwrap();
        assert_eq!(json, "\"celebration\"");
    }
}
