//! Offline keyword classifier.
//!
//! Deterministic rules over the bare message, for running without a model.
//! Precedence: explicit email or letter, then database, then celebration,
//! then research. Greetings win only when nothing else matched.

use async_trait::async_trait;

use crate::ports::{
    ClassificationPrompt, ClassificationService, ClassifierError, RawClassification,
};

const CLEAR_HIT: f64 = 0.9;
const QUESTION_DEFAULT: f64 = 0.65;
const NO_SIGNAL: f64 = 0.3;

const EMAIL_WORDS: &[&str] = &["email", "e-mail", "emails", "letter", "mail"];

const DATABASE_WORDS: &[&str] = &[
    "employee",
    "employees",
    "staff",
    "record",
    "records",
    "database",
    "department",
    "payroll",
    "headcount",
];

const CELEBRATION_WORDS: &[&str] = &[
    "birthday",
    "anniversary",
    "promotion",
    "achievement",
    "festival",
    "congratulate",
    "congratulations",
    "celebrate",
    "celebration",
    "wish",
    "wishes",
    "post",
    "announce",
    "announcement",
    "diwali",
];

const RESEARCH_WORDS: &[&str] = &[
    "explain",
    "describe",
    "research",
    "define",
    "compare",
    "summarize",
    "overview",
];

const RESEARCH_PHRASES: &[&str] = &[
    "tell me about",
    "what is",
    "what are",
    "how does",
    "how do",
    "why is",
    "why do",
];

const GREETING_WORDS: &[&str] = &[
    "hi", "hello", "hey", "hiya", "greetings", "morning", "afternoon", "evening", "good", "how",
    "are", "you", "what's", "up", "nice", "to", "meet", "there", "thanks", "thank", "yo",
];

/// Rule-based classifier over the message text.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassificationService;

impl KeywordClassificationService {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_text(message: &str) -> RawClassification {
        let lowered = message.to_lowercase();
        let words = tokenize(&lowered);

        if words.is_empty() {
            return RawClassification::new("unknown", NO_SIGNAL);
        }

        let any = |set: &[&str]| words.iter().any(|w| set.contains(w));

        if any(EMAIL_WORDS) {
            return RawClassification::new("email", CLEAR_HIT);
        }
        if any(DATABASE_WORDS) || words.iter().any(|w| looks_like_employee_code(w)) {
            return RawClassification::new("database", CLEAR_HIT);
        }
        if any(CELEBRATION_WORDS) {
            return RawClassification::new("celebration", CLEAR_HIT);
        }
        if any(RESEARCH_WORDS) || RESEARCH_PHRASES.iter().any(|p| lowered.contains(p)) {
            return RawClassification::new("research", CLEAR_HIT);
        }

        let greeting_only = words.iter().all(|w| GREETING_WORDS.contains(w));
        if greeting_only {
            return RawClassification::new("greeting", CLEAR_HIT);
        }
        if lowered.trim_end().ends_with('?') {
            return RawClassification::new("research", QUESTION_DEFAULT);
        }

        RawClassification::new("unknown", NO_SIGNAL)
    }
}

#[async_trait]
impl ClassificationService for KeywordClassificationService {
    async fn classify(
        &self,
        prompt: &ClassificationPrompt,
    ) -> Result<RawClassification, ClassifierError> {
        Ok(Self::classify_text(&prompt.message))
    }
}

fn tokenize(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .map(|w| w.trim_matches(|c| c == '\'' || c == '-'))
        .filter(|w| !w.is_empty())
        .collect()
}

fn looks_like_employee_code(word: &str) -> bool {
    word.strip_prefix("emp")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
