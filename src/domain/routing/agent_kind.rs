//! Agent kinds and their behavior profiles.
//!
//! The set of agents is closed: adding an intent means adding a variant here,
//! a profile below, and a registry entry at startup.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Intent;

/// One of the specialized responders a message can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Greeting,
    Research,
    Email,
    Database,
    Celebration,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::Greeting,
        AgentKind::Research,
        AgentKind::Email,
        AgentKind::Database,
        AgentKind::Celebration,
    ];

    /// Name recorded on persisted replies and returned to callers.
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Greeting => "GreetingAgent",
            AgentKind::Research => "ResearcherAgent",
            AgentKind::Email => "EmailWriterAgent",
            AgentKind::Database => "DatabaseAgent",
            AgentKind::Celebration => "EventAndCelebrationAgent",
        }
    }

    /// The intent this agent serves.
    pub fn intent(&self) -> Intent {
        match self {
            AgentKind::Greeting => Intent::Greeting,
            AgentKind::Research => Intent::Research,
            AgentKind::Email => Intent::Email,
            AgentKind::Database => Intent::Database,
            AgentKind::Celebration => Intent::Celebration,
        }
    }

    /// The agent that serves `intent`, if any.
    pub fn for_intent(intent: Intent) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.intent() == intent)
    }

    pub fn profile(&self) -> AgentProfile {
        profiles::get(*self)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an agent should behave when generating a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub role: &'static str,
    pub guidelines: Vec<&'static str>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AgentProfile {
    /// Renders the system prompt sent ahead of the conversation.
    pub fn system_prompt(&self) -> String {
        let guidelines = self
            .guidelines
            .iter()
            .map(|g| format!("- {}", g))
            .collect::<Vec<_>>()
            .join("\n");

        format!("{}\n\nGuidelines:\n{}", self.role, guidelines)
    }
}

/// Built-in profiles for every agent kind.
pub mod profiles {
    use super::*;

    pub fn greeting() -> AgentProfile {
        AgentProfile {
            kind: AgentKind::Greeting,
            role: "You are a friendly and professional virtual assistant greeting the user.",
            guidelines: vec![
                "Respond with a warm, welcoming greeting",
                "Be personable and ask how you can help",
                "Keep the response to 1-2 sentences",
            ],
            temperature: 0.7,
            max_tokens: 150,
        }
    }

    pub fn research() -> AgentProfile {
        AgentProfile {
            kind: AgentKind::Research,
            role: "You are a research expert with deep knowledge across multiple domains. \
                   Provide accurate, well-researched, and insightful information.",
            guidelines: vec![
                "Cover the key information about the topic",
                "Mention recent developments when applicable",
                "Include important facts and practical implications",
                "Keep the response to 2-3 well-structured paragraphs",
            ],
            temperature: 0.5,
            max_tokens: 800,
        }
    }

    pub fn email() -> AgentProfile {
        AgentProfile {
            kind: AgentKind::Email,
            role: "You are an expert email writer. Create professional, well-structured emails \
                   that are clear, concise, and effective.",
            guidelines: vec![
                "Start with a clear subject line",
                "Use an appropriate greeting and a professional closing",
                "Structure the body into clear points",
                "End with a signature placeholder",
            ],
            temperature: 0.6,
            max_tokens: 600,
        }
    }

    pub fn database() -> AgentProfile {
        AgentProfile {
            kind: AgentKind::Database,
            role: "You are an assistant for employee records. Explain what data the user is \
                   asking for and present any records in the conversation clearly.",
            guidelines: vec![
                "Identify whether the user wants to list, look up, create, update, or delete records",
                "Format record listings as markdown tables or bullet lists",
                "Never invent employee data that is not present in the conversation",
                "Ask for missing identifiers instead of guessing",
            ],
            temperature: 0.2,
            max_tokens: 600,
        }
    }

    pub fn celebration() -> AgentProfile {
        AgentProfile {
            kind: AgentKind::Celebration,
            role: "You are the Event and Celebration Agent, celebrating employee milestones \
                   and creating a vibrant workplace culture.",
            guidelines: vec![
                "Keep a warm, positive, and celebratory tone matched to the occasion",
                "Be culturally sensitive and inclusive",
                "Use emojis sparingly to keep posts engaging",
                "Keep social posts to 100-150 words",
                "Never mention age in birthday posts unless asked",
                "Weave in provided details such as name, team, or years of service",
            ],
            temperature: 0.8,
            max_tokens: 500,
        }
    }

    pub fn get(kind: AgentKind) -> AgentProfile {
        match kind {
            AgentKind::Greeting => greeting(),
            AgentKind::Research => research(),
            AgentKind::Email => email(),
            AgentKind::Database => database(),
            AgentKind::Celebration => celebration(),
        }
    }
}
