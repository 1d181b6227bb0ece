//! AgentRegistry - static intent to handler table.
//!
//! Built once at startup and never mutated afterwards. Resolution is total:
//! any intent without a registered handler, `Unknown` included, resolves to
//! the fallback handler.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::adapters::agents::LlmAgent;
use crate::domain::routing::{AgentKind, Intent};
use crate::ports::{AIProvider, AgentHandler};

/// Registry construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no handler registered for fallback intent '{0}'")]
    MissingFallback(Intent),

    #[error("intent '{0}' cannot have a handler")]
    NotRoutable(Intent),
}

/// The handler chosen for an intent.
#[derive(Clone)]
pub struct ResolvedAgent {
    pub handler: Arc<dyn AgentHandler>,
    /// True when the intent had no handler of its own.
    pub used_fallback: bool,
}

impl ResolvedAgent {
    pub fn name(&self) -> &str {
        self.handler.name()
    }
}

pub struct AgentRegistry {
    handlers: HashMap<Intent, Arc<dyn AgentHandler>>,
    fallback_intent: Intent,
    fallback: Arc<dyn AgentHandler>,
}

impl AgentRegistry {
    pub fn builder(fallback_intent: Intent) -> AgentRegistryBuilder {
        AgentRegistryBuilder {
            handlers: HashMap::new(),
            fallback_intent,
        }
    }

    /// One `LlmAgent` per agent kind, all sharing `provider`.
    pub fn standard(
        provider: Arc<dyn AIProvider>,
        fallback_intent: Intent,
        history_turns: usize,
    ) -> Result<Self, RegistryError> {
        AgentKind::ALL
            .into_iter()
            .fold(Self::builder(fallback_intent), |builder, kind| {
                let agent = LlmAgent::new(kind, provider.clone()).with_history_turns(history_turns);
                builder.register(kind.intent(), Arc::new(agent))
            })
            .build()
    }

    /// Handler for `intent`, or the fallback. Never fails.
    pub fn resolve(&self, intent: Intent) -> ResolvedAgent {
        match self.handlers.get(&intent) {
            Some(handler) => ResolvedAgent {
                handler: handler.clone(),
                used_fallback: false,
            },
            None => ResolvedAgent {
                handler: self.fallback.clone(),
                used_fallback: true,
            },
        }
    }

    /// Resolves a raw label; anything unparseable gets the fallback.
    pub fn resolve_label(&self, label: &str) -> ResolvedAgent {
        match Intent::parse_label(label) {
            Some(intent) => self.resolve(intent),
            None => self.resolve(Intent::Unknown),
        }
    }

    pub fn fallback(&self) -> &Arc<dyn AgentHandler> {
        &self.fallback
    }

    pub fn fallback_intent(&self) -> Intent {
        self.fallback_intent
    }

    /// True if some registered handler carries `name`.
    pub fn contains_agent(&self, name: &str) -> bool {
        self.handlers.values().any(|h| h.name() == name)
    }

    /// Registered agent names, sorted.
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.values().map(|h| h.name().to_string()).collect();
        names.sort();
        names.dedup();
        names
    }
}

pub struct AgentRegistryBuilder {
    handlers: HashMap<Intent, Arc<dyn AgentHandler>>,
    fallback_intent: Intent,
}

impl AgentRegistryBuilder {
    /// Registers `handler` for `intent`, replacing any earlier registration.
    pub fn register(mut self, intent: Intent, handler: Arc<dyn AgentHandler>) -> Self {
        self.handlers.insert(intent, handler);
        self
    }

    pub fn build(self) -> Result<AgentRegistry, RegistryError> {
        if let Some(intent) = self.handlers.keys().find(|i| !i.is_routable()) {
            return Err(RegistryError::NotRoutable(*intent));
        }

        let fallback = self
            .handlers
            .get(&self.fallback_intent)
            .cloned()
            .ok_or(RegistryError::MissingFallback(self.fallback_intent))?;

        Ok(AgentRegistry {
            handlers: self.handlers,
            fallback_intent: self.fallback_intent,
            fallback,
        })
    }
}
