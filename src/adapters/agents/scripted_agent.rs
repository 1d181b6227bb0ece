//! Scripted agent for tests and offline runs.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::conversation::Message;
use crate::domain::foundation::RequestId;
use crate::domain::routing::TurnContext;
use crate::ports::{AgentHandler, AgentReply, HandlerError};

/// What a `ScriptedAgent` does when called.
#[derive(Debug, Clone)]
pub enum Script {
    /// Reply with fixed text.
    Reply(String),
    /// Reply with `"<prefix><message>"`.
    Echo(String),
    /// Fail with the given error.
    Fail(HandlerError),
}

/// Recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    pub request_id: RequestId,
    pub message: String,
    pub history_len: usize,
}

#[derive(Clone)]
pub struct ScriptedAgent {
    name: String,
    script: Script,
    delay: Duration,
    calls: Arc<Mutex<Vec<AgentCall>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedAgent {
    pub fn replying(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, Script::Reply(text.into()))
    }

    pub fn echoing(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(name, Script::Echo(prefix.into()))
    }

    pub fn failing(name: impl Into<String>, error: HandlerError) -> Self {
        Self::new(name, Script::Fail(error))
    }

    pub fn new(name: impl Into<String>, script: Script) -> Self {
        Self {
            name: name.into(),
            script,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        locked(&self.calls).clone()
    }
}

#[async_trait]
impl AgentHandler for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        context: &TurnContext,
        message: &str,
        history: &[Message],
    ) -> Result<AgentReply, HandlerError> {
        locked(&self.calls).push(AgentCall {
            request_id: context.request_id,
            message: message.to_string(),
            history_len: history.len(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.script {
            Script::Reply(text) => Ok(AgentReply::new(text.clone())),
            Script::Echo(prefix) => Ok(AgentReply::new(format!("{}{}", prefix, message))),
            Script::Fail(err) => Err(err.clone()),
        }
    }
}
