//! ProcessMessageHandler - the message orchestrator.
//!
//! One call is one turn:
//!
//! ```text
//! RECEIVED -> LOADING_HISTORY -> CACHE_CHECK -> CLASSIFYING -> ROUTING
//!          -> HANDLING -> PERSISTING -> COMPLETED
//! ```
//!
//! A cache hit jumps from CACHE_CHECK straight to PERSISTING. Any stage may
//! end in ERRORED, but only invalid input and an unreadable store do so;
//! classifier and agent failures degrade to the fallback instead.
//!
//! The conversation lease is taken before history is loaded and held until
//! the turn is persisted. Dropping the returned future releases it and
//! writes nothing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::routing::{
    AgentRegistry, ConversationStateStore, IntentClassifier, ResponseCache,
};
use crate::domain::conversation::Message;
use crate::domain::foundation::{
    ConversationId, RequestId, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::routing::{Intent, IntentResult, RoutingDecision, TurnContext, TurnStage};
use crate::ports::HandlerError;

use super::RoutingError;

/// Reply substituted when the routed agent fails or times out.
pub const DEFAULT_APOLOGY: &str =
    "I'm sorry, I ran into a problem while working on your request. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub handler_timeout: Duration,
    pub max_message_chars: usize,
    pub apology: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(30),
            max_message_chars: 10_000,
            apology: DEFAULT_APOLOGY.to_string(),
        }
    }
}

/// Command to process one inbound chat message.
///
/// Identifiers arrive unvalidated; malformed ones are `InvalidInput`.
#[derive(Debug, Clone)]
pub struct ProcessMessageCommand {
    pub conversation_id: String,
    pub user_id: String,
    pub text: String,
}

impl ProcessMessageCommand {
    pub fn new(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            text: text.into(),
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessMessageResult {
    pub response: String,
    /// What the classifier predicted (`unknown` when it could not say).
    pub intent: Intent,
    /// Agent whose name is recorded on the reply.
    pub agent: String,
    pub confidence: f64,
    /// Timestamp of the persisted reply.
    pub timestamp: Timestamp,
    pub used_fallback: bool,
    pub from_cache: bool,
    /// False when the turn could not be written; the response is still valid.
    pub persisted: bool,
    pub classification_unavailable: bool,
    pub request_id: RequestId,
    pub conversation_id: ConversationId,
    pub routing: RoutingDecision,
    /// Details the agent reported about its reply; empty for cache hits
    /// and apologies.
    pub agent_metadata: BTreeMap<String, String>,
}

/// Handler for ProcessMessage commands.
pub struct ProcessMessageHandler {
    state: ConversationStateStore,
    classifier: Arc<IntentClassifier>,
    registry: Arc<AgentRegistry>,
    cache: ResponseCache,
    settings: OrchestratorSettings,
}

/// Outcome of the classify, route and handle stages.
struct Handled {
    decision: RoutingDecision,
    response: String,
    degraded: bool,
    /// Details reported by the agent (model, token counts).
    reply_metadata: BTreeMap<String, String>,
}

/// Stage tracker for one turn; logs every transition.
struct TurnTrace {
    request_id: RequestId,
    conversation_id: String,
    stage: TurnStage,
}

impl TurnTrace {
    fn new(request_id: RequestId, conversation_id: &str) -> Self {
        Self {
            request_id,
            conversation_id: conversation_id.to_string(),
            stage: TurnStage::Received,
        }
    }

    fn advance(&mut self, next: TurnStage) {
        match self.stage.transition_to(next) {
            Ok(stage) => {
                tracing::debug!(
                    request_id = %self.request_id,
                    conversation_id = %self.conversation_id,
                    from = %self.stage,
                    to = %stage,
                    "Turn stage"
                );
                self.stage = stage;
            }
            Err(e) => tracing::error!(
                request_id = %self.request_id,
                error = %e,
                "Illegal turn stage transition"
            ),
        }
    }
}

impl ProcessMessageHandler {
    pub fn new(
        state: ConversationStateStore,
        classifier: Arc<IntentClassifier>,
        registry: Arc<AgentRegistry>,
        cache: ResponseCache,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            state,
            classifier,
            registry,
            cache,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessMessageCommand,
    ) -> Result<ProcessMessageResult, RoutingError> {
        let request_id = RequestId::new();
        let mut turn = TurnTrace::new(request_id, &cmd.conversation_id);

        // 1. Validate before touching any state
        let (conversation_id, user_id, text) = match self.validate(cmd) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::info!(request_id = %request_id, error = %e, "Rejected invalid message");
                turn.advance(TurnStage::Errored);
                return Err(e.into());
            }
        };

        let context = TurnContext::new(request_id, conversation_id.clone(), user_id.clone());

        // 2. Serialize with other turns on this conversation
        let lease = self.state.lock(&conversation_id).await;
        turn.advance(TurnStage::LoadingHistory);

        let history = match self.state.load_locked(&lease).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to load conversation history"
                );
                turn.advance(TurnStage::Errored);
                return Err(e.into());
            }
        };

        // 3. Cache check
        turn.advance(TurnStage::CacheCheck);
        let cache_key = self.cache.key_for(&text, &history, &user_id);
        let cached = match self.cache.get(&cache_key).await {
            Some(entry) if self.registry.contains_agent(&entry.agent) => Some(entry),
            Some(entry) => {
                tracing::debug!(
                    agent = %entry.agent,
                    "Cached agent is not registered, ignoring entry"
                );
                None
            }
            None => None,
        };
        let from_cache = cached.is_some();

        // 4. Classify, route and handle on a miss
        let handled = match cached {
            Some(entry) => Handled {
                decision: RoutingDecision::new(
                    IntentResult::cached(entry.intent, entry.confidence),
                    entry.agent,
                    false,
                ),
                response: entry.response,
                degraded: false,
                reply_metadata: BTreeMap::new(),
            },
            None => {
                self.route_and_handle(&mut turn, &context, &text, &history)
                    .await
            }
        };
        let Handled {
            decision,
            response,
            degraded,
            reply_metadata,
        } = handled;

        tracing::info!(
            request_id = %request_id,
            conversation_id = %conversation_id,
            intent = %decision.intent.predicted,
            routed = %decision.intent.label,
            agent = %decision.selected_agent,
            confidence = decision.intent.confidence,
            used_fallback = decision.used_fallback,
            from_cache,
            agent_metadata = ?reply_metadata,
            "Routing decision"
        );

        // 5. Persist user message then reply, strictly ordered
        turn.advance(TurnStage::Persisting);
        let floor = history.last().map(Message::timestamp);
        let asked_at = Timestamp::now_after(floor.as_ref());
        let answered_at = Timestamp::now_after(Some(&asked_at));
        let messages = [
            Message::user(conversation_id.clone(), user_id.clone(), text, asked_at),
            Message::agent(
                conversation_id.clone(),
                user_id,
                response.clone(),
                decision.selected_agent.clone(),
                answered_at,
            ),
        ];

        let persisted = match self.state.append(&lease, &messages).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to persist turn, returning response without a durable record"
                );
                false
            }
        };

        // Only trusted, fully handled turns are replayed from the cache
        if !from_cache && !degraded && !decision.used_fallback {
            self.cache
                .put(
                    cache_key,
                    &response,
                    decision.intent.predicted,
                    &decision.selected_agent,
                    decision.intent.confidence,
                )
                .await;
        }

        turn.advance(TurnStage::Completed);
        drop(lease);

        Ok(ProcessMessageResult {
            response,
            intent: decision.intent.predicted,
            agent: decision.selected_agent.clone(),
            confidence: decision.intent.confidence,
            timestamp: answered_at,
            used_fallback: decision.used_fallback,
            from_cache,
            persisted,
            classification_unavailable: decision.intent.classification_unavailable,
            request_id,
            conversation_id,
            routing: decision,
            agent_metadata: reply_metadata,
        })
    }

    fn validate(
        &self,
        cmd: ProcessMessageCommand,
    ) -> Result<(ConversationId, UserId, String), ValidationError> {
        let conversation_id = ConversationId::new(cmd.conversation_id)?;
        let user_id = UserId::new(cmd.user_id)?;

        if cmd.text.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        let chars = cmd.text.chars().count();
        if chars > self.settings.max_message_chars {
            return Err(ValidationError::too_long(
                "message",
                self.settings.max_message_chars,
                chars,
            ));
        }

        Ok((conversation_id, user_id, cmd.text))
    }

    async fn route_and_handle(
        &self,
        turn: &mut TurnTrace,
        context: &TurnContext,
        text: &str,
        history: &[Message],
    ) -> Handled {
        turn.advance(TurnStage::Classifying);
        let intent = self.classifier.classify_turn(context, text, history).await;

        turn.advance(TurnStage::Routing);
        let resolved = self.registry.resolve(intent.label);
        let decision = RoutingDecision::new(
            intent,
            resolved.name(),
            intent.below_threshold || resolved.used_fallback,
        );

        turn.advance(TurnStage::Handling);
        let outcome = tokio::time::timeout(
            self.settings.handler_timeout,
            resolved.handler.handle(context, text, history),
        )
        .await;

        let failure = match outcome {
            Ok(Ok(reply)) if !reply.content.trim().is_empty() => {
                return Handled {
                    decision,
                    response: reply.content,
                    degraded: intent.classification_unavailable,
                    reply_metadata: reply.metadata,
                };
            }
            Ok(Ok(_)) => HandlerError::EmptyResponse.to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "timed out after {}ms",
                self.settings.handler_timeout.as_millis()
            ),
        };

        tracing::warn!(
            request_id = %turn.request_id,
            agent = %decision.selected_agent,
            error = %failure,
            "Agent failed, substituting apology"
        );

        let fallback_agent = self.registry.fallback().name().to_string();
        Handled {
            decision: decision.degrade_to(fallback_agent),
            response: self.settings.apology.clone(),
            degraded: true,
            reply_metadata: BTreeMap::new(),
        }
    }
}
