//! Integration tests for the message routing orchestrator.
//!
//! These tests drive `ProcessMessageHandler` end to end:
//! 1. Classification, thresholding and fallback routing
//! 2. Degradation when the classifier, an agent or the store fails
//! 3. Response caching across conversations
//! 4. Per-conversation serialization, cancellation and clearing
//!
//! Uses in-memory adapters and scripted doubles; no network or database.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_router::adapters::agents::ScriptedAgent;
use agent_router::adapters::ai::MockAIProvider;
use agent_router::adapters::cache::InMemoryResponseCache;
use agent_router::adapters::classifier::{
    KeywordClassificationService, LlmClassificationService, ScriptedClassifier,
};
use agent_router::adapters::storage::InMemoryConversationStore;
use agent_router::application::{
    AgentRegistry, CacheSettings, ClassifierSettings, ClearConversationCommand,
    ClearConversationHandler, ConversationStateStore, GetHistoryHandler, GetHistoryQuery,
    IntentClassifier, OrchestratorSettings, ProcessMessageCommand, ProcessMessageHandler,
    ResponseCache, DEFAULT_APOLOGY,
};
use agent_router::domain::conversation::{Message, Role};
use agent_router::domain::foundation::ConversationId;
use agent_router::domain::routing::Intent;
use agent_router::ports::{
    ClassificationService, ClassifierError, ConversationStore, HandlerError, StorageError,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Conversation store whose writes can be switched off.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: InMemoryConversationStore,
    fail_appends: Arc<AtomicBool>,
    fail_loads: Arc<AtomicBool>,
}

impl FlakyStore {
    fn failing_appends() -> Self {
        let store = Self::default();
        store.fail_appends.store(true, Ordering::SeqCst);
        store
    }

    fn failing_loads() -> Self {
        let store = Self::default();
        store.fail_loads.store(true, Ordering::SeqCst);
        store
    }
}

#[async_trait]
impl ConversationStore for FlakyStore {
    async fn load(&self, id: &ConversationId) -> Result<Vec<Message>, StorageError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("connection refused"));
        }
        self.inner.load(id).await
    }

    async fn append(&self, id: &ConversationId, messages: &[Message]) -> Result<(), StorageError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("disk full"));
        }
        self.inner.append(id, messages).await
    }

    async fn clear(&self, id: &ConversationId) -> Result<(), StorageError> {
        self.inner.clear(id).await
    }
}

struct Agents {
    greeting: ScriptedAgent,
    research: ScriptedAgent,
    email: ScriptedAgent,
}

impl Default for Agents {
    fn default() -> Self {
        Self {
            greeting: ScriptedAgent::replying("GreetingAgent", "Hello! How can I help?"),
            research: ScriptedAgent::echoing("ResearcherAgent", "Findings on: "),
            email: ScriptedAgent::echoing("EmailWriterAgent", "Draft: "),
        }
    }
}

struct Fixture {
    handler: Arc<ProcessMessageHandler>,
    state: ConversationStateStore,
    agents: Agents,
}

struct FixtureBuilder {
    classifier: Arc<dyn ClassificationService>,
    classifier_settings: ClassifierSettings,
    store: Arc<dyn ConversationStore>,
    cache: Option<CacheSettings>,
    settings: OrchestratorSettings,
    agents: Agents,
}

impl FixtureBuilder {
    fn new(classifier: impl ClassificationService + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
            classifier_settings: ClassifierSettings {
                retries: 0,
                ..ClassifierSettings::default()
            },
            store: Arc::new(InMemoryConversationStore::new()),
            cache: None,
            settings: OrchestratorSettings::default(),
            agents: Agents::default(),
        }
    }

    fn store(mut self, store: impl ConversationStore + 'static) -> Self {
        self.store = Arc::new(store);
        self
    }

    fn cache(mut self, settings: CacheSettings) -> Self {
        self.cache = Some(settings);
        self
    }

    fn classifier_timeout(mut self, timeout: Duration) -> Self {
        self.classifier_settings.timeout = timeout;
        self
    }

    fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.settings.handler_timeout = timeout;
        self
    }

    fn agents(mut self, agents: Agents) -> Self {
        self.agents = agents;
        self
    }

    fn build(self) -> Fixture {
        let state = ConversationStateStore::new(self.store);
        let registry = AgentRegistry::builder(Intent::Greeting)
            .register(Intent::Greeting, Arc::new(self.agents.greeting.clone()))
            .register(Intent::Research, Arc::new(self.agents.research.clone()))
            .register(Intent::Email, Arc::new(self.agents.email.clone()))
            .build()
            .unwrap();
        let cache = match self.cache {
            Some(settings) => ResponseCache::new(Arc::new(InMemoryResponseCache::new()), settings),
            None => ResponseCache::disabled(),
        };

        let handler = ProcessMessageHandler::new(
            state.clone(),
            Arc::new(IntentClassifier::new(self.classifier, self.classifier_settings)),
            Arc::new(registry),
            cache,
            self.settings,
        );

        Fixture {
            handler: Arc::new(handler),
            state,
            agents: self.agents,
        }
    }
}

impl Fixture {
    async fn history(&self, conversation: &str) -> Vec<Message> {
        self.state
            .load(&ConversationId::new(conversation).unwrap())
            .await
            .unwrap()
    }
}

fn cmd(conversation: &str, text: &str) -> ProcessMessageCommand {
    ProcessMessageCommand::new(conversation, "user-1", text)
}

// =============================================================================
// Classification and routing
// =============================================================================

#[tokio::test]
async fn confident_greeting_goes_to_greeting_agent() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("greeting", 0.95)).build();

    let result = fx.handler.handle(cmd("c1", "Hello!")).await.unwrap();

    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.intent, Intent::Greeting);
    assert_eq!(result.confidence, 0.95);
    assert!(!result.used_fallback);
    assert!(result.persisted);
    assert_eq!(result.response, "Hello! How can I help?");
}

#[tokio::test]
async fn gibberish_falls_back_but_reports_unknown_and_raw_confidence() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("unknown", 0.2)).build();

    let result = fx.handler.handle(cmd("c1", "asdkjhasd")).await.unwrap();

    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.intent, Intent::Unknown);
    assert_eq!(result.confidence, 0.2);
    assert!(result.used_fallback);
    assert_eq!(fx.agents.greeting.call_count(), 1);
}

#[tokio::test]
async fn low_confidence_research_is_overridden_by_fallback() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.59)).build();

    let result = fx.handler.handle(cmd("c1", "maybe look into it")).await.unwrap();

    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.intent, Intent::Research);
    assert!(result.used_fallback);
    assert_eq!(fx.agents.research.call_count(), 0);
}

#[tokio::test]
async fn confidence_exactly_at_threshold_is_trusted() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.6)).build();

    let result = fx.handler.handle(cmd("c1", "Rust ownership")).await.unwrap();

    assert_eq!(result.agent, "ResearcherAgent");
    assert!(!result.used_fallback);
}

#[tokio::test]
async fn intent_without_registered_agent_routes_to_fallback() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("database", 0.9)).build();

    let result = fx.handler.handle(cmd("c1", "look up emp001")).await.unwrap();

    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.intent, Intent::Database);
    assert!(result.used_fallback);
}

#[tokio::test]
async fn classifier_sees_prior_turns() {
    let classifier = ScriptedClassifier::always("research", 0.9);
    let fx = FixtureBuilder::new(classifier.clone()).build();

    fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();
    fx.handler.handle(cmd("c1", "And its borrow checker?")).await.unwrap();

    let prompts = classifier.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].text.contains("Conversation so far"));
    assert!(prompts[1].text.contains("What is Rust?"));
    assert!(prompts[1].text.contains("Findings on: What is Rust?"));
    assert_eq!(prompts[1].message, "And its borrow checker?");
}

#[tokio::test]
async fn keyword_classifier_routes_an_email_request() {
    let fx = FixtureBuilder::new(KeywordClassificationService::new()).build();

    let result = fx
        .handler
        .handle(cmd("c1", "Write an email to my landlord"))
        .await
        .unwrap();

    assert_eq!(result.agent, "EmailWriterAgent");
    assert_eq!(result.intent, Intent::Email);
}

/// Standard LLM-backed registry and classifier sharing one scripted provider.
fn llm_backed_handler(provider: Arc<MockAIProvider>) -> ProcessMessageHandler {
    let state = ConversationStateStore::new(Arc::new(InMemoryConversationStore::new()));
    let registry = AgentRegistry::standard(provider.clone(), Intent::Greeting, 6).unwrap();
    let classifier = IntentClassifier::new(
        Arc::new(LlmClassificationService::new(provider)),
        ClassifierSettings::default(),
    );

    ProcessMessageHandler::new(
        state,
        Arc::new(classifier),
        Arc::new(registry),
        ResponseCache::disabled(),
        OrchestratorSettings::default(),
    )
}

#[tokio::test]
async fn every_provider_call_carries_the_turn_request_id() {
    let research = r#"{"intent": "research", "confidence": 0.9}"#;
    let provider = Arc::new(
        MockAIProvider::new()
            .with_response(research)
            .with_response("Rust is a systems language.")
            .with_response(research)
            .with_response("Ownership is checked at compile time."),
    );
    let handler = llm_backed_handler(provider.clone());

    let first = handler
        .handle(ProcessMessageCommand::new("c1", "u1", "What is Rust?"))
        .await
        .unwrap();
    let second = handler
        .handle(ProcessMessageCommand::new("c2", "u2", "What is ownership?"))
        .await
        .unwrap();

    assert_ne!(first.request_id, second.request_id);
    let calls = provider.calls();
    assert_eq!(calls.len(), 4);
    for (call, result, user) in [
        (&calls[0], &first, "u1"),
        (&calls[1], &first, "u1"),
        (&calls[2], &second, "u2"),
        (&calls[3], &second, "u2"),
    ] {
        assert_eq!(call.metadata.trace_id, result.request_id.to_string());
        assert_eq!(call.metadata.conversation_id.as_ref(), Some(&result.conversation_id));
        assert_eq!(call.metadata.user_id.as_ref().map(|u| u.as_str()), Some(user));
    }
}

#[tokio::test]
async fn agent_reply_details_are_reported_with_the_result() {
    let provider = Arc::new(
        MockAIProvider::new()
            .with_response(r#"{"intent": "greeting", "confidence": 0.95}"#)
            .with_response("Hi there!"),
    );
    let handler = llm_backed_handler(provider);

    let result = handler.handle(cmd("c1", "Hello!")).await.unwrap();

    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.response, "Hi there!");
    assert_eq!(
        result.agent_metadata.get("model").map(String::as_str),
        Some("mock-model-1")
    );
    assert!(result.agent_metadata.contains_key("total_tokens"));
}

// =============================================================================
// Degradation
// =============================================================================

#[tokio::test]
async fn classifier_timeout_routes_to_fallback_with_zero_confidence() {
    let classifier =
        ScriptedClassifier::always("research", 0.99).with_delay(Duration::from_millis(500));
    let fx = FixtureBuilder::new(classifier)
        .classifier_timeout(Duration::from_millis(50))
        .build();

    let result = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();

    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.intent, Intent::Unknown);
    assert!(result.classification_unavailable);
    assert!(result.used_fallback);
}

#[tokio::test]
async fn classifier_outage_still_persists_the_turn() {
    let fx = FixtureBuilder::new(ScriptedClassifier::failing(ClassifierError::Unavailable(
        "503".into(),
    )))
    .build();

    let result = fx.handler.handle(cmd("c1", "hi")).await.unwrap();

    assert!(result.persisted);
    assert_eq!(fx.history("c1").await.len(), 2);
}

#[tokio::test]
async fn failing_agent_is_replaced_by_an_apology_from_the_fallback() {
    let agents = Agents {
        research: ScriptedAgent::failing(
            "ResearcherAgent",
            HandlerError::Generation("model overloaded".into()),
        ),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .build();

    let result = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();

    assert_eq!(result.response, DEFAULT_APOLOGY);
    assert_eq!(result.agent, "GreetingAgent");
    assert_eq!(result.intent, Intent::Research);
    assert!(result.used_fallback);

    let history = fx.history("c1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].agent_name(), Some("GreetingAgent"));
    assert_eq!(history[1].content(), DEFAULT_APOLOGY);
}

#[tokio::test]
async fn slow_agent_times_out_into_an_apology() {
    let agents = Agents {
        research: ScriptedAgent::replying("ResearcherAgent", "late")
            .with_delay(Duration::from_millis(500)),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .handler_timeout(Duration::from_millis(50))
        .build();

    let result = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();

    assert_eq!(result.response, DEFAULT_APOLOGY);
    assert!(result.used_fallback);
}

#[tokio::test]
async fn persist_failure_still_returns_the_generated_reply() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .store(FlakyStore::failing_appends())
        .build();

    let result = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();

    assert_eq!(result.response, "Findings on: What is Rust?");
    assert!(!result.persisted);
    assert!(fx.history("c1").await.is_empty());
}

#[tokio::test]
async fn history_load_failure_is_storage_unavailable_and_calls_nothing() {
    let classifier = ScriptedClassifier::always("research", 0.9);
    let fx = FixtureBuilder::new(classifier.clone())
        .store(FlakyStore::failing_loads())
        .build();

    let err = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap_err();

    assert!(err.is_storage_unavailable());
    assert_eq!(classifier.call_count(), 0);
    assert_eq!(fx.agents.research.call_count(), 0);
    assert_eq!(fx.state.active_locks(), 0);
}

#[tokio::test]
async fn invalid_input_touches_no_state() {
    let classifier = ScriptedClassifier::always("greeting", 0.9);
    let store = InMemoryConversationStore::new();
    let fx = FixtureBuilder::new(classifier.clone())
        .store(store.clone())
        .build();

    for bad in [cmd("c1", ""), cmd("", "hi"), ProcessMessageCommand::new("c1", "bad user!", "hi")] {
        let err = fx.handler.handle(bad).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    assert_eq!(classifier.call_count(), 0);
    assert_eq!(store.conversation_count().await, 0);
}

// =============================================================================
// Response cache
// =============================================================================

fn cache_settings(ttl: Duration) -> CacheSettings {
    CacheSettings {
        ttl,
        ..CacheSettings::default()
    }
}

#[tokio::test]
async fn identical_request_with_identical_context_is_served_from_cache() {
    let classifier = ScriptedClassifier::always("research", 0.9);
    let fx = FixtureBuilder::new(classifier.clone())
        .cache(cache_settings(Duration::from_secs(60)))
        .build();

    let first = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();
    let second = fx.handler.handle(cmd("c2", "  what is   RUST? ")).await.unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.response, first.response);
    assert_eq!(second.agent, "ResearcherAgent");
    assert_eq!(second.intent, Intent::Research);
    assert!(!second.used_fallback);
    assert_eq!(classifier.call_count(), 1);
    assert_eq!(fx.agents.research.call_count(), 1);

    // Cached turns are still recorded in their own conversation
    assert_eq!(fx.history("c2").await.len(), 2);
}

#[tokio::test]
async fn different_history_misses_the_cache() {
    let classifier = ScriptedClassifier::always("research", 0.9);
    let fx = FixtureBuilder::new(classifier.clone())
        .cache(cache_settings(Duration::from_secs(60)))
        .build();

    fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();
    let again = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();

    assert!(!again.from_cache);
    assert_eq!(classifier.call_count(), 2);
}

#[tokio::test]
async fn expired_entries_are_not_served() {
    let classifier = ScriptedClassifier::always("research", 0.9);
    let fx = FixtureBuilder::new(classifier.clone())
        .cache(cache_settings(Duration::from_millis(50)))
        .build();

    fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    let later = fx.handler.handle(cmd("c2", "What is Rust?")).await.unwrap();

    assert!(!later.from_cache);
    assert_eq!(classifier.call_count(), 2);
}

#[tokio::test]
async fn degraded_turns_are_never_cached() {
    let classifier = ScriptedClassifier::always("research", 0.9)
        .then_fail(ClassifierError::Unavailable("blip".into()));
    let fx = FixtureBuilder::new(classifier.clone())
        .cache(cache_settings(Duration::from_secs(60)))
        .build();

    let degraded = fx.handler.handle(cmd("c1", "What is Rust?")).await.unwrap();
    let retried = fx.handler.handle(cmd("c2", "What is Rust?")).await.unwrap();

    assert!(degraded.classification_unavailable);
    assert!(!retried.from_cache);
    assert_eq!(retried.agent, "ResearcherAgent");
}

#[tokio::test]
async fn fallback_turns_are_not_replayed_from_cache() {
    let classifier = ScriptedClassifier::always("research", 0.59);
    let fx = FixtureBuilder::new(classifier.clone())
        .cache(cache_settings(Duration::from_secs(60)))
        .build();

    let first = fx.handler.handle(cmd("c1", "maybe rust?")).await.unwrap();
    let second = fx.handler.handle(cmd("c2", "maybe rust?")).await.unwrap();

    assert!(first.used_fallback);
    assert!(!second.from_cache);
    assert_eq!(classifier.call_count(), 2);
    assert_eq!(second.routing.intent.label, Intent::Greeting);
    assert_eq!(second.routing.selected_agent, "GreetingAgent");
}

// =============================================================================
// Concurrency, cancellation, clearing
// =============================================================================

#[tokio::test]
async fn concurrent_turns_on_one_conversation_are_serialized() {
    let agents = Agents {
        research: ScriptedAgent::echoing("ResearcherAgent", "re: ")
            .with_delay(Duration::from_millis(50)),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .build();

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let handler = fx.handler.clone();
            tokio::spawn(async move { handler.handle(cmd("c1", &format!("question {i}"))).await })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        assert!(result.unwrap().unwrap().persisted);
    }

    let history = fx.history("c1").await;
    assert_eq!(history.len(), 8);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Agent);
        assert_eq!(pair[1].content(), format!("re: {}", pair[0].content()));
    }
    for window in history.windows(2) {
        assert!(window[0].timestamp() < window[1].timestamp());
    }

    // Each turn saw every earlier turn
    let mut seen: Vec<usize> = fx
        .agents
        .research
        .calls()
        .iter()
        .map(|c| c.history_len)
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 2, 4, 6]);
    assert_eq!(fx.state.active_locks(), 0);
}

#[tokio::test]
async fn turns_are_committed_in_arrival_order() {
    let agents = Agents {
        research: ScriptedAgent::echoing("ResearcherAgent", "re: ")
            .with_delay(Duration::from_millis(100)),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .build();

    let mut tasks = Vec::new();
    for text in ["A", "B", "C"] {
        let handler = fx.handler.clone();
        tasks.push(tokio::spawn(async move { handler.handle(cmd("c1", text)).await }));
        tokio::time::sleep(Duration::from_millis(15)).await;
    }
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let asked: Vec<String> = fx
        .history("c1")
        .await
        .iter()
        .filter(|m| m.role() == Role::User)
        .map(|m| m.content().to_string())
        .collect();
    assert_eq!(asked, vec!["A", "B", "C"]);

    let handled: Vec<String> = fx
        .agents
        .research
        .calls()
        .into_iter()
        .map(|c| c.message)
        .collect();
    assert_eq!(handled, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn different_conversations_proceed_in_parallel() {
    let agents = Agents {
        research: ScriptedAgent::echoing("ResearcherAgent", "re: ")
            .with_delay(Duration::from_millis(300)),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .build();

    let started = Instant::now();
    let a = fx.handler.handle(cmd("c1", "first"));
    let b = fx.handler.handle(cmd("c2", "second"));
    let (a, b) = tokio::join!(a, b);

    assert!(a.is_ok() && b.is_ok());
    assert!(started.elapsed() < Duration::from_millis(550));
}

#[tokio::test]
async fn cancelled_turn_persists_nothing_and_releases_the_lock() {
    let agents = Agents {
        research: ScriptedAgent::echoing("ResearcherAgent", "re: ")
            .with_delay(Duration::from_secs(5)),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .build();

    let handler = fx.handler.clone();
    let task = tokio::spawn(async move { handler.handle(cmd("c1", "What is Rust?")).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert!(fx.history("c1").await.is_empty());
    assert_eq!(fx.state.active_locks(), 0);

    // The conversation is usable again
    let next = tokio::time::timeout(
        Duration::from_secs(1),
        fx.handler.handle(cmd("c1", "hello")),
    )
    .await;
    assert!(next.is_ok());
}

#[tokio::test]
async fn clear_is_idempotent_and_waits_for_in_flight_turns() {
    let agents = Agents {
        research: ScriptedAgent::echoing("ResearcherAgent", "re: ")
            .with_delay(Duration::from_millis(100)),
        ..Agents::default()
    };
    let fx = FixtureBuilder::new(ScriptedClassifier::always("research", 0.9))
        .agents(agents)
        .build();
    let clear = ClearConversationHandler::new(fx.state.clone());

    let handler = fx.handler.clone();
    let turn = tokio::spawn(async move { handler.handle(cmd("c1", "What is Rust?")).await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    clear.handle(ClearConversationCommand::new("c1")).await.unwrap();
    turn.await.unwrap().unwrap();

    // The clear ran after the turn committed
    assert!(fx.history("c1").await.is_empty());

    clear.handle(ClearConversationCommand::new("c1")).await.unwrap();
    clear.handle(ClearConversationCommand::new("never-used")).await.unwrap();
}

#[tokio::test]
async fn get_history_returns_turns_oldest_first() {
    let fx = FixtureBuilder::new(ScriptedClassifier::always("greeting", 0.9)).build();
    fx.handler.handle(cmd("c1", "hi")).await.unwrap();
    fx.handler.handle(cmd("c1", "hello again")).await.unwrap();

    let result = GetHistoryHandler::new(fx.state.clone())
        .handle(GetHistoryQuery::new("c1"))
        .await
        .unwrap();

    let contents: Vec<&str> = result.messages.iter().map(Message::content).collect();
    assert_eq!(
        contents,
        vec!["hi", "Hello! How can I help?", "hello again", "Hello! How can I help?"]
    );
}
