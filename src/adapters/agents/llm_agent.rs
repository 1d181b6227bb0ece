//! Generic LLM-backed agent.
//!
//! One `LlmAgent` per `AgentKind`; the kind's profile supplies the system
//! prompt, temperature and token limit.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::conversation::{recent, Message, Role};
use crate::domain::routing::{AgentKind, AgentProfile, TurnContext};
use crate::ports::{
    AIError, AIProvider, AgentHandler, AgentReply, CompletionRequest, HandlerError, MessageRole,
    RequestMetadata,
};

/// Default number of prior messages forwarded to the model.
pub const DEFAULT_AGENT_HISTORY: usize = 6;

pub struct LlmAgent {
    profile: AgentProfile,
    provider: Arc<dyn AIProvider>,
    history_turns: usize,
}

impl LlmAgent {
    pub fn new(kind: AgentKind, provider: Arc<dyn AIProvider>) -> Self {
        Self {
            profile: kind.profile(),
            provider,
            history_turns: DEFAULT_AGENT_HISTORY,
        }
    }

    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    pub fn kind(&self) -> AgentKind {
        self.profile.kind
    }

    fn build_request(
        &self,
        context: &TurnContext,
        message: &str,
        history: &[Message],
    ) -> CompletionRequest {
        let metadata = RequestMetadata::for_turn(context);

        let mut request = CompletionRequest::new(metadata)
            .with_system_prompt(self.profile.system_prompt())
            .with_temperature(self.profile.temperature)
            .with_max_tokens(self.profile.max_tokens);

        for prior in recent(history, self.history_turns) {
            let role = match prior.role() {
                Role::User => MessageRole::User,
                Role::Agent => MessageRole::Assistant,
            };
            request = request.with_message(role, prior.content());
        }

        request.with_message(MessageRole::User, message)
    }
}

impl From<AIError> for HandlerError {
    fn from(err: AIError) -> Self {
        HandlerError::Generation(err.to_string())
    }
}

#[async_trait]
impl AgentHandler for LlmAgent {
    fn name(&self) -> &str {
        self.profile.kind.name()
    }

    async fn handle(
        &self,
        context: &TurnContext,
        message: &str,
        history: &[Message],
    ) -> Result<AgentReply, HandlerError> {
        let request = self.build_request(context, message, history);
        let response = self.provider.complete(request).await?;

        let content = response.content.trim();
        if content.is_empty() {
            return Err(HandlerError::EmptyResponse);
        }

        Ok(AgentReply::new(content)
            .with_metadata("model", response.model)
            .with_metadata("total_tokens", response.usage.total_tokens.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::foundation::{ConversationId, RequestId, Timestamp, UserId};
    use crate::ports::AIError;

    fn context() -> TurnContext {
        TurnContext::new(
            RequestId::new(),
            ConversationId::new("conv-1").unwrap(),
            UserId::new("user-1").unwrap(),
        )
    }

    fn history(pairs: usize) -> Vec<Message> {
        let conv = ConversationId::new("conv-1").unwrap();
        let user = UserId::new("user-1").unwrap();
        let mut out = Vec::new();
        let mut ts = Timestamp::now();
        for i in 0..pairs {
            out.push(Message::user(conv.clone(), user.clone(), format!("q{}", i), ts));
            ts = Timestamp::now_after(Some(&ts));
            out.push(Message::agent(
                conv.clone(),
                user.clone(),
                format!("a{}", i),
                "ResearcherAgent",
                ts,
            ));
            ts = Timestamp::now_after(Some(&ts));
        }
        out
    }

    #[tokio::test]
    async fn forwards_recent_history_with_mapped_roles() {
        let provider = Arc::new(MockAIProvider::new().with_response("Here you go"));
        let agent = LlmAgent::new(AgentKind::Research, provider.clone()).with_history_turns(2);

        let reply = agent.handle(&context(), "explain rust", &history(3)).await.unwrap();

        assert_eq!(reply.content, "Here you go");
        let calls = provider.calls();
        let messages = &calls[0].messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "q2");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "a2");
        assert_eq!(calls[0].last_user_message(), Some("explain rust"));
        assert_eq!(
            calls[0].metadata.conversation_id.as_ref().map(|c| c.as_str()),
            Some("conv-1")
        );
    }

    #[tokio::test]
    async fn first_turn_request_carries_turn_identity() {
        let provider = Arc::new(MockAIProvider::new().with_response("Hi!"));
        let agent = LlmAgent::new(AgentKind::Greeting, provider.clone());
        let context = context();

        agent.handle(&context, "hello", &[]).await.unwrap();

        let metadata = &provider.calls()[0].metadata;
        assert_eq!(metadata.trace_id, context.request_id.to_string());
        assert_eq!(metadata.conversation_id, Some(context.conversation_id.clone()));
        assert_eq!(metadata.user_id, Some(context.user_id.clone()));
    }

    #[tokio::test]
    async fn uses_kind_profile() {
        let provider = Arc::new(MockAIProvider::new());
        let agent = LlmAgent::new(AgentKind::Email, provider.clone());

        agent.handle(&context(), "write an email", &[]).await.unwrap();

        let call = &provider.calls()[0];
        assert_eq!(call.system_prompt, Some(AgentKind::Email.profile().system_prompt()));
        assert_eq!(agent.name(), "EmailWriterAgent");
    }

    #[tokio::test]
    async fn blank_generation_is_an_error() {
        let provider = Arc::new(MockAIProvider::new().with_response("   "));
        let agent = LlmAgent::new(AgentKind::Greeting, provider);

        let err = agent.handle(&context(), "hi", &[]).await.unwrap_err();
        assert!(matches!(err, HandlerError::EmptyResponse));
    }

    #[tokio::test]
    async fn provider_failure_is_a_generation_error() {
        let provider = Arc::new(MockAIProvider::new().with_error(AIError::AuthenticationFailed));
        let agent = LlmAgent::new(AgentKind::Database, provider);

        let err = agent.handle(&context(), "list employees", &[]).await.unwrap_err();
        assert!(matches!(err, HandlerError::Generation(_)));
    }
}
