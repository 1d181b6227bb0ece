use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use agent_router::adapters::ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use agent_router::adapters::cache::{InMemoryResponseCache, RedisResponseCache};
use agent_router::adapters::classifier::{KeywordClassificationService, LlmClassificationService};
use agent_router::adapters::http::{build_router, RoutingHandlers};
use agent_router::adapters::postgres::PostgresConversationStore;
use agent_router::adapters::storage::{FileConversationStore, InMemoryConversationStore};
use agent_router::application::{
    AgentRegistry, ClearConversationHandler, ConversationStateStore, GetHistoryHandler,
    IntentClassifier, ProcessMessageHandler, ResponseCache,
};
use agent_router::config::{
    AiConfig, AiProviderKind, AppConfig, CacheBackend, CacheConfig, ClassifierBackend, LogFormat,
    ServerConfig, StorageBackend, StorageConfig,
};
use agent_router::ports::{AIProvider, CacheStore, ClassificationService, ConversationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.server);
    config.validate().context("validating configuration")?;

    tracing::info!(
        environment = ?config.server.environment,
        provider = ?config.ai.provider,
        storage = ?config.storage.backend,
        cache = ?config.cache.backend,
        "Starting agent router"
    );

    let agent_provider = build_provider(&config.ai, &config.ai.model)?;
    let classifier_service = build_classifier(&config, agent_provider.clone())?;

    let registry = AgentRegistry::standard(
        agent_provider,
        config.routing.fallback_intent,
        config.routing.max_history_turns,
    )
    .context("building agent registry")?;
    tracing::info!(agents = ?registry.agent_names(), "Agent registry ready");

    let classifier =
        IntentClassifier::new(classifier_service, config.routing.classifier_settings());
    let state = ConversationStateStore::new(build_store(&config.storage).await?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cache = build_cache(&config.cache, shutdown_rx).await;

    let process = ProcessMessageHandler::new(
        state.clone(),
        Arc::new(classifier),
        Arc::new(registry),
        cache,
        config.routing.orchestrator_settings(),
    );
    let handlers = RoutingHandlers::new(
        Arc::new(process),
        Arc::new(GetHistoryHandler::new(state.clone())),
        Arc::new(ClearConversationHandler::new(state)),
    );

    let app = build_router(handlers, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Background workers stop once the server has drained
    shutdown_tx.send(true).ok();
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match server.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn build_provider(ai: &AiConfig, model: &str) -> anyhow::Result<Arc<dyn AIProvider>> {
    match ai.provider {
        AiProviderKind::Mock => Ok(Arc::new(MockAIProvider::new().with_default_response(
            "This is an offline reply. Configure an LLM provider for real answers.",
        ))),
        AiProviderKind::OpenAI => {
            let api_key = ai
                .api_key
                .as_ref()
                .map(|k| secrecy::ExposeSecret::expose_secret(k).clone())
                .unwrap_or_default();
            let provider = OpenAIProvider::new(
                OpenAIConfig::new(api_key)
                    .with_model(model)
                    .with_base_url(ai.base_url.clone())
                    .with_timeout(ai.timeout())
                    .with_max_retries(ai.max_retries),
            )?;
            Ok(Arc::new(provider))
        }
    }
}

fn build_classifier(
    config: &AppConfig,
    agent_provider: Arc<dyn AIProvider>,
) -> anyhow::Result<Arc<dyn ClassificationService>> {
    let offline = config.ai.provider == AiProviderKind::Mock;
    match config.routing.classifier {
        ClassifierBackend::Keyword => Ok(Arc::new(KeywordClassificationService::new())),
        ClassifierBackend::Llm if offline => {
            tracing::warn!("Mock provider cannot classify; using keyword classifier");
            Ok(Arc::new(KeywordClassificationService::new()))
        }
        ClassifierBackend::Llm => {
            let model = config.ai.classification_model();
            let provider = if model == config.ai.model {
                agent_provider
            } else {
                build_provider(&config.ai, model)?
            };
            Ok(Arc::new(LlmClassificationService::new(provider)))
        }
    }
}

async fn build_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn ConversationStore>> {
    match storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryConversationStore::new())),
        StorageBackend::File => {
            tokio::fs::create_dir_all(&storage.data_dir)
                .await
                .with_context(|| format!("creating {}", storage.data_dir.display()))?;
            Ok(Arc::new(FileConversationStore::new(&storage.data_dir)))
        }
        StorageBackend::Postgres => {
            let url = storage.database_url.as_deref().unwrap_or_default();
            let pool = PgPoolOptions::new()
                .max_connections(storage.max_connections)
                .connect(url)
                .await
                .context("connecting to PostgreSQL")?;
            let store = PostgresConversationStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}

/// Builds the response cache; an unreachable Redis disables caching
/// rather than blocking startup. The memory backend gets a background
/// sweeper that runs until `shutdown` fires.
async fn build_cache(cache: &CacheConfig, shutdown: watch::Receiver<bool>) -> ResponseCache {
    if !cache.enabled {
        return ResponseCache::disabled();
    }

    let store: Arc<dyn CacheStore> = match cache.backend {
        CacheBackend::Memory => {
            let memory = InMemoryResponseCache::new();
            let sweeper = memory.clone();
            let interval = cache.purge_interval();
            tokio::spawn(async move { sweeper.run_purge(interval, shutdown).await });
            Arc::new(memory)
        }
        CacheBackend::Redis => {
            let url = cache.redis_url.as_deref().unwrap_or_default();
            match RedisResponseCache::connect(url).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::warn!(error = %e, "Redis unavailable; response cache disabled");
                    return ResponseCache::disabled();
                }
            }
        }
    };

    ResponseCache::new(store, cache.cache_settings())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
