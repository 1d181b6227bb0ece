//! HTTP adapters - REST API over the conversation handlers.
//!
//! - `routing` - send message, read history, clear conversation
//! - `health` - liveness probe

pub mod health;
pub mod routing;

pub use routing::{conversation_routes, ErrorResponse, RoutingHandlers};

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Assembles the full application router with middleware.
///
/// The timeout layer drops the in-flight handler future when it fires, which
/// cancels the turn; a cancelled turn never persists a partial exchange.
pub fn build_router(handlers: RoutingHandlers, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", conversation_routes(handlers))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
