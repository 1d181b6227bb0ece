//! HTTP routes for the conversation endpoints.

use axum::{
    routing::{delete, post},
    Router,
};

use super::handlers::{clear_conversation, get_history, send_message, RoutingHandlers};

/// Creates the conversation router, to be nested under `/api/v1`.
pub fn conversation_routes(handlers: RoutingHandlers) -> Router {
    Router::new()
        .route(
            "/conversations/:conversation_id/messages",
            post(send_message).get(get_history),
        )
        .route("/conversations/:conversation_id", delete(clear_conversation))
        .with_state(handlers)
}
