//! HTTP handlers for the conversation endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    ClearConversationCommand, ClearConversationHandler, GetHistoryHandler, GetHistoryQuery,
    ProcessMessageCommand, ProcessMessageHandler, RoutingError,
};

use super::dto::{
    ClearConversationResponse, ErrorResponse, HistoryResponse, SendMessageRequest,
    SendMessageResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct RoutingHandlers {
    process_handler: Arc<ProcessMessageHandler>,
    history_handler: Arc<GetHistoryHandler>,
    clear_handler: Arc<ClearConversationHandler>,
}

impl RoutingHandlers {
    pub fn new(
        process_handler: Arc<ProcessMessageHandler>,
        history_handler: Arc<GetHistoryHandler>,
        clear_handler: Arc<ClearConversationHandler>,
    ) -> Self {
        Self {
            process_handler,
            history_handler,
            clear_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/conversations/:conversation_id/messages - Run one chat turn
pub async fn send_message(
    State(handlers): State<RoutingHandlers>,
    Path(conversation_id): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };
    let cmd = ProcessMessageCommand::new(conversation_id, req.user_id, req.message);

    match handlers.process_handler.handle(cmd).await {
        Ok(result) => {
            let response = SendMessageResponse::from(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_routing_error(e),
    }
}

/// GET /api/v1/conversations/:conversation_id/messages - Conversation history
pub async fn get_history(
    State(handlers): State<RoutingHandlers>,
    Path(conversation_id): Path<String>,
) -> Response {
    match handlers
        .history_handler
        .handle(GetHistoryQuery::new(conversation_id))
        .await
    {
        Ok(result) => (StatusCode::OK, Json(HistoryResponse::from(result))).into_response(),
        Err(e) => handle_routing_error(e),
    }
}

/// DELETE /api/v1/conversations/:conversation_id - Clear history
pub async fn clear_conversation(
    State(handlers): State<RoutingHandlers>,
    Path(conversation_id): Path<String>,
) -> Response {
    match handlers
        .clear_handler
        .handle(ClearConversationCommand::new(conversation_id))
        .await
    {
        Ok(result) => {
            let response = ClearConversationResponse {
                conversation_id: result.conversation_id.to_string(),
                cleared: true,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_routing_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

/// Malformed, incomplete or mistyped bodies get the same error shape as
/// every other client error.
fn handle_body_rejection(rejection: JsonRejection) -> Response {
    (
        rejection.status(),
        Json(ErrorResponse::invalid_body(rejection.body_text())),
    )
        .into_response()
}

fn handle_routing_error(error: RoutingError) -> Response {
    match error {
        RoutingError::InvalidInput(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        )
            .into_response(),
        RoutingError::StorageUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::service_unavailable(
                "Conversation storage is temporarily unavailable",
            )),
        )
            .into_response(),
    }
}
