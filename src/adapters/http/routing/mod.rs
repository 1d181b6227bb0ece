//! HTTP adapter for conversation endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ClearConversationResponse, ErrorResponse, HistoryResponse, MessageView, SendMessageRequest,
    SendMessageResponse,
};
pub use handlers::RoutingHandlers;
pub use routes::conversation_routes;
