//! Conversation domain - messages and the per-conversation log.

mod conversation;
mod message;

pub use conversation::Conversation;
pub use message::{recent, Message, Role};
