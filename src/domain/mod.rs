//! Domain layer containing routing policy and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, validation errors)
//! - `conversation` - Messages and the append-only conversation log
//! - `routing` - Intents, agents, confidence policy, cache keys, turn stages

pub mod conversation;
pub mod foundation;
pub mod routing;
