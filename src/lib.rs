//! Agent Router - intent classification and routing for multi-agent chat.
//!
//! Each inbound message is classified into one of a closed set of intents,
//! routed to the agent registered for that intent (or a fallback agent when
//! confidence is low), and the exchange is appended to the conversation's
//! history. Turns on one conversation are serialized; different
//! conversations proceed in parallel.
//!
//! Layout follows ports and adapters:
//! - `domain` - pure types and policies
//! - `ports` - async traits for LLMs, classifiers, agents, stores, caches
//! - `application` - the routing components and the orchestrator
//! - `adapters` - concrete implementations and the HTTP transport
//! - `config` - environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
