//! Application handlers.
//!
//! Command and query handlers that orchestrate the routing components.

pub mod routing;
