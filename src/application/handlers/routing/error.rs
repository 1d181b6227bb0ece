//! Request-level errors shared by the conversation handlers.
//!
//! Only fatal failures appear here. Classifier and agent failures are
//! absorbed by the orchestrator and never reach the caller.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::ports::StorageError;

#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    /// Rejected before any state was touched.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The conversation store could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StorageError> for RoutingError {
    fn from(err: StorageError) -> Self {
        RoutingError::StorageUnavailable(err.to_string())
    }
}

impl RoutingError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RoutingError::InvalidInput(_))
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, RoutingError::StorageUnavailable(_))
    }
}
