//! Error types for report building

use thiserror::Error;

/// Errors surfaced to callers of the report service
#[derive(Debug, Error)]
pub enum ContextError {
    /// Request rejected (empty input, unresolvable address)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request's cancellation token fired
    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Common(#[from] lcx_common::Error),
}

impl ContextError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ContextError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ContextError>;
