//! Error types for the Vitatone core

use thiserror::Error;

/// Errors produced by the metrics and plan engine
///
/// None of these are fatal. Callers inspect the variant and decide how to
/// surface it: `InvalidInput` is a client error, `CollaboratorUnavailable` is
/// retryable, and `UnparseablePlan` is normally recovered before it reaches a
/// caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unparseable plan: {0}")]
    UnparseablePlan(String),

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),
}

impl CoreError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidInput(message.into())
    }

    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::CollaboratorUnavailable(_))
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
