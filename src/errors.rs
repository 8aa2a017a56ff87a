// Copyright 2025 Cowboy AI, LLC.

//! Error types for workflow domain operations

use thiserror::Error;

/// Errors that can occur in workflow domain operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed input, e.g. an empty code or duplicate statuses at creation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Attempt to add a status or transition that already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Reference to a status, transition or default status that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The aggregate changed between load and save
    #[error("Concurrency conflict: expected version {expected}, but found {actual}")]
    ConcurrencyConflict {
        /// Expected version
        expected: u64,
        /// Actual version
        actual: u64,
    },

    /// Aggregate not found
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(String),

    /// Invariant violation, e.g. an event stream that does not start with a creation event
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl DomainError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound(_) | DomainError::AggregateNotFound(_)
        )
    }

    /// Check if this is an already exists error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, DomainError::AlreadyExists(_))
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DomainError::ValidationError(_) | DomainError::InvariantViolation(_)
        )
    }

    /// Check if this is a concurrency error
    pub fn is_concurrency_error(&self) -> bool {
        matches!(self, DomainError::ConcurrencyConflict { .. })
    }
}
