//! Errors surfaced by the credential store contract.

use thiserror::Error;

/// Persistence failures, classified so callers can translate them
/// without inspecting driver-specific errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule rejected the write (e.g. duplicate email).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The addressed record does not exist.
    #[error("record not found")]
    NotFound,

    /// Connection or query failure.
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation(message.into())
    }
}
