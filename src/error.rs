//! Engine error taxonomy.
//!
//! Every error is scoped to the single requested operation; nothing
//! here is fatal to the process. All mutations are idempotent
//! overwrites, so `Store` failures are safe to retry.

use thiserror::Error;

use crate::database::store::StoreError;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed input (empty id, non-positive level, self-report).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The targeted user, call, or report does not exist where existence is required.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate call start.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The underlying store was unreachable or a write failed. Retryable.
    #[error("store failure")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
