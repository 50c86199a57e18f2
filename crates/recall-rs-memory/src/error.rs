//! Error types for memory store operations.

use std::time::Duration;

/// Errors returned by memory stores.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Transient network or service failure.
    #[error("memory store unavailable: {0}")]
    StoreUnavailable(String),
    /// No history exists for the requested key.
    #[error("no memory found: {0}")]
    NotFound(String),
    /// Malformed input, such as an empty turn.
    #[error("invalid memory input: {0}")]
    Validation(String),
    /// The call did not finish within its deadline.
    #[error("memory store call timed out after {0:?}")]
    Timeout(Duration),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl MemoryError {
    /// True when the store reported that nothing exists for the key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MemoryError::NotFound(_))
    }

    /// True when the call was cut off by a deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MemoryError::Timeout(_))
    }
}
