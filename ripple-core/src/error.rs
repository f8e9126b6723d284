//! Error types for surface operations.

use thiserror::Error;

/// Result type for ripple surface operations.
pub type RippleResult<T> = Result<T, RippleError>;

/// Errors that can occur while mutating a ripple surface.
///
/// None of these escape the lifecycle controller: it logs them and drops the
/// affected ripple instead.
#[derive(Debug, Error)]
pub enum RippleError {
    /// Node not found in the element tree.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Node is not attached where the operation expected it.
    #[error("Node detached: {0}")]
    Detached(String),

    /// Tree or option serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The browser DOM rejected an operation.
    #[error("DOM error: {0}")]
    Dom(String),
}
