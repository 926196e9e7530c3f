//! Error types for lorad.

use thiserror::Error;

/// Common error type for lorad.
#[derive(Error, Debug)]
pub enum LoradError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request input (missing or empty fields, malformed URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A client-supplied name escaped the managed root.
    ///
    /// Carries no payload so the resolved path can never leak into a
    /// client-visible message.
    #[error("forbidden path")]
    PathTraversal,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Download from a remote source failed.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for lorad operations.
pub type Result<T> = std::result::Result<T, LoradError>;
