//! Error types for the stream store.

use thiserror::Error;

/// Main error type for stream operations.
///
/// Every variant describes a malformed request. Unknown streams are never
/// an error, and the store's locks cannot fail, so nothing here is
/// transient or worth retrying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("Streams parameter is required")]
    MissingStreams,

    #[error("Streams and IDs must be paired (got {tokens} tokens)")]
    UnpairedStreams { tokens: usize },

    #[error("Invalid count: {0}")]
    InvalidCount(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid stream ID: {0}")]
    InvalidId(String),

    #[error("Invalid fields: {0}")]
    InvalidFields(String),
}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        StreamError::InvalidFields(e.to_string())
    }
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
