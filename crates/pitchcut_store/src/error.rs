//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store rejected a write.
    #[error("store write failed for match {match_id}: {message}")]
    WriteFailed {
        /// Match whose documents were being written.
        match_id: String,
        /// Backend failure description.
        message: String,
    },

    /// Serialization of a document body failed.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;
