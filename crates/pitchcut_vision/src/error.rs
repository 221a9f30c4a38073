//! Error types for analyzer operations.

use thiserror::Error;

/// Errors that can occur when calling the analyzer or driving windowed
/// detection.
#[derive(Debug, Error)]
pub enum Error {
    /// The per-call timeout elapsed.
    #[error("analyzer call timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// Rate limited by the analyzer service.
    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Number of seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// API request failed with a non-success status.
    #[error("analyzer request failed with status {status}: {message}")]
    ApiStatus {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Invalid or missing API key.
    #[error("invalid API key")]
    InvalidApiKey,

    /// The analyzer refused the content with a safety/block signal.
    #[error("analyzer blocked the request: {reason}")]
    SafetyBlocked {
        /// Block reason reported by the service.
        reason: String,
    },

    /// The analyzer returned no usable text.
    #[error("analyzer returned an empty response")]
    EmptyResponse,

    /// The response text was not valid JSON for the event schema.
    #[error("response failed schema validation: {0}")]
    SchemaValidation(String),

    /// A window or batch failed inside the detection pipeline.
    #[error("detection failed for match {match_id} at step {step}: {message}")]
    Pipeline {
        /// Match being processed.
        match_id: String,
        /// Pipeline step that failed.
        step: String,
        /// Aggregated failure description.
        message: String,
    },

    /// Network error.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// Returns true for failures worth noting as transient (timeouts,
    /// throttling, network, 5xx). Used for logging and diagnostics; the
    /// retry budget applies to every kind because the analyzer may
    /// re-sample a schema-invalid response into a valid one.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Network(_) => true,
            Self::ApiStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, Error>;
