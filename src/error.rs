//! Error types for hotrelay
//!
//! Centralized error handling using thiserror. Every variant is fatal to a
//! run; an unsupported media type is not an error and is reported through
//! `RelayOutcome::Skipped` instead.

use thiserror::Error;

/// All error types that can occur during a relay run
#[derive(Debug, Error)]
pub enum RelayError {
    /// The candidate filter rejected every submission in the feed
    #[error("No suitable post found")]
    NoCandidates,

    /// Every eligible candidate already has a processed record
    #[error("All eligible posts have already been relayed")]
    NoUnprocessedCandidate,

    /// Media download returned a non-success status
    #[error("Got response {status} from {url}")]
    Fetch { url: String, status: u16 },

    /// Media upload or status post failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Record store failure
    #[error("Storage error: {0}")]
    Store(String),

    /// Feed reader authentication or network failure
    #[error("Feed error: {0}")]
    Feed(String),

    /// Missing or invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<rusqlite::Error> for RelayError {
    fn from(err: rusqlite::Error) -> Self {
        RelayError::Store(err.to_string())
    }
}

/// Result type alias for hotrelay operations
pub type Result<T> = std::result::Result<T, RelayError>;
