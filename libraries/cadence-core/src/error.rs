//! Error types for the track and queue model

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building tracks and queues
#[derive(Debug, Error)]
pub enum CoreError {
    /// Track could not be built from the given input
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// Audio file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Container probing failed or reported no usable duration
    #[error("Probe error: {0}")]
    Probe(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Queue (de)serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid track error
    pub fn invalid_track(msg: impl Into<String>) -> Self {
        Self::InvalidTrack(msg.into())
    }

    /// Create a probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }
}
