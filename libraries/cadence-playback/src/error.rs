//! Error types for playback scheduling

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Audio file does not exist
    #[error("File missing: {0}")]
    FileMissing(String),

    /// Native player could not open or prepare the file
    #[error("Decode error: {0}")]
    Decode(String),

    /// No channel registered under this name
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Seek offset lies outside the queue
    #[error("Invalid seek position: {0:?}")]
    InvalidSeekPosition(std::time::Duration),

    /// Invalid engine configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Track or queue model error
    #[error(transparent)]
    Core(#[from] cadence_core::CoreError),
}

impl PlaybackError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
