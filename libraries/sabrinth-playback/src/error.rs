/// Playback-specific errors
use thiserror::Error;

/// Result type alias using `PlaybackError`
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Playback error types
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// No track is selected in the queue
    #[error("No current track")]
    NoCurrentTrack,

    /// The queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Queue index out of bounds
    #[error("Index {index} out of bounds (queue length {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Queue length at the time
        len: usize,
    },

    /// Seek requested but the track duration is unknown
    #[error("Track duration unavailable")]
    DurationUnavailable,

    /// Operation not valid in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Audio backend error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<sabrinth_core::CoreError> for PlaybackError {
    fn from(err: sabrinth_core::CoreError) -> Self {
        Self::Backend(err.to_string())
    }
}
