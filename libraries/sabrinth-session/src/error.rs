/// Session-level errors
use thiserror::Error;

/// Result type alias using `SessionError`
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session facade
#[derive(Error, Debug)]
pub enum SessionError {
    /// Playback controller error
    #[error("Playback error: {0}")]
    Playback(#[from] sabrinth_playback::PlaybackError),

    /// Persistent storage error
    #[error("Storage error: {0}")]
    Storage(#[from] sabrinth_storage::StorageError),

    /// Core error
    #[error("{0}")]
    Core(#[from] sabrinth_core::CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
