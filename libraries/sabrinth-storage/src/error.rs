/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Named entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input (for example an empty playlist name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for sabrinth_core::CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => sabrinth_core::CoreError::Other(format!(
                "Not found: {what}"
            )),
            StorageError::InvalidInput(msg) => sabrinth_core::CoreError::InvalidInput(msg),
            StorageError::Serialization(e) => sabrinth_core::CoreError::Serialization(e),
            StorageError::Io(e) => sabrinth_core::CoreError::Io(e),
        }
    }
}
