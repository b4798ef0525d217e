/// Ingestion-specific errors
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `IngestError`
pub type Result<T> = std::result::Result<T, IngestError>;

/// Ingestion error types
///
/// `Entry` errors are per-candidate and never abort a batch; the other
/// variants mean the source itself could not be opened.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Source path does not exist
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Source exists but is not usable (wrong type, bad extension)
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Archive could not be opened or read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// One candidate could not be read
    #[error("{path}: {reason}")]
    Entry {
        /// Candidate the error belongs to
        path: PathBuf,
        /// Human-readable failure description
        reason: String,
    },

    /// Background worker panicked or was aborted
    #[error("Ingest worker failed: {0}")]
    Worker(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from the core layer
    #[error(transparent)]
    Core(#[from] sabrinth_core::CoreError),
}

impl IngestError {
    /// Create a per-candidate error
    pub fn entry(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Entry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
