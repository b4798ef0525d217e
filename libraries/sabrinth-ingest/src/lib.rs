//! Sabrinth Ingest
//!
//! The ingestion pipeline: turns track sources (folders, ZIP archives,
//! download results, saved playlists) into library records.
//!
//! Ingestion is two-phase. Discovered files are inserted into the metadata
//! store as placeholders immediately, in source order, so the queue is usable
//! right away; hydration then fills in real metadata (embedded tags, then
//! sidecar documents, then filename parsing) and streams progress events to
//! the host.

mod archive;
mod error;
mod pipeline;
mod scanner;
mod source;
mod types;

pub use archive::{extract_zip, ExtractOutcome};
pub use error::{IngestError, Result};
pub use pipeline::{IngestHandle, IngestPipeline};
pub use scanner::{is_audio_file, FolderScanner, ScanOutcome, SUPPORTED_EXTENSIONS};
pub use source::{Enumeration, RawCandidate, TrackSource};
pub use types::{CancelToken, IngestConfig, IngestEvent, IngestSummary};
