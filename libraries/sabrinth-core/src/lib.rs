//! Core domain types and platform traits for the Sabrinth player
//!
//! This crate defines the shared vocabulary of the player: tracks and their
//! identity, metadata, playback state, play statistics, and the traits that
//! decouple the engine from concrete platform integrations (tag parsing,
//! audio output, remote downloads).

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use traits::{
    AudioBackend, AudioBackendEvent, BackendHandle, DownloadProvider, DownloadedFile, SearchHit,
    SidecarReader, TagReader,
};
pub use types::{
    HydrationState, PlaybackState, SeekOrigin, SourceOrigin, StatKind, Track, TrackId,
    TrackMetadata, TrackStats, WrapMode,
};
