/// Core traits for the Sabrinth player
///
/// These traits sit at the platform seams: tag parsing, sidecar documents,
/// audio output, and remote downloads. The engine crates depend only on these
/// abstractions so that tests can substitute scripted fakes.
use crate::error::Result;
use crate::types::TrackMetadata;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tag reader trait
///
/// Implementers extract embedded metadata (ID3, Vorbis comments, MP4 atoms)
/// from audio files.
pub trait TagReader: Send + Sync {
    /// Read embedded metadata from an audio file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    fn read_tags(&self, path: &Path) -> Result<TrackMetadata>;
}

/// Sidecar metadata reader trait
///
/// Implementers locate and parse metadata documents that live next to an
/// audio file (for example the `.info.json` files written by downloaders).
pub trait SidecarReader: Send + Sync {
    /// Probe the conventional sidecar locations for an audio file
    ///
    /// Returns `Ok(None)` when no sidecar exists; a present but malformed
    /// sidecar is an error.
    fn read_sidecar(&self, audio_path: &Path) -> Result<Option<TrackMetadata>>;

    /// Parse a sidecar document at a known location
    fn read_document(&self, sidecar_path: &Path) -> Result<TrackMetadata>;
}

/// Handle identifying one `open` call on an audio backend
///
/// Handles are monotonically increasing within a backend instance. Events
/// carry the handle they belong to, which lets the controller discard stale
/// completion notices from tracks it has already moved past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendHandle(pub u64);

/// Asynchronous notifications from an audio backend
#[derive(Debug, Clone, PartialEq)]
pub enum AudioBackendEvent {
    /// The track opened under `handle` reached its natural end
    TrackEnded {
        /// Handle of the `open` call this event belongs to
        handle: BackendHandle,
    },
    /// Playback of the track opened under `handle` failed mid-stream
    PlaybackFailed {
        /// Handle of the `open` call this event belongs to
        handle: BackendHandle,
        /// Human-readable failure description
        reason: String,
    },
}

/// Platform audio backend
///
/// Implementers own the actual decode/output machinery. The playback
/// controller drives this trait synchronously and drains asynchronous
/// completion events via [`AudioBackend::poll_events`].
pub trait AudioBackend: Send {
    /// Open a file for playback, replacing any currently open track
    ///
    /// Returns a fresh handle that later events will reference.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or decoded
    fn open(&mut self, path: &Path) -> Result<BackendHandle>;

    /// Start or resume playback of the open track
    fn play(&mut self) -> Result<()>;

    /// Pause playback, retaining position
    fn pause(&mut self) -> Result<()>;

    /// Stop playback and release the open track
    fn stop(&mut self) -> Result<()>;

    /// Seek within the open track
    ///
    /// # Errors
    /// Returns an error if no track is open or the backend cannot seek
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Current playback position, `Duration::ZERO` if nothing is open
    fn position(&self) -> Duration;

    /// Duration of the open track, if the backend knows it
    fn duration(&self) -> Option<Duration>;

    /// Set output gain (0.0 = silent, 1.0 = full volume)
    fn set_volume(&mut self, gain: f32);

    /// Current output gain
    fn volume(&self) -> f32;

    /// Recent output signal level in [0.0, 1.0], for loudness adaptation
    ///
    /// Backends without level metering return 0.0.
    fn output_level(&self) -> f32 {
        0.0
    }

    /// Drain pending asynchronous events
    ///
    /// Called periodically by the controller. Events must be returned in the
    /// order they occurred.
    fn poll_events(&mut self) -> Vec<AudioBackendEvent>;
}

/// One file produced by a download operation
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    /// Path of the downloaded audio file
    pub path: PathBuf,
    /// Sidecar metadata document written alongside, if any
    pub sidecar: Option<PathBuf>,
}

/// One candidate returned by a remote search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Display title of the result
    pub title: String,
    /// Uploader or channel name, if the provider reports one
    pub uploader: Option<String>,
    /// Track length, if the provider reports one
    pub duration: Option<Duration>,
    /// Reference to pass to [`DownloadProvider::download`]
    pub url: String,
}

/// Remote download and search provider
///
/// Implementers fetch remote audio (single items or whole playlists) into a
/// local directory and report the files they produced, in manifest order.
#[async_trait::async_trait]
pub trait DownloadProvider: Send + Sync {
    /// Search the remote catalog, returning at most `limit` candidates
    ///
    /// # Errors
    /// Returns an error if the query cannot be executed
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Download the audio behind `url` into `dest_dir`
    ///
    /// # Errors
    /// Returns an error if the download fails entirely; partial results are
    /// returned as the successful subset.
    async fn download(&self, url: &str, dest_dir: &Path) -> Result<Vec<DownloadedFile>>;
}
