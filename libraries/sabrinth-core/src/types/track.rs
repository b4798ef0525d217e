/// Track domain types
use crate::types::filename;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Stable track identifier
///
/// Derived from the track's file path, so the same file always maps to the
/// same id across sessions. Saved playlists and play statistics are keyed by
/// this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Derive the id for a file path
    pub fn from_path(path: &Path) -> Self {
        let digest = Sha256::digest(path.to_string_lossy().as_bytes());
        Self(hex::encode(digest))
    }

    /// View the id as a hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a track entered the library from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Scanned from a local folder
    Folder,
    /// Extracted from a ZIP archive
    Zip,
    /// Fetched by a download provider
    Download,
    /// Restored from a saved playlist
    SavedPlaylist,
}

/// Metadata lifecycle of a library record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationState {
    /// Placeholder record, metadata extraction not finished yet
    Pending,
    /// Metadata extraction succeeded
    Hydrated,
    /// Every extraction source failed, filename-derived fields remain
    Failed,
}

/// Audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// File path on disk
    pub path: PathBuf,

    /// Track title (filename-derived until hydrated)
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Release year
    pub year: Option<u32>,

    /// Track duration, unknown until hydrated
    pub duration: Option<Duration>,

    /// Audio bitrate in kbit/s
    pub bitrate_kbps: Option<u32>,

    /// Cover artwork reference, if one has been resolved
    pub artwork: Option<PathBuf>,

    /// Where this track entered the library from
    pub origin: SourceOrigin,

    /// Metadata lifecycle state
    pub hydration: HydrationState,

    /// When the track was added to the library
    pub added_at: DateTime<Utc>,
}

impl Track {
    /// Create a pending placeholder for a discovered file
    ///
    /// The id is derived from the path and the title from the filename, so
    /// the record is displayable before any metadata has been read.
    pub fn pending(path: impl Into<PathBuf>, origin: SourceOrigin) -> Self {
        let path = path.into();
        let parsed = filename::parse_stem(&path);
        Self {
            id: TrackId::from_path(&path),
            title: parsed.title,
            artist: parsed.artist,
            album: None,
            genre: None,
            year: None,
            duration: None,
            bitrate_kbps: None,
            artwork: None,
            origin,
            hydration: HydrationState::Pending,
            added_at: Utc::now(),
            path,
        }
    }
}

/// Partial metadata extracted from tags or a sidecar document
///
/// All fields are optional; merging a `TrackMetadata` into a [`Track`] only
/// overwrites fields the incoming record actually carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Album artist (used as an artist fallback)
    pub album_artist: Option<String>,

    /// Release year
    pub year: Option<u32>,

    /// Genre
    pub genre: Option<String>,

    /// Track duration
    pub duration: Option<Duration>,

    /// Audio bitrate in kbit/s
    pub bitrate_kbps: Option<u32>,

    /// Cover artwork reference
    pub artwork: Option<PathBuf>,
}

impl TrackMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the record carries any useful information
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.album_artist.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.duration.is_none()
            && self.bitrate_kbps.is_none()
            && self.artwork.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_for_same_path() {
        let a = TrackId::from_path(Path::new("/music/song.mp3"));
        let b = TrackId::from_path(Path::new("/music/song.mp3"));
        assert_eq!(a, b);
    }

    #[test]
    fn id_differs_for_different_paths() {
        let a = TrackId::from_path(Path::new("/music/song.mp3"));
        let b = TrackId::from_path(Path::new("/music/other.mp3"));
        assert_ne!(a, b);
    }

    #[test]
    fn pending_track_derives_title_from_filename() {
        let track = Track::pending("/music/Artist - Song.mp3", SourceOrigin::Folder);
        assert_eq!(track.title, "Song");
        assert_eq!(track.artist.as_deref(), Some("Artist"));
        assert_eq!(track.hydration, HydrationState::Pending);
        assert!(track.duration.is_none());
    }

    #[test]
    fn metadata_is_empty() {
        let empty = TrackMetadata::new();
        assert!(empty.is_empty());

        let mut filled = TrackMetadata::new();
        filled.title = Some("Title".to_string());
        assert!(!filled.is_empty());
    }
}
