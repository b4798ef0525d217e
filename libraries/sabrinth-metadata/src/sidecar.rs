/// Sidecar metadata documents
///
/// Downloaders such as yt-dlp write an `.info.json` next to each audio file.
/// These documents are the second metadata source in the hydration chain,
/// consulted when embedded tags are missing or unreadable.
use crate::error::MetadataError;
use sabrinth_core::types::filename::{clean_text, parse_year};
use sabrinth_core::{SidecarReader, TrackMetadata};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Reader for yt-dlp style `.info.json` sidecar documents
pub struct InfoJsonSidecarReader;

impl InfoJsonSidecarReader {
    /// Create a new sidecar reader
    pub fn new() -> Self {
        Self
    }

    /// Conventional sidecar locations for an audio file, in probe order
    ///
    /// yt-dlp writes `<name>.<ext>.info.json`; older layouts replace the
    /// extension instead.
    fn candidates(audio_path: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(2);
        let mut with_full_name = audio_path.as_os_str().to_owned();
        with_full_name.push(".info.json");
        candidates.push(PathBuf::from(with_full_name));
        candidates.push(audio_path.with_extension("info.json"));
        candidates
    }

    /// Map a parsed document onto a metadata record
    fn extract(doc: &serde_json::Value) -> TrackMetadata {
        let text = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| doc.get(*k))
                .filter_map(serde_json::Value::as_str)
                .find_map(clean_text)
        };

        let mut metadata = TrackMetadata::new();
        metadata.title = text(&["track", "title"]);
        metadata.artist = text(&["artist", "album_artist", "uploader", "channel", "creator"]);
        metadata.album = text(&["album", "playlist_title"]);
        metadata.year = text(&["release_date", "upload_date"])
            .as_deref()
            .and_then(parse_year);
        metadata.genre = doc
            .get("categories")
            .and_then(serde_json::Value::as_array)
            .and_then(|cats| cats.first())
            .and_then(serde_json::Value::as_str)
            .and_then(clean_text)
            .or_else(|| text(&["genre"]));
        metadata.duration = doc
            .get("duration")
            .and_then(serde_json::Value::as_f64)
            .filter(|secs| *secs > 0.0)
            .map(Duration::from_secs_f64);
        metadata
    }
}

impl Default for InfoJsonSidecarReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SidecarReader for InfoJsonSidecarReader {
    fn read_sidecar(&self, audio_path: &Path) -> sabrinth_core::Result<Option<TrackMetadata>> {
        for candidate in Self::candidates(audio_path) {
            if candidate.is_file() {
                debug!(sidecar = %candidate.display(), "found sidecar document");
                return self.read_document(&candidate).map(Some);
            }
        }
        Ok(None)
    }

    fn read_document(&self, sidecar_path: &Path) -> sabrinth_core::Result<TrackMetadata> {
        let raw = std::fs::read_to_string(sidecar_path).map_err(MetadataError::Io)?;
        let doc: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            MetadataError::SidecarError(format!("{}: {}", sidecar_path.display(), e))
        })?;
        Ok(Self::extract(&doc))
    }
}
