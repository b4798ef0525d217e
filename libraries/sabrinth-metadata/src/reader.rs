/// Tag reader implementation using lofty
use crate::error::MetadataError;
use lofty::{AudioFile, TaggedFileExt};
use sabrinth_core::types::filename::clean_text;
use sabrinth_core::{TagReader, TrackMetadata};
use std::path::Path;
use std::time::Duration;

/// Tag reader using the lofty library
pub struct LoftyTagReader;

impl LoftyTagReader {
    /// Create a new tag reader
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata from a lofty tag
    fn extract_from_tag(tag: &lofty::Tag) -> TrackMetadata {
        let mut metadata = TrackMetadata::new();

        // lofty 0.18 API - iterate through items
        for item in tag.items() {
            match item.key() {
                lofty::ItemKey::TrackTitle => {
                    metadata.title = item.value().text().and_then(clean_text);
                }
                lofty::ItemKey::TrackArtist => {
                    metadata.artist = item.value().text().and_then(clean_text);
                }
                lofty::ItemKey::AlbumTitle => {
                    metadata.album = item.value().text().and_then(clean_text);
                }
                lofty::ItemKey::AlbumArtist => {
                    metadata.album_artist = item.value().text().and_then(clean_text);
                }
                lofty::ItemKey::Genre => {
                    metadata.genre = item.value().text().and_then(clean_text);
                }
                lofty::ItemKey::Year | lofty::ItemKey::RecordingDate => {
                    if metadata.year.is_none() {
                        metadata.year = item
                            .value()
                            .text()
                            .and_then(sabrinth_core::types::filename::parse_year);
                    }
                }
                _ => {}
            }
        }

        metadata
    }
}

impl Default for LoftyTagReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> sabrinth_core::Result<TrackMetadata> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()).into());
        }

        let tagged_file = lofty::read_from_path(path)
            .map_err(|e| sabrinth_core::CoreError::metadata(e.to_string()))?;

        let properties = tagged_file.properties();
        let duration = properties.duration();
        let duration = (duration > Duration::ZERO).then_some(duration);
        let bitrate_kbps = properties.audio_bitrate();

        let mut metadata = if let Some(primary) = tagged_file.primary_tag() {
            Self::extract_from_tag(primary)
        } else if let Some(first) = tagged_file.tags().first() {
            Self::extract_from_tag(first)
        } else {
            TrackMetadata::new()
        };

        metadata.duration = duration;
        metadata.bitrate_kbps = bitrate_kbps;

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_nonexistent_file_returns_error() {
        let reader = LoftyTagReader::new();
        let result = reader.read_tags(Path::new("/nonexistent/file.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn read_garbage_file_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"not an mp3 at all").unwrap();

        let reader = LoftyTagReader::new();
        assert!(reader.read_tags(&path).is_err());
    }
}
