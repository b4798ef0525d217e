/// Saved playlist persistence
///
/// Playlists are name-keyed snapshots of queue contents, stored as track ids
/// in `saved_playlists.json`. Saving under an existing name overwrites it;
/// the queue itself decides what the ids mean when a playlist is loaded
/// again.
use crate::error::{Result, StorageError};
use crate::json_file;
use sabrinth_core::TrackId;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Store for named playlists
pub struct PlaylistStore {
    path: PathBuf,
    playlists: BTreeMap<String, Vec<TrackId>>,
}

impl PlaylistStore {
    /// Open the store backed by the given document
    ///
    /// A missing or corrupt document starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let playlists = json_file::load_or_default(&path);
        Self { path, playlists }
    }

    /// Normalize a user-entered playlist name
    ///
    /// Leading/trailing whitespace is trimmed and internal runs collapse to
    /// a single space, so "My  Mix " and "My Mix" are the same playlist.
    pub fn normalize_name(name: &str) -> String {
        name.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Save a playlist, overwriting any existing one with the same name
    pub fn save(&mut self, name: &str, entries: Vec<TrackId>) -> Result<String> {
        let name = Self::normalize_name(name);
        if name.is_empty() {
            return Err(StorageError::InvalidInput(
                "playlist name must not be empty".to_string(),
            ));
        }
        info!(playlist = %name, tracks = entries.len(), "saving playlist");
        self.playlists.insert(name.clone(), entries);
        json_file::save(&self.path, &self.playlists)?;
        Ok(name)
    }

    /// Load the entries of a named playlist
    pub fn load(&self, name: &str) -> Result<Vec<TrackId>> {
        let name = Self::normalize_name(name);
        self.playlists
            .get(&name)
            .cloned()
            .ok_or(StorageError::NotFound(name))
    }

    /// Delete a playlist
    ///
    /// Returns `true` if a playlist was removed; deleting an absent name is
    /// not an error.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let name = Self::normalize_name(name);
        let removed = self.playlists.remove(&name).is_some();
        if removed {
            json_file::save(&self.path, &self.playlists)?;
        }
        Ok(removed)
    }

    /// All playlist names, sorted
    pub fn names(&self) -> Vec<String> {
        self.playlists.keys().cloned().collect()
    }

    /// Whether a playlist with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.playlists.contains_key(&Self::normalize_name(name))
    }
}
