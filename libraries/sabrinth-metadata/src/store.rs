/// In-memory metadata store
///
/// Single source of truth for track records during a session. Lookups and
/// merges go through an internal `RwLock`, so readers from the UI thread and
/// the ingestion worker never observe a half-applied update.
use sabrinth_core::{CoreError, HydrationState, TagReader, Track, TrackId, TrackMetadata};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;

/// Thread-safe map of all tracks known to the session
#[derive(Default)]
pub struct MetadataStore {
    tracks: RwLock<HashMap<TrackId, Track>>,
}

impl MetadataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks in the store
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// Whether the store holds no tracks
    pub fn is_empty(&self) -> bool {
        self.read_lock().is_empty()
    }

    /// Fetch a track record by id
    pub fn get(&self, id: &TrackId) -> Option<Track> {
        self.read_lock().get(id).cloned()
    }

    /// Resolve a track id to its file path
    pub fn resolve(&self, id: &TrackId) -> Option<PathBuf> {
        self.read_lock().get(id).map(|t| t.path.clone())
    }

    /// Insert a placeholder record
    ///
    /// If a record with the same id already exists (the same file ingested
    /// twice), the existing record is kept and returned; re-discovery must
    /// not erase metadata that has already been hydrated.
    pub fn insert_pending(&self, track: Track) -> Track {
        let mut tracks = self.write_lock();
        tracks.entry(track.id.clone()).or_insert(track).clone()
    }

    /// Merge partial metadata into an existing record
    ///
    /// Only fields the incoming record carries overwrite; absent fields
    /// never erase previously hydrated values. On success the record is
    /// marked [`HydrationState::Hydrated`].
    pub fn put_or_merge(
        &self,
        id: &TrackId,
        metadata: &TrackMetadata,
    ) -> sabrinth_core::Result<Track> {
        let mut tracks = self.write_lock();
        let track = tracks
            .get_mut(id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;
        merge_into(track, metadata);
        track.hydration = HydrationState::Hydrated;
        Ok(track.clone())
    }

    /// Mark a record as failed hydration
    ///
    /// Filename-derived fields stay in place so the track remains
    /// displayable and playable.
    pub fn mark_failed(&self, id: &TrackId) -> sabrinth_core::Result<Track> {
        let mut tracks = self.write_lock();
        let track = tracks
            .get_mut(id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;
        track.hydration = HydrationState::Failed;
        debug!(track = %id, "hydration failed, keeping filename metadata");
        Ok(track.clone())
    }

    /// Force a fresh tag read for a track
    ///
    /// Fields produced by the re-read overwrite cached values; fields the
    /// re-read does not produce are left alone.
    pub fn refresh(&self, id: &TrackId, reader: &dyn TagReader) -> sabrinth_core::Result<Track> {
        let path = self
            .resolve(id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;
        // Tag parsing happens outside the lock
        let metadata = reader.read_tags(&path)?;
        self.put_or_merge(id, &metadata)
    }

    /// Snapshot of all records, in no particular order
    pub fn all(&self) -> Vec<Track> {
        self.read_lock().values().cloned().collect()
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TrackId, Track>> {
        match self.tracks.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<TrackId, Track>> {
        match self.tracks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Apply the merge-only update rule
fn merge_into(track: &mut Track, metadata: &TrackMetadata) {
    if let Some(title) = &metadata.title {
        track.title = title.clone();
    }
    if metadata.artist.is_some() {
        track.artist = metadata.artist.clone();
    } else if track.artist.is_none() {
        track.artist = metadata.album_artist.clone();
    }
    if metadata.album.is_some() {
        track.album = metadata.album.clone();
    }
    if metadata.genre.is_some() {
        track.genre = metadata.genre.clone();
    }
    if metadata.year.is_some() {
        track.year = metadata.year;
    }
    if metadata.duration.is_some() {
        track.duration = metadata.duration;
    }
    if metadata.bitrate_kbps.is_some() {
        track.bitrate_kbps = metadata.bitrate_kbps;
    }
    if metadata.artwork.is_some() {
        track.artwork = metadata.artwork.clone();
    }
}
