/// Play statistics persistence
use crate::error::Result;
use crate::json_file;
use sabrinth_core::{StatKind, TrackId, TrackStats};
use std::collections::HashMap;
use std::path::PathBuf;

/// Store for per-track play counters, backed by `stats.json`
///
/// Every mutation is flushed to disk immediately; the counters are small and
/// losing a listen count to a crash is worse than the extra write.
pub struct StatsStore {
    path: PathBuf,
    stats: HashMap<TrackId, TrackStats>,
}

impl StatsStore {
    /// Open the store backed by the given document
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stats = json_file::load_or_default(&path);
        Self { path, stats }
    }

    /// Record one event for a track
    pub fn record(&mut self, id: &TrackId, kind: StatKind) -> Result<TrackStats> {
        let entry = self.stats.entry(id.clone()).or_default();
        entry.record(kind);
        let snapshot = *entry;
        json_file::save(&self.path, &self.stats)?;
        Ok(snapshot)
    }

    /// Counters for a track (zeroes when nothing recorded yet)
    pub fn get(&self, id: &TrackId) -> TrackStats {
        self.stats.get(id).copied().unwrap_or_default()
    }

    /// Reset one track's counters
    pub fn reset(&mut self, id: &TrackId) -> Result<()> {
        if self.stats.remove(id).is_some() {
            json_file::save(&self.path, &self.stats)?;
        }
        Ok(())
    }

    /// Snapshot of all counters
    pub fn all(&self) -> &HashMap<TrackId, TrackStats> {
        &self.stats
    }
}
