//! Play statistics tracking
//!
//! Thin wrapper over the persistent store. Attribution policy (one
//! `started` per attempt, `played` xor `skipped` on departure) lives in the
//! controller; a failed disk write is logged and never interrupts playback.

use sabrinth_core::{StatKind, TrackId, TrackStats};
use sabrinth_storage::StatsStore;
use tracing::warn;

/// Records play events against the persistent statistics store
pub struct StatsTracker {
    store: StatsStore,
}

impl StatsTracker {
    /// Create a tracker over a store
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }

    /// A play attempt began
    pub fn record_started(&mut self, id: &TrackId) {
        self.record(id, StatKind::Started);
    }

    /// The attempt counted as a full listen
    pub fn record_played(&mut self, id: &TrackId) {
        self.record(id, StatKind::Played);
    }

    /// The attempt was abandoned early
    pub fn record_skipped(&mut self, id: &TrackId) {
        self.record(id, StatKind::Skipped);
    }

    /// Counters for a track
    pub fn get(&self, id: &TrackId) -> TrackStats {
        self.store.get(id)
    }

    /// Reset one track's counters
    pub fn reset(&mut self, id: &TrackId) {
        if let Err(e) = self.store.reset(id) {
            warn!(track = %id, error = %e, "failed to reset play stats");
        }
    }

    fn record(&mut self, id: &TrackId, kind: StatKind) {
        if let Err(e) = self.store.record(id, kind) {
            warn!(track = %id, error = %e, "failed to persist play stats");
        }
    }
}
