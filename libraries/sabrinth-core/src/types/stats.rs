/// Play statistics
use serde::{Deserialize, Serialize};

/// Per-track play counters
///
/// Counters only grow, except through [`TrackStats::reset`]. Exactly one of
/// `played`/`skipped` is recorded per play attempt, on departure from the
/// track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    /// Play attempts (incremented when playback of the track starts)
    pub started: u64,
    /// Attempts that reached the played threshold or the natural end
    pub played: u64,
    /// Attempts abandoned before the played threshold
    pub skipped: u64,
}

impl TrackStats {
    /// Record one event
    pub fn record(&mut self, kind: StatKind) {
        match kind {
            StatKind::Started => self.started += 1,
            StatKind::Played => self.played += 1,
            StatKind::Skipped => self.skipped += 1,
        }
    }

    /// Zero all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The three countable play events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// A play attempt began
    Started,
    /// The attempt counted as a full listen
    Played,
    /// The attempt was abandoned early
    Skipped,
}
