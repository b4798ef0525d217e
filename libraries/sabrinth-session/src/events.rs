//! Session-level events
//!
//! One flat stream the interactive context drains on its own thread; each
//! batch interleaves ingestion progress with playback notifications.

use sabrinth_ingest::IngestEvent;
use sabrinth_playback::PlayerEvent;

/// Identifier of one ingestion run within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub(crate) u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Everything a session surfaces to its host
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Progress from an ingestion run
    Ingest {
        /// Which run the event belongs to
        run: RunId,
        /// The ingestion event
        event: IngestEvent,
    },
    /// Notification from the playback controller
    Player(PlayerEvent),
}
