//! Player events
//!
//! Every externally visible change pushes one of these into the
//! controller's event buffer; the host drains the buffer on its own thread.

use sabrinth_core::{PlaybackState, TrackId};
use serde::{Deserialize, Serialize};

/// Notifications emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The playback state machine moved
    StateChanged {
        /// New state
        state: PlaybackState,
    },
    /// A different track became current
    TrackChanged {
        /// Now-current track
        track_id: TrackId,
        /// Previously current track, if any
        previous: Option<TrackId>,
    },
    /// The volume level changed (user action or loudness adaptation)
    VolumeChanged {
        /// New level (0-100)
        level: u8,
    },
    /// The queue contents or order changed
    QueueChanged {
        /// New queue length
        length: usize,
    },
    /// Playback of a track failed
    PlaybackFailed {
        /// Track the failure belongs to, when known
        track_id: Option<TrackId>,
        /// Human-readable failure description
        message: String,
    },
}
