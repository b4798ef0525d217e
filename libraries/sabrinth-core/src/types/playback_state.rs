/// Playback state machine vocabulary
use serde::{Deserialize, Serialize};

/// Which steady state a seek was entered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekOrigin {
    /// Seek started while playing; playback resumes on completion
    Playing,
    /// Seek started while paused; the player stays paused on completion
    Paused,
}

/// States of the playback controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No track loaded
    Idle,
    /// A track is being opened on the backend
    Loading,
    /// Audio is playing
    Playing,
    /// Playback is paused, position retained
    Paused,
    /// A seek is in flight; resolves back to the origin state
    Seeking {
        /// State to return to once the seek completes
        from: SeekOrigin,
    },
    /// The queue finished and nothing else will play automatically
    Ended,
    /// Playback failed and automatic recovery gave up
    Error,
}

impl PlaybackState {
    /// Whether a track is currently loaded (playing, paused or seeking)
    pub fn has_track(&self) -> bool {
        matches!(
            self,
            Self::Playing | Self::Paused | Self::Seeking { .. } | Self::Loading
        )
    }
}

/// Behavior when navigation runs off either end of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Wrap around modulo the queue length
    Loop,
    /// `next` past the last track ends playback; `previous` at the first stays
    StopAtEnd,
}

impl Default for WrapMode {
    fn default() -> Self {
        Self::Loop
    }
}
