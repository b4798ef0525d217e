//! Sabrinth Playback
//!
//! The playback queue and controller: deterministic seeded shuffle, queue
//! editing that follows the currently playing track by identity, per-track
//! play statistics, and a state machine driving any [`AudioBackend`]
//! implementation.
//!
//! The controller is synchronous and single-threaded by design. Backend
//! completion events are drained via [`PlayerController::poll_backend`] and
//! user-facing notifications accumulate in an event buffer the host drains
//! with [`PlayerController::take_events`].
//!
//! [`AudioBackend`]: sabrinth_core::AudioBackend

mod controller;
mod error;
mod events;
mod queue;
pub mod shuffle;
mod stats;
mod volume;

pub use controller::{AutoVolumeConfig, PlayerConfig, PlayerController};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use queue::TrackQueue;
pub use stats::StatsTracker;
pub use volume::{AutoVolume, Volume};
