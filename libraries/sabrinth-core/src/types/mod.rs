/// Domain types for the Sabrinth player
pub mod filename;
mod playback_state;
mod stats;
mod track;

pub use playback_state::{PlaybackState, SeekOrigin, WrapMode};
pub use stats::{StatKind, TrackStats};
pub use track::{HydrationState, SourceOrigin, Track, TrackId, TrackMetadata};
