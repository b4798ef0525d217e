//! Sabrinth Storage
//!
//! Persistent state for the player: saved playlists, play statistics and
//! user settings, all stored as JSON documents under the application data
//! directory. Writes go through a temp-file-and-rename step so a crash never
//! leaves a half-written document behind.

mod error;
mod json_file;
mod paths;
mod playlists;
mod settings;
mod stats;

pub use error::{Result, StorageError};
pub use paths::AppDirs;
pub use playlists::PlaylistStore;
pub use settings::Settings;
pub use stats::StatsStore;
