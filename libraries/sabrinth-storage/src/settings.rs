/// User settings
use crate::error::Result;
use crate::json_file;
use sabrinth_core::WrapMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persistent user preferences, stored in `settings.json`
///
/// Every field has a default, so a partial or missing document loads
/// cleanly and new fields appear with their defaults on the next save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shuffle the queue after a folder or playlist finishes loading
    pub shuffle_on_load: bool,
    /// Start playback automatically after a load
    pub autoplay_on_load: bool,
    /// Scan folders recursively
    pub recursive_scan: bool,
    /// Volume level applied at startup (0-100)
    pub default_volume: u8,
    /// Enable automatic loudness adaptation
    pub auto_adjust_enabled: bool,
    /// Fraction of a track that must play before departure counts as played
    pub played_threshold: f32,
    /// Queue navigation behavior at the ends
    pub wrap: WrapMode,
    /// Consecutive playback failures tolerated before giving up
    pub max_auto_skip: u32,
    /// Upper bound on a single track's metadata extraction, in seconds
    pub hydration_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shuffle_on_load: true,
            autoplay_on_load: true,
            recursive_scan: true,
            default_volume: 58,
            auto_adjust_enabled: false,
            played_threshold: 0.5,
            wrap: WrapMode::Loop,
            max_auto_skip: 3,
            hydration_timeout_secs: 7,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults for missing fields or a
    /// missing document
    pub fn load(path: &Path) -> Self {
        json_file::load_or_default(path)
    }

    /// Persist the settings
    pub fn save(&self, path: &Path) -> Result<()> {
        json_file::save(path, self)
    }
}
