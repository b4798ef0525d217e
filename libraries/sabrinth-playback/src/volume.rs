//! Volume control with logarithmic scaling and loudness adaptation
//!
//! Volume is a 0-100 level mapped to -60 dB..0 dB, which tracks human
//! loudness perception much better than a linear gain slider.

use std::time::{Duration, Instant};

/// Volume controller with logarithmic scaling
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,

    /// Cached linear gain multiplier
    linear_gain: f32,
}

impl Volume {
    /// Create a volume controller at the given level (0-100)
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            linear_gain: Self::calculate_linear_gain(level),
        }
    }

    /// Set the level (clamped to 0-100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        self.linear_gain = Self::calculate_linear_gain(self.level);
    }

    /// Current level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Linear gain multiplier for the audio backend
    pub fn gain(&self) -> f32 {
        self.linear_gain
    }

    /// Convert a level percentage to linear gain
    ///
    /// 0% → silence, 50% → -30 dB, 100% → 0 dB (unity)
    fn calculate_linear_gain(level: u8) -> f32 {
        if level == 0 {
            return 0.0;
        }
        // Map 0-100% onto -60 dB..0 dB, then dB to linear
        let db = (level as f32 - 100.0) * 0.6;
        10.0_f32.powf(db / 20.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(58)
    }
}

/// Configuration for automatic loudness adaptation
#[derive(Debug, Clone)]
pub struct AutoVolumeConfig {
    /// Whether adaptation is active
    pub enabled: bool,
    /// Target output signal level in [0.0, 1.0]
    pub reference_level: f32,
    /// Level change per adjustment, in volume percent
    pub step: u8,
    /// Minimum time between adjustments
    pub interval: Duration,
    /// Tolerance band around the reference where no adjustment happens
    pub deadband: f32,
}

impl Default for AutoVolumeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reference_level: 0.25,
            step: 2,
            interval: Duration::from_secs(1),
            deadband: 0.05,
        }
    }
}

/// Automatic loudness adaptation
///
/// Periodically compares the backend's recent output level against a
/// reference and nudges the volume one step toward it. Quiet tracks drift
/// louder, loud tracks drift quieter, and an explicit volume change
/// re-anchors the sampling clock so the user always wins.
#[derive(Debug, Clone)]
pub struct AutoVolume {
    config: AutoVolumeConfig,
    next_sample: Option<Instant>,
}

impl AutoVolume {
    /// Create an adapter from its configuration
    pub fn new(config: AutoVolumeConfig) -> Self {
        Self {
            config,
            next_sample: None,
        }
    }

    /// Whether adaptation is active
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enable or disable adaptation
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.next_sample = None;
    }

    /// Push the next sample one interval past `now`
    ///
    /// Called after explicit volume changes and track changes.
    pub fn rearm(&mut self, now: Instant) {
        self.next_sample = Some(now + self.config.interval);
    }

    /// Sample the output level and propose a volume adjustment
    ///
    /// Returns the new level when one step toward the reference is due.
    /// A zero output level (silence, pause) never triggers an adjustment.
    pub fn tick(&mut self, now: Instant, output_level: f32, volume: &Volume) -> Option<u8> {
        if !self.config.enabled {
            return None;
        }
        match self.next_sample {
            None => {
                self.next_sample = Some(now + self.config.interval);
                return None;
            }
            Some(at) if now < at => return None,
            Some(_) => {}
        }
        self.next_sample = Some(now + self.config.interval);

        if output_level <= 0.0 {
            return None;
        }

        let level = volume.level();
        let proposed = if output_level < self.config.reference_level - self.config.deadband {
            level.saturating_add(self.config.step).min(100)
        } else if output_level > self.config.reference_level + self.config.deadband {
            level.saturating_sub(self.config.step)
        } else {
            level
        };

        (proposed != level).then_some(proposed)
    }
}
