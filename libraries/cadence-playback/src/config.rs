//! Engine configuration

use crate::error::{PlaybackError, Result};
use cadence_core::Segue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback engine settings
///
/// Every field has a default, so a configuration source only needs to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Scheduler tick period in milliseconds (default: 10)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Progress event period in milliseconds (default: 500)
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Overlap neighbouring tracks (default: true)
    #[serde(default = "default_cross_fade")]
    pub cross_fade: bool,

    /// Intro inherited by channels without their own (default: linear 1s)
    #[serde(default = "default_segue")]
    pub default_intro: Segue,

    /// Outro inherited by channels without their own (default: linear 1s)
    #[serde(default = "default_segue")]
    pub default_outro: Segue,

    /// Fade applied when pausing (default: linear 0.2s)
    #[serde(default)]
    pub pause_fade: Segue,

    /// Fade applied when resuming (default: linear 0.2s)
    #[serde(default)]
    pub resume_fade: Segue,

    /// Mute factor used for ducking (default: 0.5)
    #[serde(default = "default_duck_factor")]
    pub duck_factor: f64,

    /// Fade applied when ducking (default: linear 1s)
    #[serde(default = "default_duck_segue")]
    pub duck_segue: Segue,
}

impl EngineConfig {
    /// Scheduler tick period
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Progress event period
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.duck_factor) {
            return Err(PlaybackError::Config(format!(
                "duck_factor must be within 0.0..=1.0, got {}",
                self.duck_factor
            )));
        }
        Ok(())
    }
}

// Default values
fn default_tick_interval_ms() -> u64 {
    10
}

fn default_progress_interval_ms() -> u64 {
    500
}

fn default_cross_fade() -> bool {
    true
}

fn default_segue() -> Segue {
    Segue::Linear(Duration::from_secs(1))
}

fn default_duck_factor() -> f64 {
    0.5
}

fn default_duck_segue() -> Segue {
    Segue::DEFAULT_DUCK
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            cross_fade: default_cross_fade(),
            default_intro: default_segue(),
            default_outro: default_segue(),
            pause_fade: Segue::DEFAULT,
            resume_fade: Segue::DEFAULT,
            duck_factor: default_duck_factor(),
            duck_segue: default_duck_segue(),
        }
    }
}
