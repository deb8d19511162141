//! # Engine Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! [game_loop]
//! target_fps = 60
//! max_delta_secs = 0.1
//! enable_timing_logs = true
//! sweep_inactive = true
//!
//! [[schedule.systems]]
//! name = "Movement"
//! provides = ["movement"]
//! ```
//!
//! Every section and field has a default, so an empty file is valid.

use std::path::Path;
use std::time::Duration;

use cadence_schedule::ScheduleManifest;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Frame pacing and per-frame housekeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLoopConfig {
    /// Target frames per second; sets the frame budget.
    pub target_fps: u32,
    /// Upper bound on the delta time handed to systems, in seconds.
    pub max_delta_secs: f32,
    /// Log frames that exceed twice the frame budget.
    pub enable_timing_logs: bool,
    /// Drop inactive entities at the end of every frame.
    pub sweep_inactive: bool,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_delta_secs: 0.1,
            enable_timing_logs: false,
            sweep_inactive: true,
        }
    }
}

impl GameLoopConfig {
    /// Frame budget derived from `target_fps`.
    #[must_use]
    pub fn target_frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero fps target or a non-positive delta clamp.
    pub fn validate(&self) -> EngineResult<()> {
        if self.target_fps == 0 {
            return Err(EngineError::InvalidConfig(
                "game_loop.target_fps must be greater than zero".into(),
            ));
        }
        if !(self.max_delta_secs.is_finite() && self.max_delta_secs > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "game_loop.max_delta_secs must be a positive number, got {}",
                self.max_delta_secs
            )));
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Game loop section.
    pub game_loop: GameLoopConfig,
    /// Optional embedded schedule manifest.
    pub schedule: Option<ScheduleManifest>,
}

impl EngineConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text does not parse or fails validation.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.game_loop.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigIo` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "engine config loaded");
        Ok(config)
    }
}
