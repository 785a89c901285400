//! Playback settings
//!
//! Persisted as a small JSON document next to the table configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_INTERVAL, MAX_DURATION, MAX_SUBSTEPS};
use crate::error::{SimError, SimResult};

/// Frame sampler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Time between consecutive playback snapshots (seconds)
    pub frame_interval: f64,
    /// Length of a shot's animation (seconds); the sampler stops here even if balls still roll
    pub max_duration: f64,
    /// Resolved events allowed inside one frame; past it the table is brought to rest at the boundary
    pub max_substeps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_interval: FRAME_INTERVAL,
            max_duration: MAX_DURATION,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl Settings {
    /// Number of snapshots a shot produces
    pub fn frame_count(&self) -> usize {
        (self.max_duration / self.frame_interval).round() as usize
    }

    /// Reject settings the sampler cannot run with
    pub fn validate(&self) -> SimResult<()> {
        if !(self.frame_interval.is_finite() && self.frame_interval > 0.0) {
            return Err(SimError::InvalidSettings {
                field: "frame_interval",
                value: self.frame_interval,
                requirement: "finite and > 0",
            });
        }
        if !(self.max_duration.is_finite() && self.max_duration >= self.frame_interval) {
            return Err(SimError::InvalidSettings {
                field: "max_duration",
                value: self.max_duration,
                requirement: "finite and >= frame_interval",
            });
        }
        if self.max_substeps == 0 {
            return Err(SimError::InvalidSettings {
                field: "max_substeps",
                value: 0.0,
                requirement: ">= 1",
            });
        }
        Ok(())
    }

    /// Parse and validate settings from JSON (missing keys keep their defaults)
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
