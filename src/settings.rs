//! Run settings
//!
//! Persisted as a JSON file next to the host project; missing or unreadable
//! files fall back to the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::driver::tick_period;
use crate::error::{BounceError, Result};

/// Physics configuration for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Height the sphere starts from (meters)
    pub start_height: f32,
    /// Gravity (m/s²), negative is down
    pub gravity: f32,
    /// Coefficient of restitution (0 = dead stop, 1 = perfectly elastic)
    pub elasticity: f32,
    /// Simulation timestep (seconds)
    pub time_step: f32,
    /// Seed for recolor RNG (None = seeded from entropy)
    pub color_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_height: DEFAULT_START_HEIGHT,
            gravity: DEFAULT_GRAVITY,
            elasticity: DEFAULT_ELASTICITY,
            time_step: DEFAULT_TIME_STEP,
            color_seed: None,
        }
    }
}

impl Settings {
    /// Check that a run can be started with these settings
    ///
    /// Elasticity above 1 and upward gravity are allowed (the trajectory
    /// diverges) but logged.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("start_height", self.start_height),
            ("gravity", self.gravity),
            ("elasticity", self.elasticity),
            ("time_step", self.time_step),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(BounceError::InvalidArgument(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        tick_period(self.time_step)?;
        if self.start_height < 0.0 {
            return Err(BounceError::InvalidArgument(format!(
                "start_height must not be below the ground, got {}",
                self.start_height
            )));
        }

        if !(0.0..=1.0).contains(&self.elasticity) {
            log::warn!(
                "Elasticity {} is outside [0, 1]; bounces will not lose energy as expected",
                self.elasticity
            );
        }
        if self.gravity >= 0.0 {
            log::warn!("Gravity {} does not point down; the sphere will not fall", self.gravity);
        }
        Ok(())
    }

    /// Read settings from a JSON file
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&json)?;
        Ok(settings)
    }

    /// Read settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::info!("Using default settings ({}: {err})", path.display());
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
