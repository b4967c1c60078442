//! Bounce state and core simulation types
//!
//! Everything the integrator needs lives in one flat value so it can be
//! handed to the driver, returned on stop, and replaced on reset.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// Height/velocity of the sphere plus the per-run physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BounceState {
    /// Meters above the ground
    pub height: f32,
    /// Vertical velocity (m/s), positive is up
    pub velocity: f32,
    /// Gravity (m/s²), constant per run
    pub gravity: f32,
    /// Coefficient of restitution, constant per run
    pub elasticity: f32,
    /// Fixed simulation quantum (seconds)
    pub time_step: f32,
    /// Steps applied since the run began
    #[serde(default)]
    pub ticks: u64,
    /// Ground reflections applied since the run began
    #[serde(default)]
    pub bounces: u32,
}

impl Default for BounceState {
    fn default() -> Self {
        Self::new(
            DEFAULT_START_HEIGHT,
            DEFAULT_GRAVITY,
            DEFAULT_ELASTICITY,
            DEFAULT_TIME_STEP,
        )
    }
}

impl BounceState {
    /// Create a state at rest (zero velocity) at the given height
    pub fn new(start_height: f32, gravity: f32, elasticity: f32, time_step: f32) -> Self {
        Self {
            height: start_height,
            velocity: 0.0,
            gravity,
            elasticity,
            time_step,
            ticks: 0,
            bounces: 0,
        }
    }

    /// Initial state for a run configured by `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.start_height,
            settings.gravity,
            settings.elasticity,
            settings.time_step,
        )
    }

    /// True once the sphere sits on the ground with no velocity left
    pub fn is_at_rest(&self) -> bool {
        self.height == 0.0 && self.velocity == 0.0
    }

    pub fn speed(&self) -> f32 {
        self.velocity.abs()
    }

    /// Kinetic plus potential energy per unit mass (J/kg)
    pub fn mechanical_energy(&self) -> f32 {
        0.5 * self.velocity * self.velocity - self.gravity * self.height
    }

    /// Sphere translation in scene space (the sphere only moves along Y)
    pub fn translation(&self) -> Vec3 {
        Vec3::new(0.0, self.height, 0.0)
    }
}
