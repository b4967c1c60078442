//! Bouncing Sphere - a scripted bouncing-ball animation for host-owned scenes
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state, integrator)
//! - `driver`: Cancellable cooperative loop that advances the simulation
//! - `scene`: Scene-graph collaborator (sphere, ground plane, colors)
//! - `ui`: Panel commands and the height label
//! - `controller`: Command interface the UI panel drives
//! - `settings`: Run configuration

pub mod controller;
pub mod driver;
pub mod error;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod ui;

pub use controller::BounceController;
pub use error::{BounceError, Result};
pub use settings::Settings;
pub use sim::{BounceState, simulate, step};

/// Simulation and scene constants
pub mod consts {
    /// Starting height of the sphere (meters above the ground)
    pub const DEFAULT_START_HEIGHT: f32 = 20.0;
    /// Gravity (m/s²), negative is down
    pub const DEFAULT_GRAVITY: f32 = -9.81;
    /// Coefficient of restitution
    pub const DEFAULT_ELASTICITY: f32 = 0.7;
    /// Fixed simulation timestep (~60 Hz)
    pub const DEFAULT_TIME_STEP: f32 = 0.016;

    /// Sphere radius (meters)
    pub const SPHERE_RADIUS: f32 = 1.0;
    pub const SPHERE_PATH: &str = "/World/bouncing_sphere";
    pub const GROUND_PATH: &str = "/World/ground_plane";

    /// Ground plane half extent along X and Z
    pub const GROUND_HALF_EXTENT: f32 = 10.0;
    /// Ground plane sits slightly below y = 0 so the sphere appears to touch it
    pub const GROUND_ELEVATION: f32 = -0.7;
    pub const GROUND_MATERIAL_REFERENCE: &str = "/World/Looks/Asphalt";

    /// Control panel
    pub const PANEL_TITLE: &str = "Bouncing Sphere Controller";
    pub const PANEL_WIDTH: u32 = 300;
    pub const PANEL_HEIGHT: u32 = 300;
}
