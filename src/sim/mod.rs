//! Deterministic simulation module
//!
//! The physics core lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No scheduling, scene or UI dependencies

pub mod state;
pub mod step;

pub use state::BounceState;
pub use step::{simulate, step};
