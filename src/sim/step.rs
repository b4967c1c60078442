//! Fixed timestep integrator
//!
//! Semi-implicit Euler with a reflecting ground plane at height 0.

use super::state::BounceState;
use crate::error::{BounceError, Result};

/// Reject time steps the integrator cannot advance by
pub(crate) fn check_time_step(time_step: f32) -> Result<()> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(BounceError::InvalidArgument(format!(
            "time step must be positive and finite, got {time_step}"
        )))
    }
}

/// Advance the state by one timestep
///
/// Velocity is updated first, then height from the new velocity. If the
/// sphere ends the step at or below the ground it is reflected and both
/// height and velocity are scaled by the elasticity. Contact at exactly
/// zero height also reflects.
pub fn step(state: &BounceState, time_step: f32) -> Result<BounceState> {
    check_time_step(time_step)?;

    let mut next = state.clone();
    next.velocity += next.gravity * time_step;
    next.height += next.velocity * time_step;

    if next.height <= 0.0 {
        next.height = -next.height * next.elasticity;
        next.velocity = -next.velocity * next.elasticity;
        next.bounces += 1;
    }

    next.ticks += 1;
    Ok(next)
}

/// Apply `steps` timesteps using the state's own time step
///
/// Returns every intermediate state, oldest first (the initial state is not
/// included).
pub fn simulate(initial: &BounceState, steps: usize) -> Result<Vec<BounceState>> {
    let mut trajectory = Vec::with_capacity(steps);
    let mut current = initial.clone();
    for _ in 0..steps {
        current = step(&current, current.time_step)?;
        trajectory.push(current.clone());
    }
    Ok(trajectory)
}
