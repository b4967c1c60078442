//! Cooperative driver loop
//!
//! Advances a `BounceState` once per time step and publishes each result.
//! The loop only suspends at the top of an iteration, so cancellation is
//! observed between ticks and never inside `step`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{BounceError, Result};
use crate::sim::BounceState;
use crate::sim::step::{check_time_step, step};

/// Cloneable cancellation flag shared between a driver and its owner
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Stop scheduling further ticks. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called (immediately if it already was)
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Wall-clock period between ticks for a time step
///
/// Rejects steps the integrator refuses and steps too long to sleep for.
pub fn tick_period(time_step: f32) -> Result<Duration> {
    check_time_step(time_step)?;
    Duration::try_from_secs_f32(time_step).map_err(|err| {
        BounceError::InvalidArgument(format!("time step {time_step} s is not a valid period: {err}"))
    })
}

/// Run the driver until `is_running` returns false
///
/// Each iteration sleeps for one time step, applies `step`, then hands the
/// new state to `on_tick`. Returns the final state.
pub async fn run<P, F>(initial: BounceState, is_running: P, on_tick: F) -> Result<BounceState>
where
    P: FnMut() -> bool,
    F: FnMut(&BounceState),
{
    run_cancellable(initial, is_running, on_tick, &CancelToken::new()).await
}

/// Run the driver until `is_running` returns false or `token` is cancelled
pub async fn run_cancellable<P, F>(
    initial: BounceState,
    mut is_running: P,
    mut on_tick: F,
    token: &CancelToken,
) -> Result<BounceState>
where
    P: FnMut() -> bool,
    F: FnMut(&BounceState),
{
    let period = tick_period(initial.time_step)?;
    let mut state = initial;

    loop {
        if token.is_cancelled() || !is_running() {
            break;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(period) => {}
        }

        // Stop/cancel requested while we were suspended: no partial tick
        if token.is_cancelled() || !is_running() {
            break;
        }

        let next = step(&state, state.time_step)?;
        if next.bounces > state.bounces {
            log::debug!(
                "Bounce {} at tick {} (rebound speed {:.2} m/s)",
                next.bounces,
                next.ticks,
                next.speed()
            );
        }
        state = next;
        on_tick(&state);
    }

    Ok(state)
}

/// Handle to a spawned driver task
#[derive(Debug)]
pub struct DriverHandle {
    token: CancelToken,
    task: JoinHandle<Result<BounceState>>,
}

impl DriverHandle {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Request the driver to stop before its next tick
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the driver to exit and take back its final state
    pub async fn join(self) -> Result<BounceState> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(BounceError::Driver(err.to_string())),
        }
    }
}

/// Spawn a driver loop on the tokio runtime
///
/// `loop_fn` receives the token that `DriverHandle::cancel` trips.
pub fn spawn<L, Fut>(loop_fn: L) -> DriverHandle
where
    L: FnOnce(CancelToken) -> Fut,
    Fut: Future<Output = Result<BounceState>> + Send + 'static,
{
    let token = CancelToken::new();
    let task = tokio::spawn(loop_fn(token.clone()));
    DriverHandle { token, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_predicate_false() {
        let mut checks = 0;
        let mut heights = Vec::new();
        // Predicate is checked twice per tick (before and after the sleep)
        let final_state = run(
            BounceState::default(),
            || {
                checks += 1;
                checks <= 10
            },
            |state| heights.push(state.height),
        )
        .await
        .unwrap();

        assert_eq!(heights.len(), 5);
        assert_eq!(final_state.ticks, 5);
        assert_eq!(heights.last().copied(), Some(final_state.height));
        assert!(heights.windows(2).all(|w| w[1] < w[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_running_never_ticks() {
        let mut ticks = 0;
        let state = run(BounceState::default(), || false, |_| ticks += 1)
            .await
            .unwrap();
        assert_eq!(ticks, 0);
        assert_eq!(state, BounceState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_ticks() {
        let token = CancelToken::new();
        let mut ticks = 0u64;
        let state = run_cancellable(
            BounceState::default(),
            || true,
            |state| {
                ticks += 1;
                if state.ticks == 3 {
                    token.cancel();
                }
            },
            &token,
        )
        .await
        .unwrap();

        assert_eq!(ticks, 3);
        assert_eq!(state.ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_bad_time_step() {
        let state = BounceState::new(20.0, -9.81, 0.7, -0.016);
        let mut ticks = 0;
        let result = run(state, || true, |_| ticks += 1).await;
        assert!(matches!(result, Err(BounceError::InvalidArgument(_))));
        assert_eq!(ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_time_step_too_long_to_sleep() {
        let state = BounceState::new(20.0, -9.81, 0.7, 1e20);
        let result = run(state, || false, |_| {}).await;
        assert!(matches!(result, Err(BounceError::InvalidArgument(_))));
    }

    #[test]
    fn test_tick_period() {
        let period = tick_period(0.016).unwrap();
        assert!((period.as_secs_f32() - 0.016).abs() < 1e-6);
        assert!(matches!(tick_period(0.0), Err(BounceError::InvalidArgument(_))));
        assert!(matches!(tick_period(1e20), Err(BounceError::InvalidArgument(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_cancel_join() {
        let handle = spawn(|token| async move {
            run_cancellable(BounceState::default(), || true, |_| {}, &token).await
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!handle.is_finished());

        handle.cancel();
        assert!(handle.token().is_cancelled());
        let state = handle.join().await.unwrap();
        assert!(state.ticks > 0);
        assert!(state.height < 20.0);
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let waiter = token.clone();
        let wait = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        token.cancel();
        wait.await.unwrap();
        assert!(token.is_cancelled());
        // Already-cancelled tokens resolve immediately
        token.cancelled().await;
    }
}
