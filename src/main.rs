//! Bouncing Sphere entry point
//!
//! Headless runner: drives the controller against an in-memory scene and
//! logs the label, or prints a raw trajectory with `--headless-steps`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;

use bouncing_sphere::scene::InMemoryScene;
use bouncing_sphere::ui::{LabelSink, UiAction, panel_caption};
use bouncing_sphere::{BounceController, BounceState, Settings, simulate};

#[derive(Parser, Debug)]
#[command(name = "bouncing-sphere", about = "Bouncing sphere simulation driver")]
struct Cli {
    /// Settings JSON file (defaults are used if missing)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Wall-clock seconds to let the driver run
    #[arg(long, default_value = "3", value_parser = parse_seconds)]
    seconds: Duration,

    /// Print this many integrator steps and exit without the driver
    #[arg(long)]
    headless_steps: Option<usize>,

    /// Seed for the recolor RNG
    #[arg(long)]
    seed: Option<u64>,
}

/// Accept a finite, non-negative number of seconds
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f32 = s
        .trim()
        .parse()
        .map_err(|err| format!("`{s}` is not a number: {err}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("`{s}` must be a finite, non-negative number of seconds"));
    }
    Duration::try_from_secs_f32(secs).map_err(|err| format!("`{s}`: {err}"))
}

/// Label that forwards every update to the log
struct LogLabel;

impl LabelSink for LogLabel {
    fn set_text(&mut self, text: &str) {
        log::info!("{text}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    if cli.seed.is_some() {
        settings.color_seed = cli.seed;
    }

    if let Some(steps) = cli.headless_steps {
        settings.validate()?;
        let trajectory = simulate(&BounceState::from_settings(&settings), steps)?;
        for state in &trajectory {
            println!(
                "{:>6} {:>8.3} {:>9.4} {:>9.4}",
                state.ticks,
                state.ticks as f32 * state.time_step,
                state.height,
                state.velocity
            );
        }
        return Ok(());
    }

    let scene = Arc::new(Mutex::new(InMemoryScene::new()));
    let label = Arc::new(Mutex::new(LogLabel));
    let mut controller = BounceController::new(settings, Arc::clone(&scene), label)?;
    log::info!("{}", panel_caption());

    controller.dispatch(UiAction::Start).await?;
    controller.dispatch(UiAction::RecolorSphere).await?;
    controller.dispatch(UiAction::RecolorGround).await?;
    tokio::time::sleep(cli.seconds).await;
    controller.dispatch(UiAction::Stop).await?;

    let state = controller.state();
    log::info!(
        "Stopped after {} ticks and {} bounces at {:.2} m",
        state.ticks,
        state.bounces,
        state.height
    );
    if let Ok(scene) = scene.lock() {
        log::info!("Sphere moved {} times", scene.translation_updates);
    }

    controller.dispatch(UiAction::Reset).await?;
    controller.shutdown().await;
    Ok(())
}
