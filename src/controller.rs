//! Command interface for the control panel
//!
//! Each panel button maps to one method here. The controller owns the run
//! state while idle; while running, the driver task owns it and hands it
//! back when joined on stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::consts::SPHERE_RADIUS;
use crate::driver::{self, DriverHandle};
use crate::error::Result;
use crate::scene::{ColorPicker, GroundPlane, Rgb, SceneGraph, SceneNode};
use crate::settings::Settings;
use crate::sim::BounceState;
use crate::ui::{LabelSink, RESET_TEXT, UiAction, height_text};

/// Collaborator locks are never held across an await, so a poisoned lock
/// only means a host callback panicked mid-call
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Push one tick's result to the scene and the label
fn publish<S: SceneGraph, L: LabelSink>(
    scene: &Mutex<S>,
    label: &Mutex<L>,
    published: &Mutex<BounceState>,
    state: &BounceState,
) {
    if let Err(err) = lock(scene).set_sphere_translation(state.translation()) {
        log::debug!("Sphere not moved: {err}");
    }
    lock(label).set_text(&height_text(state.height));
    *lock(published) = state.clone();
}

/// Drives the bouncing sphere in a host scene
pub struct BounceController<S, L> {
    settings: Settings,
    /// Authoritative state while no driver is running
    state: BounceState,
    /// Last state pushed to the scene
    published: Arc<Mutex<BounceState>>,
    running: Arc<AtomicBool>,
    driver: Option<DriverHandle>,
    colors: ColorPicker,
    scene: Arc<Mutex<S>>,
    label: Arc<Mutex<L>>,
}

impl<S, L> BounceController<S, L>
where
    S: SceneGraph + Send + 'static,
    L: LabelSink + Send + 'static,
{
    pub fn new(settings: Settings, scene: Arc<Mutex<S>>, label: Arc<Mutex<L>>) -> Result<Self> {
        settings.validate()?;
        let state = BounceState::from_settings(&settings);
        lock(&label).set_text(&height_text(state.height));

        Ok(Self {
            colors: ColorPicker::from_seed_option(settings.color_seed),
            published: Arc::new(Mutex::new(state.clone())),
            state,
            running: Arc::new(AtomicBool::new(false)),
            driver: None,
            settings,
            scene,
            label,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Most recently published state
    pub fn state(&self) -> BounceState {
        lock(&self.published).clone()
    }

    pub fn scene(&self) -> &Arc<Mutex<S>> {
        &self.scene
    }

    pub fn label(&self) -> &Arc<Mutex<L>> {
        &self.label
    }

    /// (Re)create the sphere and ground, then start ticking if idle
    pub async fn start(&mut self) -> Result<()> {
        if !self.is_running() {
            // A run that ended on its own still holds the latest state
            self.collect_driver().await?;
        }

        let translation = self.state().translation();
        {
            let mut scene = lock(&self.scene);
            if scene.has_node(SceneNode::Sphere) {
                scene.remove_sphere();
            }
            scene.create_sphere(SPHERE_RADIUS, translation);
            scene.create_ground(&GroundPlane::default());
        }

        if self.is_running() {
            return Ok(());
        }

        log::info!(
            "Starting simulation at {:.2} m (g = {}, e = {}, dt = {})",
            self.state.height,
            self.state.gravity,
            self.state.elasticity,
            self.state.time_step
        );
        self.running.store(true, Ordering::SeqCst);

        let initial = self.state.clone();
        let running = Arc::clone(&self.running);
        let scene = Arc::clone(&self.scene);
        let label = Arc::clone(&self.label);
        let published = Arc::clone(&self.published);

        self.driver = Some(driver::spawn(move |token| async move {
            let flag = Arc::clone(&running);
            let result = driver::run_cancellable(
                initial,
                move || flag.load(Ordering::SeqCst),
                |state| publish(&scene, &label, &published, state),
                &token,
            )
            .await;

            running.store(false, Ordering::SeqCst);
            if let Err(err) = &result {
                log::error!("Simulation stopped: {err}");
            }
            result
        }));
        Ok(())
    }

    /// Stop ticking and keep the current state so `start` resumes from it
    pub async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if self.driver.is_some() {
            log::info!("Stopping simulation");
        }
        self.collect_driver().await
    }

    /// Cancel any run, remove the scene nodes and restore the initial state
    pub async fn reset(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Join first so a late tick cannot touch the scene after the reset
        if let Some(handle) = self.driver.take() {
            handle.cancel();
            if let Err(err) = handle.join().await {
                log::warn!("Discarding failed run: {err}");
            }
        }

        {
            let mut scene = lock(&self.scene);
            if scene.has_node(SceneNode::Sphere) {
                scene.remove_sphere();
            }
            if scene.has_node(SceneNode::Ground) {
                scene.remove_ground();
            }
        }

        self.state = BounceState::from_settings(&self.settings);
        *lock(&self.published) = self.state.clone();
        lock(&self.label).set_text(RESET_TEXT);
        log::info!("Simulation reset");
    }

    /// Bind a random color to the sphere; skipped when there is no sphere
    pub fn recolor_sphere(&mut self) -> Option<Rgb> {
        self.recolor(SceneNode::Sphere)
    }

    /// Bind a random color to the ground; skipped when there is no ground
    pub fn recolor_ground(&mut self) -> Option<Rgb> {
        self.recolor(SceneNode::Ground)
    }

    /// Host teardown: cancel the driver and wait for it
    pub async fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.driver.take() {
            handle.cancel();
            match handle.join().await {
                Ok(state) => self.state = state,
                Err(err) => log::warn!("Run failed before shutdown: {err}"),
            }
        }
    }

    pub async fn dispatch(&mut self, action: UiAction) -> Result<()> {
        log::debug!("Panel action: {}", action.as_str());
        match action {
            UiAction::Start => self.start().await?,
            UiAction::Stop => self.stop().await?,
            UiAction::Reset => self.reset().await,
            UiAction::RecolorSphere => {
                self.recolor_sphere();
            }
            UiAction::RecolorGround => {
                self.recolor_ground();
            }
        }
        Ok(())
    }

    fn recolor(&mut self, node: SceneNode) -> Option<Rgb> {
        let mut scene = lock(&self.scene);
        if !scene.has_node(node) {
            log::debug!("Skipping recolor, {} does not exist", node.path());
            return None;
        }

        let color = self.colors.next_color();
        match scene.set_node_color(node, color) {
            Ok(()) => Some(color),
            Err(err) => {
                log::warn!("Recolor skipped: {err}");
                None
            }
        }
    }

    /// Join the driver (if any) and take back its final state
    async fn collect_driver(&mut self) -> Result<()> {
        let Some(handle) = self.driver.take() else {
            return Ok(());
        };
        handle.cancel();
        let state = handle.join().await?;
        *lock(&self.published) = state.clone();
        self.state = state;
        Ok(())
    }
}

impl<S, L> Drop for BounceController<S, L> {
    fn drop(&mut self) {
        if let Some(handle) = &self.driver {
            handle.cancel();
        }
    }
}
