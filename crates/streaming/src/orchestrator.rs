use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use catalog::{CatalogError, MapCache, ScalarSlot, SceneStore};
use runtime::clock::FrameClock;
use scene::{FrameUpdate, SceneData};
use tracing::{debug, error, info, warn};

use crate::config::ViewerConfig;
use crate::protocol::{InboundEvent, ProtocolError, decode};
use crate::viewer::{Surface, Viewer};

pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Runs fire-and-forget work (cache writes) outside the event handler.
pub trait Spawner {
    fn spawn(&self, task: LocalTask);
}

/// Spawner that parks tasks until [`TaskQueue::run_all`] drives them.
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<Vec<LocalTask>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Drives every parked task to completion on the current thread.
    pub fn run_all(&self) {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        for task in tasks {
            pollster::block_on(task);
        }
    }
}

impl Spawner for TaskQueue {
    fn spawn(&self, task: LocalTask) {
        self.tasks.borrow_mut().push(task);
    }
}

impl<T: Spawner + ?Sized> Spawner for Rc<T> {
    fn spawn(&self, task: LocalTask) {
        (**self).spawn(task);
    }
}

/// Loading overlay: a text label plus a fractional progress indicator.
pub trait LoadingOverlay {
    fn show(&mut self, label: &str);
    fn set_progress(&mut self, fraction: f64);
    fn show_error(&mut self, message: &str);
    /// Fade the overlay out after `delay_ms`.
    fn hide_after(&mut self, delay_ms: u32);
}

/// Per-frame consumer fed after the actor layer (signal panel, info readout).
pub trait FrameConsumer {
    fn on_frame(&mut self, frame: &FrameUpdate);
}

/// Binds the inbound event channel to the cache, the map layer and the
/// per-frame fan-out.
///
/// Per-frame updates are last-write-wins with no queue: each one replaces
/// the session's latest frame and is rendered before the handler returns.
pub struct StreamOrchestrator<S, C, St, L> {
    config: ViewerConfig,
    viewer: Viewer<S, C>,
    cache: Rc<MapCache<St, L>>,
    spawner: Box<dyn Spawner>,
    overlay: Box<dyn LoadingOverlay>,
    consumers: Vec<Box<dyn FrameConsumer>>,
    loading_name: Option<String>,
    live_scene_shown: bool,
}

impl<S, C, St, L> StreamOrchestrator<S, C, St, L>
where
    S: Surface,
    C: FrameClock,
    St: SceneStore + 'static,
    L: ScalarSlot + 'static,
{
    pub fn new(
        config: ViewerConfig,
        viewer: Viewer<S, C>,
        cache: Rc<MapCache<St, L>>,
        spawner: Box<dyn Spawner>,
        overlay: Box<dyn LoadingOverlay>,
    ) -> Self {
        Self {
            config,
            viewer,
            cache,
            spawner,
            overlay,
            consumers: Vec::new(),
            loading_name: None,
            live_scene_shown: false,
        }
    }

    pub fn add_consumer(&mut self, consumer: Box<dyn FrameConsumer>) {
        self.consumers.push(consumer);
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewer(&self) -> &Viewer<S, C> {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer<S, C> {
        &mut self.viewer
    }

    pub fn cache(&self) -> &Rc<MapCache<St, L>> {
        &self.cache
    }

    /// Future resolving to the last viewed scene (or the fallback scene) from
    /// the cache. Misses and failures are logged and resolve to `None`.
    ///
    /// It holds no borrow of the orchestrator, so the host can await it and
    /// then call [`StreamOrchestrator::show_restored`].
    pub fn restore_task(&self) -> impl Future<Output = Option<SceneData>> + 'static {
        let cache = Rc::clone(&self.cache);
        let fallback = self.config.fallback_scene.clone();
        async move {
            match cache.restore_last(&fallback).await {
                Ok(scene) => {
                    info!(scene = %scene.name, lanes = scene.lanes.len(), "restored cached scene");
                    Some(scene)
                }
                Err(CatalogError::NotFound) => {
                    info!("no cached scene to restore");
                    None
                }
                Err(err) => {
                    warn!(error = %err, "scene restore failed");
                    None
                }
            }
        }
    }

    /// Paints a restored scene unless a live scene has already replaced it.
    pub fn show_restored(&mut self, scene: SceneData) -> bool {
        if self.live_scene_shown {
            debug!(scene = %scene.name, "live scene already shown; dropping restored scene");
            return false;
        }
        self.viewer.load_scene(scene);
        self.viewer.redraw_map();
        true
    }

    /// Decodes and dispatches one named event. Decode failures are logged and
    /// leave the current state untouched.
    pub fn handle_raw(&mut self, event: &str, payload: &str) -> Result<(), ProtocolError> {
        match decode(event, payload) {
            Ok(ev) => {
                self.handle(ev);
                Ok(())
            }
            Err(err) => {
                warn!(event, error = %err, "skipping inbound event");
                Err(err)
            }
        }
    }

    pub fn handle(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::LoadingStarted { name } => self.on_loading_started(name),
            InboundEvent::Scene(scene) => self.on_scene(scene),
            InboundEvent::LoadingDone { name } => self.on_loading_done(name),
            InboundEvent::LoadingFailed { message } => self.on_loading_failed(message),
            InboundEvent::Frame(frame) => self.on_frame(frame),
        }
    }

    fn on_loading_started(&mut self, name: String) {
        info!(scene = %name, "scene loading started");
        self.overlay.show(&format!("Loading {name}..."));
        self.overlay.set_progress(self.config.progress.start);
        self.loading_name = Some(name);
    }

    fn on_scene(&mut self, mut scene: SceneData) {
        if scene.name.is_empty() {
            if let Some(name) = &self.loading_name {
                scene.name = name.clone();
            }
        }
        self.live_scene_shown = true;

        let cache = Rc::clone(&self.cache);
        let record = scene.clone();
        self.spawner.spawn(Box::pin(async move {
            if let Err(err) = cache.put(&record).await {
                warn!(scene = %record.name, error = %err, "scene cache write failed");
            }
        }));

        let name = scene.name.clone();
        let bounds = self.viewer.load_scene(scene);
        if !bounds.is_valid() {
            warn!(scene = %name, "scene has no finite vertices; navigation is unclamped");
        }
        self.overlay.set_progress(self.config.progress.mid);
        self.viewer.redraw_map();
        self.overlay.set_progress(self.config.progress.high);

        if !name.is_empty() {
            self.cache.remember_last_scene(&name);
        }
        info!(scene = %name, "scene displayed");
    }

    fn on_loading_done(&mut self, name: String) {
        info!(scene = %name, "scene loading done");
        self.overlay.set_progress(1.0);
        self.overlay.hide_after(self.config.overlay_fade_ms);
        self.loading_name = None;
    }

    fn on_loading_failed(&mut self, message: String) {
        error!(error = %message, "scene loading failed");
        self.overlay.show_error(&message);
        self.overlay.hide_after(self.config.error_fade_ms);
        self.loading_name = None;
    }

    fn on_frame(&mut self, frame: FrameUpdate) {
        self.viewer.session.store_frame(frame);
        let Some(frame) = self.viewer.session.take_frame() else {
            return;
        };
        self.viewer.render_frame(&frame);
        for consumer in &mut self.consumers {
            consumer.on_frame(&frame);
        }
    }

    /// Channel status changes are logged only; reconnection is the
    /// transport's job.
    pub fn connection_lost(&self, reason: &str) {
        warn!(reason, "live channel disconnected");
    }

    pub fn connection_restored(&self) {
        info!("live channel reconnected");
    }
}
