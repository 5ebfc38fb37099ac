use foundation::bounds::Bounds2;
use foundation::math::Vec2;
use layers::{ActorRenderer, DrawList, MapRenderer, SurfaceSize};
use runtime::clock::FrameClock;
use scene::{FrameUpdate, InputController, PointerButton, SceneData, ViewerSession};
use tracing::{debug, trace};

use crate::config::ViewerConfig;

/// A drawing target the host replays [`DrawList`]s onto.
pub trait Surface {
    fn size(&self) -> SurfaceSize;
    fn submit(&mut self, list: &DrawList);
}

/// Keeps every submitted list; used by tests and headless hosts.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub size: SurfaceSize,
    pub submitted: Vec<DrawList>,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            submitted: Vec::new(),
        }
    }

    pub fn last(&self) -> Option<&DrawList> {
        self.submitted.last()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn submit(&mut self, list: &DrawList) {
        self.submitted.push(list.clone());
    }
}

/// Two-layer viewer: static map below, actors above, each on its own surface.
///
/// Gestures mutate the session transform and schedule a map redraw through
/// `clock`; the host calls [`Viewer::on_animation_frame`] from its refresh
/// callback. Actor drawing happens only in [`Viewer::render_frame`].
pub struct Viewer<S, C> {
    pub session: ViewerSession,
    input: InputController,
    map: MapRenderer,
    actors: ActorRenderer,
    map_surface: S,
    actor_surface: S,
    clock: C,
}

impl<S: Surface, C: FrameClock> Viewer<S, C> {
    pub fn new(config: &ViewerConfig, map_surface: S, actor_surface: S, clock: C) -> Self {
        let mut session = ViewerSession::new(config.navigation);
        let size = map_surface.size();
        session.transform.set_viewport(size.width, size.height);
        Self {
            session,
            input: InputController::new(),
            map: MapRenderer::new(),
            actors: ActorRenderer::new(),
            map_surface,
            actor_surface,
            clock,
        }
    }

    pub fn map_surface(&self) -> &S {
        &self.map_surface
    }

    pub fn actor_surface(&self) -> &S {
        &self.actor_surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn scene(&self) -> Option<&SceneData> {
        self.map.scene()
    }

    pub fn scene_bounds(&self) -> Option<Bounds2> {
        self.map.bounds()
    }

    /// Installs a new scene and hands its bounds to the transform store.
    pub fn load_scene(&mut self, scene: SceneData) -> Bounds2 {
        let bounds = self.map.set_scene(scene);
        self.session.transform.set_scene_bounds(bounds);
        bounds
    }

    /// Full map redraw with the current transform.
    pub fn redraw_map(&mut self) {
        let list = self.map.draw(self.map_surface.size(), &self.session.transform.get());
        self.map_surface.submit(&list);
    }

    /// Refresh callback: runs the pending map redraw, if any.
    pub fn on_animation_frame(&mut self) -> bool {
        if !self.session.redraw.begin_frame() {
            return false;
        }
        trace!("map redraw");
        self.redraw_map();
        true
    }

    pub fn render_frame(&mut self, frame: &FrameUpdate) {
        let list = self.actors.draw(
            self.actor_surface.size(),
            &self.session.transform.get(),
            self.map.bounds(),
            &frame.actors,
        );
        self.actor_surface.submit(&list);
    }

    pub fn wheel(&mut self, cursor_px: Vec2, delta_y: f64) -> bool {
        self.input
            .on_wheel(&mut self.session, &mut self.clock, cursor_px, delta_y)
    }

    pub fn pointer_down(&mut self, button: PointerButton, pos_px: Vec2) {
        self.input.on_pointer_down(&self.session, button, pos_px);
    }

    pub fn pointer_move(&mut self, pos_px: Vec2) -> bool {
        self.input
            .on_pointer_move(&mut self.session, &mut self.clock, pos_px)
    }

    pub fn pointer_up(&mut self) {
        self.input.on_pointer_up();
    }

    pub fn reset_view(&mut self) {
        self.input.reset_view(&mut self.session, &mut self.clock);
    }

    /// Cancels any pending map redraw so no frame callback outlives the viewer.
    pub fn shutdown(&mut self) {
        if self.session.redraw.cancel(&mut self.clock) {
            debug!("pending map redraw cancelled");
        }
    }

    /// The host resizes its surfaces first, then reports the new CSS size.
    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.input
            .on_resize(&mut self.session, &mut self.clock, width_px, height_px);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layers::DrawCommand;
    use runtime::clock::ManualClock;
    use scene::{BoundaryType, Lane, Point};

    fn viewer() -> Viewer<RecordingSurface, ManualClock> {
        let size = SurfaceSize::new(800.0, 600.0, 1.0);
        Viewer::new(
            &ViewerConfig::default(),
            RecordingSurface::new(size),
            RecordingSurface::new(size),
            ManualClock::new(),
        )
    }

    fn scene() -> SceneData {
        SceneData {
            name: "s".to_string(),
            lanes: vec![Lane {
                id: None,
                polygon: vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(100.0, 100.0),
                ],
                left_boundary: Vec::new(),
                right_boundary: Vec::new(),
                left_boundary_type: BoundaryType::Unknown,
                right_boundary_type: BoundaryType::Unknown,
            }],
        }
    }

    #[test]
    fn gesture_burst_redraws_map_once() {
        let mut v = viewer();
        v.load_scene(scene());
        v.pointer_down(PointerButton::Primary, Vec2::new(10.0, 10.0));
        for i in 0..10 {
            v.pointer_move(Vec2::new(10.0 + i as f64, 10.0));
            v.wheel(Vec2::new(400.0, 300.0), -1.0);
        }
        v.pointer_up();
        assert_eq!(v.clock().live_requests(), 1);

        for _ in v.clock_mut().tick() {
            v.on_animation_frame();
        }
        assert_eq!(v.map_surface().submitted.len(), 1);
        assert!(v.actor_surface().submitted.is_empty());
        assert!(!v.on_animation_frame());
    }

    #[test]
    fn loading_a_scene_enables_pan_clamping() {
        let mut v = viewer();
        v.pointer_down(PointerButton::Primary, Vec2::ZERO);
        v.pointer_move(Vec2::new(5000.0, 0.0));
        assert_eq!(v.session.transform.get().offset.x, 5000.0);

        v.load_scene(scene());
        // 100 scene units at scale 1 fit the 800px viewport.
        assert_eq!(v.session.transform.get().offset, Vec2::ZERO);
    }

    #[test]
    fn frames_draw_only_the_actor_layer() {
        let mut v = viewer();
        v.load_scene(scene());
        v.render_frame(&FrameUpdate::default());
        assert!(v.map_surface().submitted.is_empty());
        assert_eq!(v.actor_surface().submitted.len(), 1);
        assert!(
            v.actor_surface().submitted[0]
                .commands
                .contains(&DrawCommand::Clear { pixel_ratio: 1.0 })
        );
    }

    #[test]
    fn resize_reclamps_and_schedules() {
        let mut v = viewer();
        v.load_scene(scene());
        v.session
            .transform
            .set(scene::TransformPatch::scale(20.0));
        v.pointer_down(PointerButton::Primary, Vec2::ZERO);
        v.pointer_move(Vec2::new(600.0, 0.0));
        v.pointer_up();
        // 2000px wide scene in 800px: limit 600.
        assert_eq!(v.session.transform.get().offset.x, 600.0);

        v.resize(1600.0, 600.0);
        assert_eq!(v.session.transform.get().offset.x, 200.0);
        assert!(v.session.redraw.is_pending());
    }

    #[test]
    fn shutdown_cancels_pending_redraw() {
        let mut v = viewer();
        v.wheel(Vec2::new(400.0, 300.0), -1.0);
        assert_eq!(v.clock().live_requests(), 1);
        v.shutdown();
        assert_eq!(v.clock().live_requests(), 0);
        assert!(v.clock_mut().tick().is_empty());
        assert!(!v.on_animation_frame());
        assert!(v.map_surface().submitted.is_empty());
    }
}
