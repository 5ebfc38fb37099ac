//! Pointer and wheel gestures over the map canvas.
//!
//! - Wheel: zoom about the cursor in steps of `zoom_step * scale`.
//! - Primary drag: pan (pure translation, no inertia).
//! - Secondary drag: rotate by horizontal movement, accumulated without wrap.
//!
//! Every mutation goes through [`TransformStore::set`] and schedules one map
//! redraw through the session's [`RedrawScheduler`](runtime::RedrawScheduler).

use foundation::math::Vec2;
use runtime::clock::FrameClock;

use crate::session::ViewerSession;
use crate::transform::{clamp, TransformPatch};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl PointerButton {
    /// Maps `MouseEvent.button` (0 = primary, 2 = secondary).
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InputController {
    dragging: bool,
    rotating: bool,
    drag_reference: Vec2,
    rotate_last_x: f64,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Zoom about `cursor_px` (canvas-local CSS pixels). Negative `delta_y`
    /// (scroll up) zooms in.
    ///
    /// The offset is recomputed as `cursor - (s' / s) * (cursor - offset)`,
    /// with the cursor taken relative to the canvas centre, so the scene point
    /// under the cursor keeps its screen position.
    pub fn on_wheel<C: FrameClock + ?Sized>(
        &mut self,
        session: &mut ViewerSession,
        clock: &mut C,
        cursor_px: Vec2,
        delta_y: f64,
    ) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() || !cursor_px.is_finite() {
            return false;
        }

        let store = &mut session.transform;
        let cfg = *store.config();
        let current = store.get();
        let step = cfg.zoom_step * current.scale;
        let proposed = if delta_y < 0.0 {
            current.scale + step
        } else {
            current.scale - step
        };
        let next_scale = clamp(proposed, cfg.min_scale, cfg.max_scale);

        let center = store.viewport().map(|v| v.scale(0.5)).unwrap_or(Vec2::ZERO);
        let cursor = cursor_px - center;
        let ratio = next_scale / current.scale;
        let next_offset = cursor - (cursor - current.offset).scale(ratio);

        store.set(TransformPatch::scale(next_scale).with_offset(next_offset));
        session.redraw.schedule(clock);
        true
    }

    pub fn on_pointer_down(&mut self, session: &ViewerSession, button: PointerButton, pos_px: Vec2) {
        match button {
            PointerButton::Primary => {
                self.dragging = true;
                self.drag_reference = pos_px - session.transform.get().offset;
            }
            PointerButton::Secondary => {
                self.rotating = true;
                self.rotate_last_x = pos_px.x;
            }
            PointerButton::Other => {}
        }
    }

    pub fn on_pointer_move<C: FrameClock + ?Sized>(
        &mut self,
        session: &mut ViewerSession,
        clock: &mut C,
        pos_px: Vec2,
    ) -> bool {
        if !self.dragging && !self.rotating {
            return false;
        }

        let mut patch = TransformPatch::default();
        if self.dragging {
            patch = patch.with_offset(pos_px - self.drag_reference);
        }
        if self.rotating {
            let step = session.transform.config().rotation_step;
            let angle = session.transform.get().rotation;
            patch.rotation = Some(angle - (pos_px.x - self.rotate_last_x) * step);
            self.rotate_last_x = pos_px.x;
        }

        session.transform.set(patch);
        session.redraw.schedule(clock);
        true
    }

    /// Pointer release or leaving the canvas ends every gesture.
    pub fn on_pointer_up(&mut self) {
        self.dragging = false;
        self.rotating = false;
    }

    pub fn reset_view<C: FrameClock + ?Sized>(&mut self, session: &mut ViewerSession, clock: &mut C) {
        self.on_pointer_up();
        session.transform.reset();
        session.redraw.schedule(clock);
    }

    /// Viewport changes re-clamp the pan and need a redraw of the map.
    pub fn on_resize<C: FrameClock + ?Sized>(
        &mut self,
        session: &mut ViewerSession,
        clock: &mut C,
        width_px: f64,
        height_px: f64,
    ) {
        session.transform.set_viewport(width_px, height_px);
        session.redraw.schedule(clock);
    }
}
