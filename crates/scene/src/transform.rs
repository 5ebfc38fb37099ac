use foundation::bounds::Bounds2;
use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

pub(crate) fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Navigation limits and gesture gains.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Wheel zoom step as a fraction of the current scale.
    pub zoom_step: f64,
    /// Radians of rotation per CSS pixel of horizontal secondary-button drag.
    pub rotation_step: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 20.0,
            zoom_step: 0.05,
            rotation_step: 0.01,
        }
    }
}

impl NavigationConfig {
    /// Repairs limits a partial override can leave inconsistent: a
    /// non-positive or non-finite bound falls back to its default, and
    /// inverted bounds are swapped.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let mut min_scale = positive(self.min_scale, defaults.min_scale);
        let mut max_scale = positive(self.max_scale, defaults.max_scale);
        if min_scale > max_scale {
            std::mem::swap(&mut min_scale, &mut max_scale);
        }
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            min_scale,
            max_scale,
            zoom_step: finite(self.zoom_step, defaults.zoom_step),
            rotation_step: finite(self.rotation_step, defaults.rotation_step),
        }
    }
}

/// Pan/zoom/rotate state applied to the map layer.
///
/// `offset` is in CSS pixels relative to the canvas centre; `rotation` is in
/// radians and never normalized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub offset: Vec2,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Maps a scene point to canvas CSS pixels.
    ///
    /// Mirrors the canvas stack `translate(viewport / 2 + offset)`,
    /// `rotate(rotation)`, `scale(scale)`, `translate(-pivot)`.
    pub fn scene_to_screen(&self, p: Vec2, pivot: Vec2, viewport: Vec2) -> Vec2 {
        viewport.scale(0.5) + self.offset + (p - pivot).scale(self.scale).rotate(self.rotation)
    }

    pub fn screen_to_scene(&self, s: Vec2, pivot: Vec2, viewport: Vec2) -> Vec2 {
        pivot
            + (s - viewport.scale(0.5) - self.offset)
                .rotate(-self.rotation)
                .scale(1.0 / self.scale)
    }
}

/// Partial update for [`TransformStore::set`]; `None` fields are left alone.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TransformPatch {
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
}

impl TransformPatch {
    pub fn offset(offset: Vec2) -> Self {
        Self {
            offset_x: Some(offset.x),
            offset_y: Some(offset.y),
            ..Self::default()
        }
    }

    pub fn scale(scale: f64) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset_x = Some(offset.x);
        self.offset_y = Some(offset.y);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.offset_x.is_none()
            && self.offset_y.is_none()
            && self.scale.is_none()
            && self.rotation.is_none()
    }
}

/// Owner of the viewer's navigation state.
///
/// Invariants held after every write:
/// - `scale` lies in `[min_scale, max_scale]`;
/// - when both scene bounds and the viewport are known, each offset axis lies
///   in `[-limit, limit]` with `limit = max(0, scaled_dim / 2 - viewport_dim / 2)`.
#[derive(Debug, Clone)]
pub struct TransformStore {
    config: NavigationConfig,
    current: Transform,
    initial: Transform,
    scene_bounds: Option<Bounds2>,
    viewport: Option<Vec2>,
}

impl TransformStore {
    pub fn new(config: NavigationConfig) -> Self {
        let config = config.normalized();
        let mut initial = Transform::default();
        initial.scale = clamp(initial.scale, config.min_scale, config.max_scale);
        Self {
            config,
            current: initial,
            initial,
            scene_bounds: None,
            viewport: None,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> Transform {
        self.current
    }

    /// Snapshot captured when the session started.
    pub fn initial(&self) -> Transform {
        self.initial
    }

    pub fn set(&mut self, patch: TransformPatch) {
        if patch.is_empty() {
            return;
        }
        if let Some(x) = patch.offset_x {
            self.current.offset.x = x;
        }
        if let Some(y) = patch.offset_y {
            self.current.offset.y = y;
        }
        if let Some(s) = patch.scale {
            self.current.scale = clamp(s, self.config.min_scale, self.config.max_scale);
        }
        if let Some(r) = patch.rotation {
            self.current.rotation = r;
        }
        self.clamp_offset();
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
        self.clamp_offset();
    }

    pub fn scene_bounds(&self) -> Option<Bounds2> {
        self.scene_bounds
    }

    /// Installs the active scene's bounds; undefined bounds disable clamping.
    pub fn set_scene_bounds(&mut self, bounds: Bounds2) {
        self.scene_bounds = bounds.is_valid().then_some(bounds);
        self.clamp_offset();
    }

    pub fn viewport(&self) -> Option<Vec2> {
        self.viewport
    }

    /// Viewport size in CSS pixels; non-positive sizes count as unknown.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite())
            .then_some(Vec2::new(width, height));
        self.clamp_offset();
    }

    /// Per-axis offset limit, or `None` while bounds or viewport are unknown.
    pub fn offset_limit(&self) -> Option<Vec2> {
        let bounds = self.scene_bounds?;
        let viewport = self.viewport?;
        let s = self.current.scale;
        Some(Vec2::new(
            (bounds.width() * s * 0.5 - viewport.x * 0.5).max(0.0),
            (bounds.height() * s * 0.5 - viewport.y * 0.5).max(0.0),
        ))
    }

    fn clamp_offset(&mut self) {
        if let Some(limit) = self.offset_limit() {
            self.current.offset.x = clamp(self.current.offset.x, -limit.x, limit.x);
            self.current.offset.y = clamp(self.current.offset.y, -limit.y, limit.y);
        }
    }
}

impl Default for TransformStore {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{NavigationConfig, Transform, TransformPatch, TransformStore};
    use foundation::bounds::Bounds2;
    use foundation::math::Vec2;
    use proptest::prelude::*;

    fn store_with_scene(w: f64, h: f64, vw: f64, vh: f64) -> TransformStore {
        let mut store = TransformStore::default();
        store.set_scene_bounds(Bounds2::new(0.0, 0.0, w, h));
        store.set_viewport(vw, vh);
        store
    }

    #[test]
    fn initial_state() {
        let store = TransformStore::default();
        assert_eq!(store.get(), Transform::default());
        assert_eq!(store.get().offset, Vec2::ZERO);
        assert_eq!(store.get().scale, 1.0);
        assert_eq!(store.get().rotation, 0.0);
    }

    #[test]
    fn empty_patch_is_noop() {
        let mut store = store_with_scene(1000.0, 1000.0, 200.0, 200.0);
        store.set(TransformPatch::offset(Vec2::new(30.0, -40.0)));
        store.set(TransformPatch::rotation(1.25));
        let before = store.get();
        store.set(TransformPatch::default());
        assert_eq!(store.get(), before);
    }

    #[test]
    fn partial_patch_only_touches_given_fields() {
        let mut store = TransformStore::default();
        store.set(TransformPatch::rotation(0.5));
        store.set(TransformPatch::scale(2.0));
        let t = store.get();
        assert_eq!(t.rotation, 0.5);
        assert_eq!(t.scale, 2.0);
        assert_eq!(t.offset, Vec2::ZERO);
    }

    #[test]
    fn scale_is_clamped() {
        let mut store = TransformStore::default();
        store.set(TransformPatch::scale(1e6));
        assert_eq!(store.get().scale, NavigationConfig::default().max_scale);
        store.set(TransformPatch::scale(-3.0));
        assert_eq!(store.get().scale, NavigationConfig::default().min_scale);
    }

    #[test]
    fn pan_is_pass_through_without_bounds() {
        let mut store = TransformStore::default();
        store.set_viewport(100.0, 100.0);
        store.set(TransformPatch::offset(Vec2::new(5000.0, -5000.0)));
        assert_eq!(store.get().offset, Vec2::new(5000.0, -5000.0));
    }

    #[test]
    fn pan_clamps_to_zero_when_scene_fits() {
        let mut store = store_with_scene(100.0, 50.0, 800.0, 600.0);
        store.set(TransformPatch::offset(Vec2::new(120.0, -80.0)));
        assert_eq!(store.get().offset, Vec2::ZERO);
    }

    #[test]
    fn pan_clamps_to_half_overflow() {
        // scaled 2000x1000 in an 800x600 viewport
        let mut store = store_with_scene(1000.0, 500.0, 800.0, 600.0);
        store.set(TransformPatch::scale(2.0));
        store.set(TransformPatch::offset(Vec2::new(10_000.0, -10_000.0)));
        assert_eq!(store.get().offset, Vec2::new(600.0, -200.0));
    }

    #[test]
    fn zooming_out_reclamps_existing_offset() {
        let mut store = store_with_scene(1000.0, 1000.0, 500.0, 500.0);
        store.set(TransformPatch::offset(Vec2::new(250.0, 250.0)));
        assert_eq!(store.get().offset, Vec2::new(250.0, 250.0));
        store.set(TransformPatch::scale(0.5));
        assert_eq!(store.get().offset, Vec2::ZERO);
    }

    #[test]
    fn invalid_bounds_disable_clamping() {
        let mut store = store_with_scene(10.0, 10.0, 100.0, 100.0);
        store.set_scene_bounds(Bounds2::EMPTY);
        assert!(store.scene_bounds().is_none());
        store.set(TransformPatch::offset(Vec2::new(70.0, 70.0)));
        assert_eq!(store.get().offset, Vec2::new(70.0, 70.0));
    }

    #[test]
    fn inverted_scale_limits_are_swapped() {
        let cfg: NavigationConfig = serde_json::from_str(r#"{"max_scale":0.05}"#).unwrap();
        let mut store = TransformStore::new(cfg);
        assert_eq!(store.config().min_scale, 0.05);
        assert_eq!(store.config().max_scale, 0.1);
        store.set(TransformPatch::scale(1.0));
        assert_eq!(store.get().scale, 0.1);
    }

    #[test]
    fn non_positive_min_scale_falls_back_to_default() {
        let cfg = NavigationConfig {
            min_scale: 0.0,
            max_scale: f64::NAN,
            ..NavigationConfig::default()
        }
        .normalized();
        assert_eq!(cfg.min_scale, NavigationConfig::default().min_scale);
        assert_eq!(cfg.max_scale, NavigationConfig::default().max_scale);
    }

    #[test]
    fn reset_restores_initial_snapshot() {
        let mut store = TransformStore::default();
        store.set(TransformPatch::scale(3.0).with_offset(Vec2::new(1.0, 2.0)));
        store.set(TransformPatch::rotation(-7.0));
        store.reset();
        assert_eq!(store.get(), store.initial());
    }

    #[test]
    fn screen_mapping_round_trips() {
        let t = Transform {
            offset: Vec2::new(12.0, -4.0),
            scale: 2.5,
            rotation: 0.7,
        };
        let pivot = Vec2::new(100.0, 50.0);
        let viewport = Vec2::new(800.0, 600.0);
        let p = Vec2::new(87.0, 61.5);
        let back = t.screen_to_scene(t.scene_to_screen(p, pivot, viewport), pivot, viewport);
        assert!(back.distance(p) < 1e-9);
        assert_eq!(t.scene_to_screen(pivot, pivot, viewport), Vec2::new(412.0, 296.0));
    }

    proptest! {
        #[test]
        fn scale_always_within_limits(scales in proptest::collection::vec(-1e9f64..1e9, 1..64)) {
            let cfg = NavigationConfig::default();
            let mut store = TransformStore::new(cfg);
            for s in scales {
                store.set(TransformPatch::scale(s));
                let got = store.get().scale;
                prop_assert!(got >= cfg.min_scale && got <= cfg.max_scale);
            }
        }

        #[test]
        fn offset_respects_limit(
            w in 1.0f64..5000.0,
            h in 1.0f64..5000.0,
            scale in 0.1f64..20.0,
            ox in -1e5f64..1e5,
            oy in -1e5f64..1e5,
        ) {
            let mut store = store_with_scene(w, h, 640.0, 480.0);
            store.set(TransformPatch::scale(scale).with_offset(Vec2::new(ox, oy)));
            let t = store.get();
            let lx = (w * t.scale / 2.0 - 320.0).max(0.0);
            let ly = (h * t.scale / 2.0 - 240.0).max(0.0);
            prop_assert!(t.offset.x.abs() <= lx + 1e-9);
            prop_assert!(t.offset.y.abs() <= ly + 1e-9);
        }
    }
}
