use foundation::bounds::Bounds2;
use foundation::math::Vec2;
use scene::{Lane, Point, SceneData, Transform, scene_bounds};
use tracing::debug;

use crate::draw::{DrawCommand, DrawList, SurfaceSize, SurfaceState};
use crate::symbology::{
    BoundaryStyle, DASH_PATTERN, LANE_OUTLINE_WIDTH, LANE_SURFACE, MARKING_WIDTH, StrokePattern,
    boundary_style,
};

/// Pushes the navigation stack shared by the map and actor layers: translate
/// to the canvas centre plus pan, rotate, scale, translate by `-pivot`.
pub fn push_navigation(out: &mut DrawList, size: SurfaceSize, transform: &Transform, pivot: Vec2) {
    out.push(DrawCommand::Translate(size.css().scale(0.5) + transform.offset));
    out.push(DrawCommand::Rotate(transform.rotation));
    out.push(DrawCommand::Scale(transform.scale));
    out.push(DrawCommand::Translate(-pivot));
}

fn points(pts: &[Point]) -> impl Iterator<Item = Vec2> + '_ {
    pts.iter().map(|p| p.0)
}

/// Static road geometry layer.
///
/// Holds the render copy of the current scene and its bounds; every
/// [`MapRenderer::draw`] is a full redraw.
#[derive(Debug, Default)]
pub struct MapRenderer {
    scene: Option<SceneData>,
    bounds: Option<Bounds2>,
    surface: SurfaceState,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the scene and recomputes its bounds. Returns the raw bounds,
    /// which are invalid (min > max) when the scene has no finite vertex.
    pub fn set_scene(&mut self, scene: SceneData) -> Bounds2 {
        let bounds = scene_bounds(&scene);
        debug!(
            scene = %scene.name,
            lanes = scene.lanes.len(),
            valid_bounds = bounds.is_valid(),
            "map scene replaced"
        );
        self.bounds = bounds.is_valid().then_some(bounds);
        self.scene = Some(scene);
        bounds
    }

    pub fn scene(&self) -> Option<&SceneData> {
        self.scene.as_ref()
    }

    pub fn bounds(&self) -> Option<Bounds2> {
        self.bounds
    }

    /// Rotation and zoom pivot: the scene centre, or the origin without bounds.
    pub fn pivot(&self) -> Vec2 {
        self.bounds.map(|b| b.center()).unwrap_or(Vec2::ZERO)
    }

    pub fn draw(&mut self, size: SurfaceSize, transform: &Transform) -> DrawList {
        let mut out = DrawList::new();
        self.surface.begin(size, &mut out);
        let Some(scene) = &self.scene else {
            return out;
        };

        out.push(DrawCommand::Save);
        push_navigation(&mut out, size, transform, self.pivot());
        for lane in &scene.lanes {
            draw_lane(&mut out, lane);
        }
        out.push(DrawCommand::Restore);
        out
    }
}

fn draw_lane(out: &mut DrawList, lane: &Lane) {
    out.push(DrawCommand::SetLineDash(Vec::new()));
    if out.path(points(&lane.polygon), true) >= 3 {
        out.push(DrawCommand::SetFillStyle(LANE_SURFACE.to_string()));
        out.push(DrawCommand::Fill);
        out.push(DrawCommand::SetStrokeStyle(LANE_SURFACE.to_string()));
        out.push(DrawCommand::SetLineWidth(LANE_OUTLINE_WIDTH));
        out.push(DrawCommand::Stroke);
    }

    for (boundary, kind) in [
        (&lane.left_boundary, &lane.left_boundary_type),
        (&lane.right_boundary, &lane.right_boundary_type),
    ] {
        if let Some(style) = boundary_style(kind) {
            draw_boundary(out, boundary, style);
        }
    }
}

fn draw_boundary(out: &mut DrawList, boundary: &[Point], style: BoundaryStyle) {
    if out.path(points(boundary), false) < 2 {
        return;
    }
    out.push(DrawCommand::SetStrokeStyle(style.color.css().to_string()));
    match style.pattern {
        StrokePattern::Solid => {
            out.push(DrawCommand::SetLineDash(Vec::new()));
            out.push(DrawCommand::SetLineWidth(MARKING_WIDTH));
            out.push(DrawCommand::Stroke);
        }
        StrokePattern::Dashed => {
            out.push(DrawCommand::SetLineDash(DASH_PATTERN.to_vec()));
            out.push(DrawCommand::SetLineWidth(MARKING_WIDTH));
            out.push(DrawCommand::Stroke);
        }
        StrokePattern::Double => {
            // Wide marking stroke, then a surface-coloured core leaves two lines.
            out.push(DrawCommand::SetLineDash(Vec::new()));
            out.push(DrawCommand::SetLineWidth(MARKING_WIDTH * 3.0));
            out.push(DrawCommand::Stroke);
            out.push(DrawCommand::SetStrokeStyle(LANE_SURFACE.to_string()));
            out.push(DrawCommand::SetLineWidth(MARKING_WIDTH));
            out.push(DrawCommand::Stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::{MARKING_WHITE, MARKING_YELLOW};
    use scene::BoundaryType;

    fn lane(left: BoundaryType, right: BoundaryType) -> Lane {
        Lane {
            id: None,
            polygon: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 4.0),
                Point::new(0.0, 4.0),
            ],
            left_boundary: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            right_boundary: vec![Point::new(0.0, 4.0), Point::new(10.0, 4.0)],
            left_boundary_type: left,
            right_boundary_type: right,
        }
    }

    fn scene(lanes: Vec<Lane>) -> SceneData {
        SceneData {
            name: "test".to_string(),
            lanes,
        }
    }

    fn size() -> SurfaceSize {
        SurfaceSize::new(800.0, 600.0, 1.0)
    }

    fn stroke_styles(list: &DrawList) -> Vec<&str> {
        list.iter()
            .filter_map(|c| match c {
                DrawCommand::SetStrokeStyle(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Dash pattern in effect at each `Stroke`, in order.
    fn dashes_at_strokes(list: &DrawList) -> Vec<Vec<f64>> {
        let mut dash = Vec::new();
        let mut out = Vec::new();
        for c in list.iter() {
            match c {
                DrawCommand::SetLineDash(d) => dash = d.clone(),
                DrawCommand::Stroke => out.push(dash.clone()),
                _ => {}
            }
        }
        out
    }

    #[test]
    fn draws_nothing_but_clear_without_a_scene() {
        let mut r = MapRenderer::new();
        let list = r.draw(size(), &Transform::default());
        assert_eq!(list.count(|c| matches!(c, DrawCommand::Fill | DrawCommand::Stroke)), 0);
        assert!(list.commands.contains(&DrawCommand::Clear { pixel_ratio: 1.0 }));
    }

    #[test]
    fn transform_stack_pivots_on_scene_centre() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![lane(BoundaryType::Unknown, BoundaryType::Unknown)]));
        let t = Transform {
            offset: Vec2::new(12.0, -3.0),
            scale: 2.0,
            rotation: 0.25,
        };
        let list = r.draw(size(), &t);
        let start = list
            .iter()
            .position(|c| *c == DrawCommand::Save)
            .unwrap();
        assert_eq!(
            list.commands[start + 1..start + 5],
            [
                DrawCommand::Translate(Vec2::new(412.0, 297.0)),
                DrawCommand::Rotate(0.25),
                DrawCommand::Scale(2.0),
                DrawCommand::Translate(Vec2::new(-5.0, -2.0)),
            ]
        );
        assert_eq!(list.commands.last(), Some(&DrawCommand::Restore));
    }

    #[test]
    fn curb_is_never_drawn() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![lane(BoundaryType::Curb, BoundaryType::Curb)]));
        let list = r.draw(size(), &Transform::default());
        // Only the lane outline strokes.
        assert_eq!(stroke_styles(&list), vec![LANE_SURFACE]);
    }

    #[test]
    fn unknown_and_unrecognized_boundaries_are_suppressed() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![lane(
            BoundaryType::Unknown,
            BoundaryType::parse("SHOULDER"),
        )]));
        let list = r.draw(size(), &Transform::default());
        assert_eq!(list.count(|c| *c == DrawCommand::Stroke), 1);
    }

    #[test]
    fn solid_white_has_no_dash_and_dotted_yellow_has_one() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![lane(
            BoundaryType::SolidWhite,
            BoundaryType::DottedYellow,
        )]));
        let list = r.draw(size(), &Transform::default());
        assert_eq!(
            stroke_styles(&list),
            vec![LANE_SURFACE, MARKING_WHITE, MARKING_YELLOW]
        );
        let dashes = dashes_at_strokes(&list);
        assert_eq!(dashes.len(), 3);
        assert!(dashes[1].is_empty());
        assert_eq!(dashes[2], DASH_PATTERN.to_vec());
    }

    #[test]
    fn dash_is_cleared_after_a_dashed_boundary() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![
            lane(BoundaryType::DottedWhite, BoundaryType::Unknown),
            lane(BoundaryType::SolidYellow, BoundaryType::Unknown),
        ]));
        let dashes = dashes_at_strokes(&r.draw(size(), &Transform::default()));
        // outline, dashed, outline, solid
        assert_eq!(dashes.len(), 4);
        assert!(!dashes[1].is_empty());
        assert!(dashes[2].is_empty());
        assert!(dashes[3].is_empty());
    }

    #[test]
    fn double_yellow_is_two_strokes() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![lane(
            BoundaryType::DoubleYellow,
            BoundaryType::Unknown,
        )]));
        let list = r.draw(size(), &Transform::default());
        assert_eq!(
            stroke_styles(&list),
            vec![LANE_SURFACE, MARKING_YELLOW, LANE_SURFACE]
        );
        assert!(list.commands.contains(&DrawCommand::SetLineWidth(MARKING_WIDTH * 3.0)));
    }

    #[test]
    fn widths_are_in_scene_units() {
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![lane(BoundaryType::SolidWhite, BoundaryType::Unknown)]));
        let zoomed = Transform {
            scale: 8.0,
            ..Transform::default()
        };
        let a = r.draw(size(), &Transform::default());
        let b = r.draw(size(), &zoomed);
        let widths = |l: &DrawList| {
            l.iter()
                .filter_map(|c| match c {
                    DrawCommand::SetLineWidth(w) => Some(*w),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(widths(&a), widths(&b));
    }

    #[test]
    fn invalid_scene_bounds_fall_back_to_origin_pivot() {
        let mut r = MapRenderer::new();
        let bounds = r.set_scene(scene(Vec::new()));
        assert!(!bounds.is_valid());
        assert_eq!(r.bounds(), None);
        assert_eq!(r.pivot(), Vec2::ZERO);
    }

    #[test]
    fn degenerate_lane_polygon_is_not_filled() {
        let mut bad = lane(BoundaryType::SolidWhite, BoundaryType::Unknown);
        bad.polygon.truncate(2);
        let mut r = MapRenderer::new();
        r.set_scene(scene(vec![bad]));
        let list = r.draw(size(), &Transform::default());
        assert_eq!(list.count(|c| *c == DrawCommand::Fill), 0);
        assert_eq!(stroke_styles(&list), vec![MARKING_WHITE]);
    }
}
