use foundation::bounds::Bounds2;
use foundation::math::Vec2;
use scene::{Actor, Transform};

use crate::draw::{DrawCommand, DrawList, SurfaceSize, SurfaceState, TextAlign, TextBaseline};
use crate::map::push_navigation;
use crate::symbology::{
    ACTOR_OUTLINE, ACTOR_OUTLINE_WIDTH, LABEL_COLOR, LABEL_FONT, LABEL_GAP_PX, actor_fill,
};

/// Speed label text, e.g. `3.14 m/s`.
pub fn speed_label(speed: f64) -> String {
    format!("{speed:.2} m/s")
}

/// An actor's polygon in the map's normalized frame plus its label anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedActor {
    pub fill: &'static str,
    pub polygon: Vec<Vec2>,
    /// Centre of the polygon's axis-aligned bounding box.
    pub anchor: Vec2,
    pub id_label: String,
    pub speed_label: String,
}

/// Normalizes drawable actors against `origin` (the scene's minimum corner).
/// Actors without at least three finite vertices are dropped.
pub fn prepare_actors(actors: &[Actor], origin: Vec2) -> Vec<PreparedActor> {
    let mut out = Vec::with_capacity(actors.len());
    for actor in actors {
        let Some(poly) = actor.drawable_polygon() else {
            continue;
        };
        let mut bbox = Bounds2::EMPTY;
        let mut polygon = Vec::with_capacity(poly.len());
        for p in poly.iter().filter(|p| p.is_finite()) {
            let v = p.0 - origin;
            bbox.include(v);
            polygon.push(v);
        }
        if polygon.len() < 3 {
            continue;
        }
        out.push(PreparedActor {
            fill: actor_fill(actor),
            polygon,
            anchor: bbox.center(),
            id_label: actor.id.to_string(),
            speed_label: speed_label(actor.speed),
        });
    }
    out
}

/// Groups prepared actors by fill colour, preserving first-seen colour order.
pub fn group_by_fill(actors: &[PreparedActor]) -> Vec<(&'static str, Vec<&PreparedActor>)> {
    let mut groups: Vec<(&'static str, Vec<&PreparedActor>)> = Vec::new();
    for a in actors {
        match groups.iter_mut().find(|(c, _)| *c == a.fill) {
            Some((_, members)) => members.push(a),
            None => groups.push((a.fill, vec![a])),
        }
    }
    groups
}

/// Dynamic actor layer, drawn above the map on its own surface.
///
/// Polygons are drawn under the map's navigation transform; labels are placed
/// in screen space so they stay upright and legible at any zoom.
#[derive(Debug, Default)]
pub struct ActorRenderer {
    surface: SurfaceState,
}

impl ActorRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(
        &mut self,
        size: SurfaceSize,
        transform: &Transform,
        scene_bounds: Option<Bounds2>,
        actors: &[Actor],
    ) -> DrawList {
        let mut out = DrawList::new();
        self.surface.begin(size, &mut out);

        let origin = scene_bounds.map(|b| b.min()).unwrap_or(Vec2::ZERO);
        // Map pivot expressed in the normalized frame.
        let pivot = scene_bounds
            .map(|b| Vec2::new(b.width() * 0.5, b.height() * 0.5))
            .unwrap_or(Vec2::ZERO);

        let prepared = prepare_actors(actors, origin);
        if prepared.is_empty() {
            return out;
        }

        out.push(DrawCommand::Save);
        push_navigation(&mut out, size, transform, pivot);
        out.push(DrawCommand::SetLineDash(Vec::new()));
        for (fill, members) in group_by_fill(&prepared) {
            out.push(DrawCommand::BeginPath);
            for a in &members {
                trace_polygon(&mut out, &a.polygon);
            }
            out.push(DrawCommand::SetFillStyle(fill.to_string()));
            out.push(DrawCommand::Fill);

            out.push(DrawCommand::SetStrokeStyle(ACTOR_OUTLINE.to_string()));
            out.push(DrawCommand::SetLineWidth(ACTOR_OUTLINE_WIDTH));
            for a in &members {
                out.push(DrawCommand::BeginPath);
                trace_polygon(&mut out, &a.polygon);
                out.push(DrawCommand::Stroke);
            }
        }
        out.push(DrawCommand::Restore);

        out.push(DrawCommand::SetFont(LABEL_FONT.to_string()));
        out.push(DrawCommand::SetFillStyle(LABEL_COLOR.to_string()));
        out.push(DrawCommand::SetTextAlign(TextAlign::Center));
        out.push(DrawCommand::SetTextBaseline(TextBaseline::Middle));
        for a in &prepared {
            let at = transform.scene_to_screen(a.anchor, pivot, size.css());
            out.push(DrawCommand::FillText {
                text: a.id_label.clone(),
                at: at - Vec2::new(0.0, LABEL_GAP_PX),
            });
            out.push(DrawCommand::FillText {
                text: a.speed_label.clone(),
                at: at + Vec2::new(0.0, LABEL_GAP_PX),
            });
        }
        out
    }
}

// Sub-path only; no BeginPath so several polygons can share one fill.
fn trace_polygon(out: &mut DrawList, polygon: &[Vec2]) {
    let mut it = polygon.iter();
    if let Some(first) = it.next() {
        out.push(DrawCommand::MoveTo(*first));
        for p in it {
            out.push(DrawCommand::LineTo(*p));
        }
        out.push(DrawCommand::ClosePath);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbology::SYSTEM_UNDER_TEST_FILL;
    use scene::{ActorId, Point};

    fn square(id: i64, category: &str, x: f64, y: f64) -> Actor {
        Actor {
            id: ActorId::Int(id),
            category: category.to_string(),
            role: None,
            polygon: Some(vec![
                Point::new(x, y),
                Point::new(x + 2.0, y),
                Point::new(x + 2.0, y + 4.0),
                Point::new(x, y + 4.0),
            ]),
            speed: 0.0,
        }
    }

    fn size() -> SurfaceSize {
        SurfaceSize::new(400.0, 400.0, 1.0)
    }

    #[test]
    fn speed_is_rounded_to_two_decimals() {
        assert_eq!(speed_label(3.14159), "3.14 m/s");
        assert_eq!(speed_label(0.0), "0.00 m/s");
    }

    #[test]
    fn speed_label_is_drawn() {
        let mut a = square(7, "vehicle.audi", 0.0, 0.0);
        a.speed = 3.14159;
        let list = ActorRenderer::new().draw(size(), &Transform::default(), None, &[a]);
        assert_eq!(list.texts(), vec!["7", "3.14 m/s"]);
    }

    #[test]
    fn degenerate_actors_are_skipped_entirely() {
        let mut two_points = square(1, "vehicle", 0.0, 0.0);
        two_points.polygon.as_mut().unwrap().truncate(2);
        let mut missing = square(2, "vehicle", 0.0, 0.0);
        missing.polygon = None;
        let list = ActorRenderer::new().draw(
            size(),
            &Transform::default(),
            None,
            &[two_points, missing],
        );
        assert!(list.texts().is_empty());
        assert_eq!(list.count(|c| matches!(c, DrawCommand::Fill | DrawCommand::Stroke)), 0);
    }

    #[test]
    fn polygons_are_normalized_to_scene_min_corner() {
        let prepared = prepare_actors(&[square(1, "vehicle", 105.0, 210.0)], Vec2::new(100.0, 200.0));
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].polygon[0], Vec2::new(5.0, 10.0));
        assert_eq!(prepared[0].anchor, Vec2::new(6.0, 12.0));
    }

    #[test]
    fn one_fill_per_colour_and_one_stroke_per_actor() {
        let actors = [
            square(1, "vehicle.a", 0.0, 0.0),
            square(2, "walker.b", 5.0, 0.0),
            square(3, "vehicle.c", 10.0, 0.0),
            square(4, "vehicle.d", 15.0, 0.0),
        ];
        let list = ActorRenderer::new().draw(size(), &Transform::default(), None, &actors);
        assert_eq!(list.count(|c| *c == DrawCommand::Fill), 2);
        assert_eq!(list.count(|c| *c == DrawCommand::Stroke), 4);
        assert_eq!(list.texts().len(), 8);
    }

    #[test]
    fn system_under_test_overrides_category() {
        let mut ego = square(1, "vehicle.lincoln", 0.0, 0.0);
        ego.role = Some("EGO".to_string());
        let prepared = prepare_actors(&[ego, square(2, "vehicle.x", 0.0, 0.0)], Vec2::ZERO);
        assert_eq!(prepared[0].fill, SYSTEM_UNDER_TEST_FILL);
        assert_ne!(prepared[1].fill, SYSTEM_UNDER_TEST_FILL);
        assert_eq!(group_by_fill(&prepared).len(), 2);
    }

    #[test]
    fn id_label_sits_above_speed_label() {
        let list = ActorRenderer::new().draw(
            size(),
            &Transform::default(),
            None,
            &[square(9, "static.prop", 0.0, 0.0)],
        );
        let ys: Vec<f64> = list
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { at, .. } => Some(at.y),
                _ => None,
            })
            .collect();
        assert!(ys[0] < ys[1]);
    }

    #[test]
    fn labels_follow_the_navigation_transform() {
        let bounds = Bounds2::new(0.0, 0.0, 20.0, 20.0);
        let t = Transform {
            offset: Vec2::new(30.0, 0.0),
            scale: 2.0,
            rotation: 0.0,
        };
        // Actor centred on the scene centre lands at canvas centre + offset.
        let list = ActorRenderer::new().draw(size(), &t, Some(bounds), &[square(1, "vehicle", 9.0, 8.0)]);
        let at = list
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillText { at, .. } => Some(*at),
                _ => None,
            })
            .unwrap();
        assert!((at.x - 230.0).abs() < 1e-9);
        assert!((at.y - (200.0 - LABEL_GAP_PX)).abs() < 1e-9);
    }
}
