use foundation::bounds::Bounds2;

use crate::model::SceneData;

/// Axis-aligned hull of every lane polygon vertex whose coordinates are both
/// finite. Malformed vertices are dropped one at a time; the lane itself is
/// kept.
///
/// A scene without any usable vertex yields [`Bounds2::EMPTY`], which callers
/// must treat as undefined (see [`Bounds2::is_valid`]).
pub fn scene_bounds(scene: &SceneData) -> Bounds2 {
    let mut bounds = Bounds2::EMPTY;
    for p in scene
        .lanes
        .iter()
        .flat_map(|lane| lane.polygon.iter())
        .filter(|p| p.is_finite())
    {
        bounds.include(p.0);
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::scene_bounds;
    use crate::model::{Lane, Point, SceneData};
    use foundation::bounds::Bounds2;
    use serde_json::json;

    fn lane(polygon: Vec<Point>) -> Lane {
        Lane {
            id: None,
            polygon,
            left_boundary: Vec::new(),
            right_boundary: Vec::new(),
            left_boundary_type: Default::default(),
            right_boundary_type: Default::default(),
        }
    }

    #[test]
    fn non_numeric_vertex_is_excluded() {
        let scene: SceneData = serde_json::from_value(json!({
            "name": "s",
            "lanes": [{"polygon": [[5, 5], ["x", 100]]}]
        }))
        .unwrap();
        assert_eq!(scene_bounds(&scene), Bounds2::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn spans_all_lanes() {
        let scene = SceneData {
            name: "s".to_string(),
            lanes: vec![
                lane(vec![Point::new(0.0, 0.0), Point::new(10.0, 2.0)]),
                lane(vec![
                    Point::new(-3.0, 7.0),
                    Point::new(f64::INFINITY, 1000.0),
                ]),
            ],
        };
        assert_eq!(scene_bounds(&scene), Bounds2::new(-3.0, 0.0, 10.0, 7.0));
    }

    #[test]
    fn scene_without_valid_vertices_is_undefined() {
        let scene = SceneData {
            name: "s".to_string(),
            lanes: vec![lane(vec![Point::new(f64::NAN, 1.0)]), lane(Vec::new())],
        };
        let b = scene_bounds(&scene);
        assert!(!b.is_valid());
        assert!(b.min_x > b.max_x);
    }

    #[test]
    fn boundaries_do_not_contribute() {
        let mut l = lane(vec![Point::new(1.0, 1.0)]);
        l.left_boundary = vec![Point::new(-50.0, -50.0)];
        let scene = SceneData {
            name: "s".to_string(),
            lanes: vec![l],
        };
        assert_eq!(scene_bounds(&scene), Bounds2::new(1.0, 1.0, 1.0, 1.0));
    }
}
