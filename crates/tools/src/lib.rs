//! Offline helpers behind the `sandbox-view` binary: scene inspection and
//! headless replay of recorded event logs.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::rc::Rc;

use catalog::{MapCache, ScalarSlot, SceneStore};
use layers::{SurfaceSize, symbology::boundary_style};
use runtime::clock::ManualClock;
use scene::{SceneData, scene_bounds};
use serde::{Deserialize, Serialize};
use streaming::{
    LoadingOverlay, RecordingSurface, StreamOrchestrator, TaskQueue, Viewer, ViewerConfig,
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub name: String,
    pub lanes: usize,
    pub finite_vertices: usize,
    pub dropped_vertices: usize,
    /// `[min_x, min_y, max_x, max_y]`, absent when no vertex is finite.
    pub bounds: Option<[f64; 4]>,
    pub boundary_types: BTreeMap<String, usize>,
    /// Boundaries the map layer would actually draw.
    pub drawn_boundaries: usize,
}

pub fn summarize(scene: &SceneData) -> SceneSummary {
    let mut finite_vertices = 0;
    let mut dropped_vertices = 0;
    let mut boundary_types = BTreeMap::new();
    let mut drawn_boundaries = 0;
    for lane in &scene.lanes {
        for p in &lane.polygon {
            if p.is_finite() {
                finite_vertices += 1;
            } else {
                dropped_vertices += 1;
            }
        }
        for kind in [&lane.left_boundary_type, &lane.right_boundary_type] {
            *boundary_types.entry(kind.to_string()).or_insert(0) += 1;
            if boundary_style(kind).is_some() {
                drawn_boundaries += 1;
            }
        }
    }
    let b = scene_bounds(scene);
    SceneSummary {
        name: scene.name.clone(),
        lanes: scene.lanes.len(),
        finite_vertices,
        dropped_vertices,
        bounds: b.is_valid().then_some([b.min_x, b.min_y, b.max_x, b.max_y]),
        boundary_types,
        drawn_boundaries,
    }
}

pub fn parse_scene(json: &str) -> Result<SceneData, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid scene payload: {e}"))
}

/// One line of a recorded event log.
#[derive(Debug, Deserialize)]
pub struct LoggedEvent {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub skipped: usize,
    pub map_draws: usize,
    pub actor_draws: usize,
    pub last_scene: Option<String>,
    pub last_frame: Option<u64>,
}

struct LogOverlay;

impl LoadingOverlay for LogOverlay {
    fn show(&mut self, label: &str) {
        info!(label, "overlay shown");
    }

    fn set_progress(&mut self, fraction: f64) {
        debug!(fraction, "overlay progress");
    }

    fn show_error(&mut self, message: &str) {
        info!(message, "overlay error");
    }

    fn hide_after(&mut self, delay_ms: u32) {
        debug!(delay_ms, "overlay fade");
    }
}

/// Feeds a JSON-lines event log through a headless viewer. Blank lines are
/// ignored; lines that do not parse count as skipped.
pub fn replay<R, St, L>(reader: R, cache: MapCache<St, L>) -> Result<ReplaySummary, String>
where
    R: BufRead,
    St: SceneStore + 'static,
    L: ScalarSlot + 'static,
{
    let config = ViewerConfig::default();
    let size = SurfaceSize::new(1280.0, 720.0, 1.0);
    let viewer = Viewer::new(
        &config,
        RecordingSurface::new(size),
        RecordingSurface::new(size),
        ManualClock::new(),
    );
    let tasks = Rc::new(TaskQueue::new());
    let mut orch = StreamOrchestrator::new(
        config,
        viewer,
        Rc::new(cache),
        Box::new(Rc::clone(&tasks)),
        Box::new(LogOverlay),
    );

    if let Some(scene) = pollster::block_on(orch.restore_task()) {
        orch.show_restored(scene);
    }

    let mut summary = ReplaySummary::default();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("read line {}: {e}", lineno + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        summary.events += 1;
        let logged: LoggedEvent = match serde_json::from_str(&line) {
            Ok(ev) => ev,
            Err(e) => {
                debug!(line = lineno + 1, error = %e, "unparseable log line");
                summary.skipped += 1;
                continue;
            }
        };
        match streaming::decode_value(&logged.event, logged.payload) {
            Ok(ev) => {
                if let streaming::InboundEvent::Frame(f) = &ev {
                    summary.last_frame = Some(f.frame);
                }
                orch.handle(ev);
            }
            Err(e) => {
                debug!(line = lineno + 1, error = %e, "skipped event");
                summary.skipped += 1;
            }
        }
        tasks.run_all();
        let viewer = orch.viewer_mut();
        for _ in viewer.clock_mut().tick() {
            viewer.on_animation_frame();
        }
    }

    let viewer = orch.viewer();
    summary.map_draws = viewer.map_surface().submitted.len();
    summary.actor_draws = viewer.actor_surface().submitted.len();
    summary.last_scene = viewer.scene().map(|s| s.name.clone());
    Ok(summary)
}
