use std::cell::RefCell;
use std::rc::Rc;

use catalog::{IndexedDbSceneStore, LocalStorageSlot, MapCache};
use console_error_panic_hook::set_once;
use foundation::math::Vec2;
use gloo_net::http::Request;
use scene::PointerButton;
use streaming::{
    INIT_MAP, InboundEvent, InfoReadout, LocalTask, SignalLayer, Spawner, StreamOrchestrator,
    Viewer, decode,
};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventTarget, HtmlCanvasElement};

use crate::canvas::CanvasSurface;
use crate::clock::RafClock;
use crate::config::WebConfig;
use crate::dom::{DomOverlay, ElementText, GestureSink, Listeners, bind_gestures};
use crate::logging;

type WebCache = MapCache<IndexedDbSceneStore, LocalStorageSlot>;
type WebOrchestrator =
    StreamOrchestrator<CanvasSurface, RafClock, IndexedDbSceneStore, LocalStorageSlot>;

struct WebState {
    orchestrator: WebOrchestrator,
    /// Map, actor and signal canvases, for CSS resizing.
    canvases: [HtmlCanvasElement; 3],
    _listeners: Listeners,
}

thread_local! {
    static STATE: RefCell<Option<WebState>> = const { RefCell::new(None) };
}

/// Runs `f` against the viewer if it is initialized and not already borrowed.
fn with_state<R>(f: impl FnOnce(&mut WebState) -> R) -> Option<R> {
    STATE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

struct LocalSpawner;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: LocalTask) {
        spawn_local(task);
    }
}

struct PageGestures;

impl GestureSink for PageGestures {
    fn wheel(cursor: Vec2, delta_y: f64) {
        with_state(|s| s.orchestrator.viewer_mut().wheel(cursor, delta_y));
    }

    fn pointer_down(button: PointerButton, pos: Vec2) {
        with_state(|s| s.orchestrator.viewer_mut().pointer_down(button, pos));
    }

    fn pointer_move(pos: Vec2) {
        with_state(|s| s.orchestrator.viewer_mut().pointer_move(pos));
    }

    fn pointer_up() {
        with_state(|s| s.orchestrator.viewer_mut().pointer_up());
    }

    fn reset() {
        with_state(|s| s.orchestrator.viewer_mut().reset_view());
    }

    fn resized() {
        with_state(|s| {
            let viewer = s.orchestrator.viewer_mut();
            let canvas = viewer.map_surface().canvas();
            let (w, h) = (canvas.client_width() as f64, canvas.client_height() as f64);
            viewer.resize(w, h);
        });
    }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Builds the viewer from the page and starts restoring the last scene.
/// `config_json` may be empty for defaults.
#[wasm_bindgen]
pub fn init_viewer(config_json: &str) -> Result<(), JsValue> {
    let config = WebConfig::from_json(config_json).map_err(js_err)?;
    logging::init(&config.log_filter);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let map = CanvasSurface::from_id(&document, &config.map_canvas_id)?;
    let actors = CanvasSurface::from_id(&document, &config.actor_canvas_id)?;
    let signals = CanvasSurface::from_id(&document, &config.signal_canvas_id)?;
    let canvases = [
        map.canvas().clone(),
        actors.canvas().clone(),
        signals.canvas().clone(),
    ];
    let reset = document.get_element_by_id(&config.reset_button_id);
    let reset_target: Option<&EventTarget> = reset.as_ref().map(|e| e.as_ref());
    let listeners = bind_gestures::<PageGestures>(map.canvas(), reset_target)?;

    let clock = RafClock::new(|_ts| {
        with_state(|s| s.orchestrator.viewer_mut().on_animation_frame());
    });
    let viewer = Viewer::new(&config.viewer, map, actors, clock);
    let cache: WebCache = MapCache::new(
        IndexedDbSceneStore::new(&config.idb_database, &config.idb_store),
        LocalStorageSlot::new(&config.last_scene_key),
    );
    let overlay = DomOverlay::find(
        &document,
        &config.overlay_id,
        &config.overlay_label_id,
        &config.progress_id,
    );

    let mut orchestrator = StreamOrchestrator::new(
        config.viewer.clone(),
        viewer,
        Rc::new(cache),
        Box::new(LocalSpawner),
        Box::new(overlay),
    );
    orchestrator.add_consumer(Box::new(SignalLayer::new(signals)));
    orchestrator.add_consumer(Box::new(InfoReadout::new(ElementText(
        document.get_element_by_id(&config.info_id),
    ))));

    let restore = orchestrator.restore_task();
    with_state(|s| s.orchestrator.viewer_mut().shutdown());
    let replaced = STATE.with(|cell| {
        cell.borrow_mut().replace(WebState {
            orchestrator,
            canvases,
            _listeners: listeners,
        })
    });
    if replaced.is_some() {
        warn!("viewer re-initialized; previous instance dropped");
    }
    info!("viewer initialized");

    spawn_local(async move {
        if let Some(scene) = restore.await {
            with_state(|s| s.orchestrator.show_restored(scene));
        }
    });
    Ok(())
}

/// Dispatches one live-channel event. Returns `false` when the event was
/// unknown, malformed or the viewer is not initialized; details are logged.
#[wasm_bindgen]
pub fn handle_event(name: &str, payload_json: &str) -> bool {
    with_state(|s| s.orchestrator.handle_raw(name, payload_json).is_ok()).unwrap_or(false)
}

/// Fetches a scene JSON document and shows it as if it had arrived live.
#[wasm_bindgen]
pub fn load_scene_url(url: String) {
    spawn_local(async move {
        let event = match fetch_text(&url).await {
            Ok(text) => match decode(INIT_MAP, &text) {
                Ok(ev) => ev,
                Err(err) => InboundEvent::LoadingFailed {
                    message: err.to_string(),
                },
            },
            Err(err) => InboundEvent::LoadingFailed {
                message: format!("fetch {url}: {err}"),
            },
        };
        with_state(|s| s.orchestrator.handle(event));
    });
}

async fn fetch_text(url: &str) -> Result<String, gloo_net::Error> {
    Request::get(url).send().await?.text().await
}

#[wasm_bindgen]
pub async fn clear_map_cache() -> Result<(), JsValue> {
    let cache = with_state(|s| Rc::clone(s.orchestrator.cache()))
        .ok_or_else(|| JsValue::from_str("viewer not initialized"))?;
    cache.clear().await.map_err(js_err)
}

/// Resizes all three canvases to `width x height` CSS pixels, re-clamps the
/// pan and schedules a map redraw.
#[wasm_bindgen]
pub fn set_viewport_size(width: f64, height: f64) {
    with_state(|s| {
        for canvas in &s.canvases {
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{width}px"));
            let _ = style.set_property("height", &format!("{height}px"));
        }
        s.orchestrator.viewer_mut().resize(width, height);
    });
}

#[wasm_bindgen]
pub fn reset_view() {
    PageGestures::reset();
}

#[wasm_bindgen]
pub fn connection_lost(reason: &str) {
    with_state(|s| s.orchestrator.connection_lost(reason));
}

#[wasm_bindgen]
pub fn connection_restored() {
    with_state(|s| s.orchestrator.connection_restored());
}
