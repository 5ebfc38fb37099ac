use foundation::math::Vec2;
use gloo_timers::callback::Timeout;
use scene::PointerButton;
use streaming::{LoadingOverlay, TextTarget};
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, MouseEvent,
    WheelEvent,
};

fn html_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
}

fn set_style(el: &HtmlElement, prop: &str, value: &str) {
    if let Err(err) = el.style().set_property(prop, value) {
        debug!(prop, error = ?err, "style update failed");
    }
}

/// Loading overlay backed by page elements; any missing element is skipped.
pub struct DomOverlay {
    root: Option<HtmlElement>,
    label: Option<Element>,
    progress: Option<HtmlElement>,
    fade: Option<Timeout>,
}

impl DomOverlay {
    pub fn find(document: &Document, root_id: &str, label_id: &str, progress_id: &str) -> Self {
        Self {
            root: html_by_id(document, root_id),
            label: document.get_element_by_id(label_id),
            progress: html_by_id(document, progress_id),
            fade: None,
        }
    }

    fn reveal(&mut self) {
        // Dropping a pending timeout cancels it.
        self.fade = None;
        if let Some(root) = &self.root {
            set_style(root, "display", "flex");
            set_style(root, "opacity", "1");
        }
    }

    fn set_label(&self, text: &str) {
        if let Some(label) = &self.label {
            label.set_text_content(Some(text));
        }
    }
}

impl LoadingOverlay for DomOverlay {
    fn show(&mut self, label: &str) {
        self.reveal();
        self.set_label(label);
    }

    fn set_progress(&mut self, fraction: f64) {
        if let Some(bar) = &self.progress {
            let pct = (fraction.clamp(0.0, 1.0) * 100.0).round();
            set_style(bar, "width", &format!("{pct}%"));
        }
    }

    fn show_error(&mut self, message: &str) {
        self.reveal();
        self.set_label(&format!("Error: {message}"));
    }

    fn hide_after(&mut self, delay_ms: u32) {
        let Some(root) = self.root.clone() else {
            return;
        };
        self.fade = Some(Timeout::new(delay_ms, move || {
            set_style(&root, "opacity", "0");
            set_style(&root, "display", "none");
        }));
    }
}

/// Text content of an optional element.
pub struct ElementText(pub Option<Element>);

impl TextTarget for ElementText {
    fn set_text(&mut self, text: &str) {
        if let Some(el) = &self.0 {
            el.set_text_content(Some(text));
        }
    }
}

/// Gesture callbacks the page forwards to the viewer.
pub trait GestureSink: 'static {
    fn wheel(cursor: Vec2, delta_y: f64);
    fn pointer_down(button: PointerButton, pos: Vec2);
    fn pointer_move(pos: Vec2);
    fn pointer_up();
    fn reset();
    fn resized();
}

/// Registered listeners; they are detached when this is dropped.
#[derive(Default)]
pub struct Listeners {
    bound: Vec<(EventTarget, String, Closure<dyn FnMut(Event)>)>,
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (target, kind, closure) in &self.bound {
            let _ = target
                .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}

impl Listeners {
    fn add(
        &mut self,
        target: &EventTarget,
        kind: &str,
        passive: Option<bool>,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        match passive {
            Some(p) => {
                let opts = AddEventListenerOptions::new();
                opts.set_passive(p);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    kind,
                    closure.as_ref().unchecked_ref(),
                    &opts,
                )?;
            }
            None => {
                target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            }
        }
        self.bound.push((target.clone(), kind.to_string(), closure));
        Ok(())
    }
}

fn offset_of(event: &Event) -> Option<Vec2> {
    let m = event.dyn_ref::<MouseEvent>()?;
    Some(Vec2::new(m.offset_x() as f64, m.offset_y() as f64))
}

/// Binds wheel, pointer, context-menu and reset gestures. Only the map canvas
/// receives pointer input; the layers above it must have pointer events
/// disabled in CSS.
pub fn bind_gestures<G: GestureSink>(
    map_canvas: &EventTarget,
    reset: Option<&EventTarget>,
) -> Result<Listeners, JsValue> {
    let mut listeners = Listeners::default();

    listeners.add(map_canvas, "wheel", Some(false), |e| {
        e.prevent_default();
        if let Some(w) = e.dyn_ref::<WheelEvent>() {
            let cursor = Vec2::new(w.offset_x() as f64, w.offset_y() as f64);
            G::wheel(cursor, w.delta_y());
        }
    })?;
    listeners.add(map_canvas, "pointerdown", None, |e| {
        if let (Some(m), Some(pos)) = (e.dyn_ref::<MouseEvent>(), offset_of(&e)) {
            G::pointer_down(PointerButton::from_dom(m.button()), pos);
        }
    })?;
    listeners.add(map_canvas, "pointermove", None, |e| {
        if let Some(pos) = offset_of(&e) {
            G::pointer_move(pos);
        }
    })?;
    for kind in ["pointerup", "pointerleave", "pointercancel"] {
        listeners.add(map_canvas, kind, None, |_| G::pointer_up())?;
    }
    listeners.add(map_canvas, "contextmenu", None, |e| e.prevent_default())?;

    if let Some(button) = reset {
        listeners.add(button, "click", None, |_| G::reset())?;
    }
    if let Some(window) = web_sys::window() {
        listeners.add(&window, "resize", None, |_| G::resized())?;
    }
    Ok(listeners)
}
