use runtime::clock::{FrameClock, FrameHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

/// `requestAnimationFrame`-backed clock. One closure is reused for every
/// request.
pub struct RafClock {
    callback: Closure<dyn FnMut(f64)>,
}

impl RafClock {
    pub fn new(on_frame: impl FnMut(f64) + 'static) -> Self {
        Self {
            callback: Closure::wrap(Box::new(on_frame) as Box<dyn FnMut(f64)>),
        }
    }
}

impl FrameClock for RafClock {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        web_sys::window()?
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .ok()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}
