use std::collections::BTreeSet;

/// Opaque id returned by the host when a frame callback is requested.
pub type FrameHandle = i32;

/// Display-refresh callback source (`requestAnimationFrame` in a browser).
///
/// The host invokes its registered redraw callback once per granted request
/// that has not been cancelled.
pub trait FrameClock {
    /// Returns `None` when the host cannot schedule callbacks (e.g. no window).
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Deterministic clock for tests and headless hosts.
///
/// Requests are only granted handles; nothing fires until [`ManualClock::tick`].
#[derive(Debug, Default)]
pub struct ManualClock {
    next_handle: FrameHandle,
    live: BTreeSet<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests that are still due to fire.
    pub fn live_requests(&self) -> usize {
        self.live.len()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// Simulates one display refresh: drains and returns every live request.
    pub fn tick(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.live).into_iter().collect()
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_handle = self.next_handle.wrapping_add(1);
        self.requested += 1;
        self.live.insert(self.next_handle);
        Some(self.next_handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.live.remove(&handle) {
            self.cancelled += 1;
        }
    }
}
