use tracing::trace;

use crate::clock::{FrameClock, FrameHandle};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RedrawStats {
    /// Calls to [`RedrawScheduler::schedule`].
    pub scheduled: u64,
    /// Pending requests cancelled because a newer one replaced them.
    pub coalesced: u64,
    /// Redraws actually run.
    pub executed: u64,
}

/// Coalesces redraw requests to at most one per display refresh.
///
/// Every call to [`schedule`](RedrawScheduler::schedule) cancels the pending
/// request (if any) and requests a fresh one, so a burst of input between two
/// refreshes leaves exactly one outstanding callback.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: Option<FrameHandle>,
    stats: RedrawStats,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<C: FrameClock + ?Sized>(&mut self, clock: &mut C) {
        if let Some(handle) = self.pending.take() {
            clock.cancel_frame(handle);
            self.stats.coalesced += 1;
        }
        self.pending = clock.request_frame();
        self.stats.scheduled += 1;
        trace!(handle = ?self.pending, "redraw scheduled");
    }

    /// Marks the pending request as consumed. Returns `false` when the frame
    /// callback fired without anything pending (e.g. a stale handle).
    pub fn begin_frame(&mut self) -> bool {
        if self.pending.take().is_some() {
            self.stats.executed += 1;
            true
        } else {
            false
        }
    }

    /// Withdraws the pending request, if any. Used before the owner of the
    /// frame callback is dropped.
    pub fn cancel<C: FrameClock + ?Sized>(&mut self, clock: &mut C) -> bool {
        match self.pending.take() {
            Some(handle) => {
                clock.cancel_frame(handle);
                trace!(?handle, "redraw cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn stats(&self) -> RedrawStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::RedrawScheduler;
    use crate::clock::ManualClock;

    #[test]
    fn burst_of_requests_leaves_one_outstanding() {
        let mut clock = ManualClock::new();
        let mut sched = RedrawScheduler::new();
        for _ in 0..25 {
            sched.schedule(&mut clock);
        }
        assert_eq!(clock.live_requests(), 1);
        assert_eq!(clock.requested(), 25);
        assert_eq!(clock.cancelled(), 24);
        assert_eq!(sched.stats().coalesced, 24);

        let fired = clock.tick();
        assert_eq!(fired.len(), 1);
        assert_eq!(Some(fired[0]), sched.pending_handle());
        assert!(sched.begin_frame());
        assert!(!sched.is_pending());
        assert_eq!(sched.stats().executed, 1);
    }

    #[test]
    fn frame_without_pending_request_is_a_noop() {
        let mut sched = RedrawScheduler::new();
        assert!(!sched.begin_frame());
        assert_eq!(sched.stats().executed, 0);
    }

    #[test]
    fn cancel_withdraws_the_outstanding_request() {
        let mut clock = ManualClock::new();
        let mut sched = RedrawScheduler::new();
        sched.schedule(&mut clock);
        assert!(sched.cancel(&mut clock));
        assert_eq!(clock.live_requests(), 0);
        assert!(clock.tick().is_empty());
        assert!(!sched.begin_frame());
        assert!(!sched.cancel(&mut clock));
    }

    #[test]
    fn requests_after_a_frame_start_a_new_cycle() {
        let mut clock = ManualClock::new();
        let mut sched = RedrawScheduler::new();
        sched.schedule(&mut clock);
        clock.tick();
        assert!(sched.begin_frame());

        sched.schedule(&mut clock);
        sched.schedule(&mut clock);
        assert_eq!(clock.live_requests(), 1);
        assert_eq!(sched.stats().coalesced, 1);
    }
}
