use runtime::redraw::RedrawScheduler;
use tracing::debug;

use crate::model::FrameUpdate;
use crate::transform::{NavigationConfig, TransformStore};

/// State of one viewer instance.
///
/// `transform` has a single writer (input handling); the frame slot has a
/// single writer (the stream). Renderers only read.
#[derive(Debug)]
pub struct ViewerSession {
    pub transform: TransformStore,
    pub redraw: RedrawScheduler,
    latest_frame: Option<FrameUpdate>,
    superseded_frames: u64,
}

impl ViewerSession {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            transform: TransformStore::new(config),
            redraw: RedrawScheduler::new(),
            latest_frame: None,
            superseded_frames: 0,
        }
    }

    /// Stores `frame` as the latest one, discarding any frame not yet taken.
    /// Returns `true` if an unrendered frame was overwritten.
    pub fn store_frame(&mut self, frame: FrameUpdate) -> bool {
        let replaced = self.latest_frame.replace(frame);
        if let Some(old) = &replaced {
            self.superseded_frames += 1;
            debug!(frame = old.frame, "dropping unrendered frame");
        }
        replaced.is_some()
    }

    pub fn take_frame(&mut self) -> Option<FrameUpdate> {
        self.latest_frame.take()
    }

    pub fn peek_frame(&self) -> Option<&FrameUpdate> {
        self.latest_frame.as_ref()
    }

    pub fn superseded_frames(&self) -> u64 {
        self.superseded_frames
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}
