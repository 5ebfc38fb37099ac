//! Per-frame consumers beyond the actor layer.

use layers::{SignalPanel, info_text};
use scene::FrameUpdate;

use crate::orchestrator::FrameConsumer;
use crate::viewer::Surface;

/// Traffic light panel on its own surface.
pub struct SignalLayer<S> {
    panel: SignalPanel,
    surface: S,
}

impl<S: Surface> SignalLayer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            panel: SignalPanel::new(),
            surface,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> FrameConsumer for SignalLayer<S> {
    fn on_frame(&mut self, frame: &FrameUpdate) {
        let list = self.panel.draw(self.surface.size(), &frame.traffic_lights);
        self.surface.submit(&list);
    }
}

/// Anything that can display a line of text.
pub trait TextTarget {
    fn set_text(&mut self, text: &str);
}

impl TextTarget for String {
    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

pub struct InfoReadout<T> {
    target: T,
}

impl<T: TextTarget> InfoReadout<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<T: TextTarget> FrameConsumer for InfoReadout<T> {
    fn on_frame(&mut self, frame: &FrameUpdate) {
        self.target.set_text(&info_text(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::RecordingSurface;
    use layers::SurfaceSize;
    use scene::{ActorId, TrafficLight};

    #[test]
    fn signal_layer_redraws_each_frame() {
        let mut layer = SignalLayer::new(RecordingSurface::new(SurfaceSize::new(200.0, 200.0, 1.0)));
        let frame = FrameUpdate {
            traffic_lights: vec![TrafficLight {
                id: ActorId::Text("tl_1".to_string()),
                category: "signal".to_string(),
                sub_category: "traffic_light".to_string(),
                state: "red".to_string(),
                state_time: 4.0,
            }],
            ..FrameUpdate::default()
        };
        layer.on_frame(&frame);
        layer.on_frame(&FrameUpdate::default());
        let submitted = &layer.surface().submitted;
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].texts(), vec!["tl_1 4.0s"]);
        assert!(submitted[1].texts().is_empty());
    }

    #[test]
    fn readout_replaces_text() {
        let mut readout = InfoReadout::new(String::from("stale"));
        readout.on_frame(&FrameUpdate {
            name: "m".to_string(),
            frame: 3,
            ..FrameUpdate::default()
        });
        assert_eq!(readout.target(), "Scene m | Frame 3 | Game 0.00s | Actors 0");
    }
}
