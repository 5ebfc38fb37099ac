use foundation::math::Vec2;
use scene::TrafficLight;

use crate::draw::{DrawCommand, DrawList, SurfaceSize, SurfaceState, TextAlign, TextBaseline};
use crate::symbology::{LABEL_COLOR, signal_color};

const ROW_HEIGHT_PX: f64 = 18.0;
const MARGIN_PX: f64 = 10.0;
const DOT_RADIUS_PX: f64 = 5.0;
const FONT: &str = "12px monospace";

/// Screen-space list of traffic lights: one row per light with a state dot,
/// the light id and the time spent in the current state.
#[derive(Debug, Default)]
pub struct SignalPanel {
    surface: SurfaceState,
}

impl SignalPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_text(light: &TrafficLight) -> String {
        format!("{} {:.1}s", light.id, light.state_time)
    }

    pub fn draw(&mut self, size: SurfaceSize, lights: &[TrafficLight]) -> DrawList {
        let mut out = DrawList::new();
        self.surface.begin(size, &mut out);
        if lights.is_empty() {
            return out;
        }

        out.push(DrawCommand::SetFont(FONT.to_string()));
        out.push(DrawCommand::SetTextAlign(TextAlign::Left));
        out.push(DrawCommand::SetTextBaseline(TextBaseline::Middle));
        for (i, light) in lights.iter().enumerate() {
            let y = MARGIN_PX + ROW_HEIGHT_PX * (i as f64 + 0.5);
            if y > size.height {
                break;
            }
            out.push(DrawCommand::BeginPath);
            out.push(DrawCommand::Circle {
                center: Vec2::new(MARGIN_PX + DOT_RADIUS_PX, y),
                radius: DOT_RADIUS_PX,
            });
            out.push(DrawCommand::SetFillStyle(signal_color(&light.state).to_string()));
            out.push(DrawCommand::Fill);

            out.push(DrawCommand::SetFillStyle(LABEL_COLOR.to_string()));
            out.push(DrawCommand::FillText {
                text: Self::row_text(light),
                at: Vec2::new(MARGIN_PX + DOT_RADIUS_PX * 2.0 + 6.0, y),
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::ActorId;

    fn light(id: i64, state: &str, t: f64) -> TrafficLight {
        TrafficLight {
            id: ActorId::Int(id),
            category: "signal".to_string(),
            sub_category: "traffic_light".to_string(),
            state: state.to_string(),
            state_time: t,
        }
    }

    #[test]
    fn one_row_per_light() {
        let list = SignalPanel::new().draw(
            SurfaceSize::new(300.0, 300.0, 1.0),
            &[light(3, "green", 1.3), light(4, "red", 12.0)],
        );
        assert_eq!(list.texts(), vec!["3 1.3s", "4 12.0s"]);
        assert!(list.commands.contains(&DrawCommand::SetFillStyle(signal_color("green").to_string())));
        assert!(list.commands.contains(&DrawCommand::SetFillStyle(signal_color("red").to_string())));
    }

    #[test]
    fn rows_past_the_surface_are_dropped() {
        let lights: Vec<_> = (0..20).map(|i| light(i, "off", 0.0)).collect();
        let list = SignalPanel::new().draw(SurfaceSize::new(100.0, 60.0, 1.0), &lights);
        assert_eq!(list.texts().len(), 2);
    }
}
