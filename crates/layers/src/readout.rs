use scene::FrameUpdate;

/// One-line frame summary:
/// `Scene <name> | Frame <n> | Game <t>s | <real time> | Actors <k>`.
/// The real-time segment is omitted when the producer did not send one.
pub fn info_text(frame: &FrameUpdate) -> String {
    let mut parts = vec![
        format!("Scene {}", frame.name),
        format!("Frame {}", frame.frame),
        format!("Game {:.2}s", frame.game_time),
    ];
    if let Some(rt) = &frame.real_time {
        parts.push(rt.to_string());
    }
    parts.push(format!("Actors {}", frame.actors.len()));
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::info_text;
    use scene::{FrameUpdate, RealTime};

    #[test]
    fn formats_all_fields() {
        let frame = FrameUpdate {
            name: "borregas_ave".to_string(),
            frame: 42,
            game_time: 1.5,
            real_time: Some(RealTime::Stamp("12:00:01".to_string())),
            ..FrameUpdate::default()
        };
        assert_eq!(
            info_text(&frame),
            "Scene borregas_ave | Frame 42 | Game 1.50s | 12:00:01 | Actors 0"
        );
    }

    #[test]
    fn missing_real_time_is_omitted() {
        let frame = FrameUpdate {
            frame: 1,
            ..FrameUpdate::default()
        };
        assert_eq!(info_text(&frame), "Scene  | Frame 1 | Game 0.00s | Actors 0");
    }
}
