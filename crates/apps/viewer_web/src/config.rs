use serde::{Deserialize, Serialize};
use streaming::ViewerConfig;

/// Host page wiring plus the viewer settings.
///
/// Passed to `init_viewer` as JSON; missing keys take their defaults and an
/// empty string means "all defaults".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub viewer: ViewerConfig,
    pub map_canvas_id: String,
    pub actor_canvas_id: String,
    pub signal_canvas_id: String,
    /// Optional; no reset control when the element is missing.
    pub reset_button_id: String,
    pub overlay_id: String,
    pub overlay_label_id: String,
    pub progress_id: String,
    pub info_id: String,
    pub idb_database: String,
    pub idb_store: String,
    pub last_scene_key: String,
    /// `tracing` filter directive, e.g. `info` or `streaming=debug`.
    pub log_filter: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            viewer: ViewerConfig::default(),
            map_canvas_id: "map-canvas".to_string(),
            actor_canvas_id: "actor-canvas".to_string(),
            signal_canvas_id: "signal-canvas".to_string(),
            reset_button_id: "reset-view".to_string(),
            overlay_id: "loading-overlay".to_string(),
            overlay_label_id: "loading-label".to_string(),
            progress_id: "loading-progress".to_string(),
            info_id: "info-readout".to_string(),
            idb_database: "sandbox-map-cache".to_string(),
            idb_store: "maps".to_string(),
            last_scene_key: "sandbox.lastMap".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl WebConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::WebConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_string_means_defaults() {
        assert_eq!(WebConfig::from_json("  ").unwrap(), WebConfig::default());
    }

    #[test]
    fn overrides_merge_with_defaults() {
        let cfg = WebConfig::from_json(
            r#"{"map_canvas_id":"roads","viewer":{"fallback_scene":"san_mateo"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.map_canvas_id, "roads");
        assert_eq!(cfg.actor_canvas_id, "actor-canvas");
        assert_eq!(cfg.viewer.fallback_scene, "san_mateo");
        assert_eq!(cfg.viewer.overlay_fade_ms, 500);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(WebConfig::from_json("{").is_err());
    }
}
