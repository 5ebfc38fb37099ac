use scene::NavigationConfig;
use serde::{Deserialize, Serialize};

/// Loading overlay progress fractions.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSteps {
    pub start: f64,
    pub mid: f64,
    pub high: f64,
}

impl Default for ProgressSteps {
    fn default() -> Self {
        Self {
            start: 0.1,
            mid: 0.5,
            high: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub navigation: NavigationConfig,
    /// Scene restored on startup when no last-scene name was persisted.
    pub fallback_scene: String,
    /// Delay before the overlay fades after a successful load.
    pub overlay_fade_ms: u32,
    /// How long a loading error stays visible.
    pub error_fade_ms: u32,
    pub progress: ProgressSteps,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            navigation: NavigationConfig::default(),
            fallback_scene: "borregas_ave".to_string(),
            overlay_fade_ms: 500,
            error_fade_ms: 2000,
            progress: ProgressSteps::default(),
        }
    }
}
