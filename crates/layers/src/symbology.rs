//! Fixed colour and stroke tables for the map, actor and signal layers.
//!
//! Widths and dash lengths are in scene units (metres); they scale with zoom.

use scene::{Actor, BoundaryType};

pub const LANE_SURFACE: &str = "#3b4148";
pub const LANE_OUTLINE_WIDTH: f64 = 0.05;

pub const MARKING_YELLOW: &str = "#f2c230";
pub const MARKING_WHITE: &str = "#f4f4f4";
pub const MARKING_WIDTH: f64 = 0.15;
pub const DASH_PATTERN: [f64; 2] = [1.5, 1.5];

pub const ACTOR_OUTLINE: &str = "#101010";
pub const ACTOR_OUTLINE_WIDTH: f64 = 0.08;
pub const SYSTEM_UNDER_TEST_FILL: &str = "#e0245e";
pub const DEFAULT_ACTOR_FILL: &str = "#9e9e9e";

pub const LABEL_FONT: &str = "11px sans-serif";
pub const LABEL_COLOR: &str = "#ffffff";
/// Vertical distance in CSS pixels between the label anchor and each label.
pub const LABEL_GAP_PX: f64 = 7.0;

/// Fill colour per category type key (first dot-delimited segment).
pub const ACTOR_FILLS: &[(&str, &str)] = &[
    ("vehicle", "#1f77b4"),
    ("walker", "#ff9f1c"),
    ("static", "#8c6d4f"),
    ("signal", "#2ca02c"),
];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkingColor {
    Yellow,
    White,
}

impl MarkingColor {
    pub fn css(self) -> &'static str {
        match self {
            MarkingColor::Yellow => MARKING_YELLOW,
            MarkingColor::White => MARKING_WHITE,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StrokePattern {
    Solid,
    Dashed,
    /// Two parallel solid lines.
    Double,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundaryStyle {
    pub color: MarkingColor,
    pub pattern: StrokePattern,
}

/// Style for a boundary, or `None` when the type is not a yellow or white
/// marking and must not be drawn.
pub fn boundary_style(kind: &BoundaryType) -> Option<BoundaryStyle> {
    let (color, pattern) = match kind {
        BoundaryType::DottedYellow => (MarkingColor::Yellow, StrokePattern::Dashed),
        BoundaryType::DottedWhite => (MarkingColor::White, StrokePattern::Dashed),
        BoundaryType::SolidYellow => (MarkingColor::Yellow, StrokePattern::Solid),
        BoundaryType::SolidWhite => (MarkingColor::White, StrokePattern::Solid),
        BoundaryType::DoubleYellow => (MarkingColor::Yellow, StrokePattern::Double),
        BoundaryType::Unknown | BoundaryType::Curb | BoundaryType::Unrecognized(_) => {
            return None;
        }
    };
    Some(BoundaryStyle { color, pattern })
}

/// System-under-test colour first, then the category table, then the neutral
/// default.
pub fn actor_fill(actor: &Actor) -> &'static str {
    if actor.is_system_under_test() {
        return SYSTEM_UNDER_TEST_FILL;
    }
    let key = actor.type_key();
    ACTOR_FILLS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, c)| *c)
        .unwrap_or(DEFAULT_ACTOR_FILL)
}

/// Dot colour for a traffic light state (`green`, `yellow`, `red`; grey
/// otherwise).
pub fn signal_color(state: &str) -> &'static str {
    match state.trim().to_ascii_lowercase().as_str() {
        "green" => "#2ecc40",
        "yellow" => "#ffdc00",
        "red" => "#ff4136",
        _ => "#888888",
    }
}
