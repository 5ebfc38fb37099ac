//! Scene and per-frame payloads as streamed by the simulation sandbox.
//!
//! Decoding is deliberately forgiving at the vertex level: a coordinate that is
//! missing or not a number decodes to `NaN` so downstream consumers can drop
//! that single vertex instead of rejecting the whole scene.

use std::fmt;

use foundation::math::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Role string that marks the system-under-test actor.
pub const SYSTEM_UNDER_TEST_ROLE: &str = "ego";

/// A 2D scene vertex.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint", into = "[f64; 2]")]
pub struct Point(pub Vec2);

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        p.0.into()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair(Vec<serde_json::Value>),
    Xy {
        x: serde_json::Value,
        y: serde_json::Value,
    },
    Other(serde_json::Value),
}

fn coord(v: Option<&serde_json::Value>) -> f64 {
    v.and_then(serde_json::Value::as_f64).unwrap_or(f64::NAN)
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Pair(values) => Point::new(coord(values.first()), coord(values.get(1))),
            RawPoint::Xy { x, y } => Point::new(coord(Some(&x)), coord(Some(&y))),
            RawPoint::Other(_) => Point::new(f64::NAN, f64::NAN),
        }
    }
}

/// Edge marking classification carried by each lane boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum BoundaryType {
    #[default]
    Unknown,
    DottedYellow,
    DottedWhite,
    SolidYellow,
    SolidWhite,
    DoubleYellow,
    Curb,
    Unrecognized(String),
}

impl BoundaryType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNKNOWN" | "" => BoundaryType::Unknown,
            "DOTTED_YELLOW" => BoundaryType::DottedYellow,
            "DOTTED_WHITE" => BoundaryType::DottedWhite,
            "SOLID_YELLOW" => BoundaryType::SolidYellow,
            "SOLID_WHITE" => BoundaryType::SolidWhite,
            "DOUBLE_YELLOW" => BoundaryType::DoubleYellow,
            "CURB" => BoundaryType::Curb,
            _ => BoundaryType::Unrecognized(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BoundaryType::Unknown => "UNKNOWN",
            BoundaryType::DottedYellow => "DOTTED_YELLOW",
            BoundaryType::DottedWhite => "DOTTED_WHITE",
            BoundaryType::SolidYellow => "SOLID_YELLOW",
            BoundaryType::SolidWhite => "SOLID_WHITE",
            BoundaryType::DoubleYellow => "DOUBLE_YELLOW",
            BoundaryType::Curb => "CURB",
            BoundaryType::Unrecognized(s) => s,
        }
    }
}

impl From<Option<String>> for BoundaryType {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map(BoundaryType::parse).unwrap_or_default()
    }
}

impl From<BoundaryType> for String {
    fn from(t: BoundaryType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub polygon: Vec<Point>,
    #[serde(default)]
    pub left_boundary: Vec<Point>,
    #[serde(default)]
    pub right_boundary: Vec<Point>,
    #[serde(default)]
    pub left_boundary_type: BoundaryType,
    #[serde(default)]
    pub right_boundary_type: BoundaryType,
}

/// Static road geometry of one scene. `lanes` is required: a payload without
/// it is malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    #[serde(default, alias = "map_name")]
    pub name: String,
    pub lanes: Vec<Lane>,
}

/// Actor identifiers arrive as integers or strings depending on the producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActorId {
    Int(i64),
    Text(String),
}

impl Default for ActorId {
    fn default() -> Self {
        ActorId::Text(String::new())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Int(v) => write!(f, "{v}"),
            ActorId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub id: ActorId,
    /// Dot-delimited registry key, e.g. `vehicle.lincoln.mkz`.
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "rolename", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub polygon: Option<Vec<Point>>,
    #[serde(default)]
    pub speed: f64,
}

impl Actor {
    /// First segment of the category (`vehicle` for `vehicle.lincoln.mkz`).
    pub fn type_key(&self) -> &str {
        self.category.split('.').next().unwrap_or("")
    }

    pub fn is_system_under_test(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case(SYSTEM_UNDER_TEST_ROLE))
    }

    /// Polygon usable as an area, i.e. with at least three vertices.
    pub fn drawable_polygon(&self) -> Option<&[Point]> {
        self.polygon.as_deref().filter(|p| p.len() >= 3)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    #[serde(default)]
    pub id: ActorId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub state: String,
    /// Seconds spent in the current state.
    #[serde(default)]
    pub state_time: f64,
}

/// Wall-clock stamp attached by the producer: seconds or a formatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RealTime {
    Seconds(f64),
    Stamp(String),
}

impl fmt::Display for RealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealTime::Seconds(s) => write!(f, "{s:.2}s"),
            RealTime::Stamp(s) => f.write_str(s),
        }
    }
}

/// One per-frame snapshot of dynamic actors and signals.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameUpdate {
    #[serde(default, alias = "map_name")]
    pub name: String,
    #[serde(default)]
    pub frame: u64,
    #[serde(default)]
    pub game_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_time: Option<RealTime>,
    #[serde(default, deserialize_with = "list_or_map")]
    pub actors: Vec<Actor>,
    #[serde(default, deserialize_with = "list_or_map")]
    pub traffic_lights: Vec<TrafficLight>,
}

/// Accepts `[...]`, `{"id": {...}}` or `null`, decoding element by element so
/// one malformed entry is dropped without losing the rest of the frame.
fn list_or_map<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items: Vec<Value> = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => map.into_iter().map(|(_, item)| item).collect(),
        Some(other) => {
            debug!(kind = value_kind(&other), "ignoring non-collection field");
            Vec::new()
        }
        None => Vec::new(),
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!(index, %err, "skipping malformed element");
                None
            }
        })
        .collect())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
