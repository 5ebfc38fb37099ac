//! Inbound event protocol.
//!
//! The simulation pushes named events with JSON payloads over a live channel:
//! - `map_loading_start` `{"map_name": ...}`
//! - `init_map` scene payload `{"name"|"map_name", "lanes": [...]}`
//! - `map_loading_done` `{"map_name": ...}`
//! - `map_loading_error` `{"error": ...}`
//! - `traffic_update` per-frame payload
//!
//! Decoding is the only place event names are interpreted; everything past it
//! works on [`InboundEvent`].

use scene::{FrameUpdate, SceneData};
use serde::Deserialize;

pub const MAP_LOADING_START: &str = "map_loading_start";
pub const INIT_MAP: &str = "init_map";
pub const MAP_LOADING_DONE: &str = "map_loading_done";
pub const MAP_LOADING_ERROR: &str = "map_loading_error";
pub const TRAFFIC_UPDATE: &str = "traffic_update";

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    LoadingStarted { name: String },
    Scene(SceneData),
    LoadingDone { name: String },
    LoadingFailed { message: String },
    Frame(FrameUpdate),
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::LoadingStarted { .. } => MAP_LOADING_START,
            InboundEvent::Scene(_) => INIT_MAP,
            InboundEvent::LoadingDone { .. } => MAP_LOADING_DONE,
            InboundEvent::LoadingFailed { .. } => MAP_LOADING_ERROR,
            InboundEvent::Frame(_) => TRAFFIC_UPDATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownEvent(String),
    Malformed { event: String, message: String },
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::UnknownEvent(name) => write!(f, "unknown event: {name}"),
            ProtocolError::Malformed { event, message } => {
                write!(f, "malformed {event} payload: {message}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

#[derive(Debug, Default, Deserialize)]
struct NamePayload {
    #[serde(default, alias = "name")]
    map_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default, alias = "message")]
    error: String,
}

fn malformed(event: &str, e: impl std::fmt::Display) -> ProtocolError {
    ProtocolError::Malformed {
        event: event.to_string(),
        message: e.to_string(),
    }
}

/// Decodes one named event from its JSON text payload.
pub fn decode(event: &str, payload: &str) -> Result<InboundEvent, ProtocolError> {
    let value: serde_json::Value = if payload.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(payload).map_err(|e| malformed(event, e))?
    };
    decode_value(event, value)
}

pub fn decode_value(event: &str, value: serde_json::Value) -> Result<InboundEvent, ProtocolError> {
    // Status events tolerate a bare string or a missing payload.
    let text = match &value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => Some(String::new()),
        _ => None,
    };
    match event {
        MAP_LOADING_START | MAP_LOADING_DONE => {
            let name = match text {
                Some(name) => name,
                None => {
                    serde_json::from_value::<NamePayload>(value)
                        .map_err(|e| malformed(event, e))?
                        .map_name
                }
            };
            Ok(if event == MAP_LOADING_START {
                InboundEvent::LoadingStarted { name }
            } else {
                InboundEvent::LoadingDone { name }
            })
        }
        MAP_LOADING_ERROR => {
            let message = match text {
                Some(message) => message,
                None => {
                    serde_json::from_value::<ErrorPayload>(value)
                        .map_err(|e| malformed(event, e))?
                        .error
                }
            };
            Ok(InboundEvent::LoadingFailed { message })
        }
        INIT_MAP => serde_json::from_value(value)
            .map(InboundEvent::Scene)
            .map_err(|e| malformed(event, e)),
        TRAFFIC_UPDATE => serde_json::from_value(value)
            .map(InboundEvent::Frame)
            .map_err(|e| malformed(event, e)),
        other => Err(ProtocolError::UnknownEvent(other.to_string())),
    }
}
