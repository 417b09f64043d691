//! Behavioral telemetry events.
//!
//! Wire format is `{"event_type": "...", "timestamp": ..., "data": {...}}`.
//! `timestamp` accepts RFC 3339 strings or epoch milliseconds (integer or
//! fractional). The `data` object is decoded according to `event_type`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Keystroke,
    MouseMove,
    MouseClick,
    Scroll,
    Focus,
    Paste,
    Device,
    QuestionAnswered,
}

impl EventType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Keystroke => "keystroke",
            Self::MouseMove => "mouse_move",
            Self::MouseClick => "mouse_click",
            Self::Scroll => "scroll",
            Self::Focus => "focus",
            Self::Paste => "paste",
            Self::Device => "device",
            Self::QuestionAnswered => "question_answered",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keystroke" => Ok(Self::Keystroke),
            "mouse_move" => Ok(Self::MouseMove),
            "mouse_click" => Ok(Self::MouseClick),
            "scroll" => Ok(Self::Scroll),
            "focus" => Ok(Self::Focus),
            "paste" => Ok(Self::Paste),
            "device" => Ok(Self::Device),
            "question_answered" => Ok(Self::QuestionAnswered),
            unknown => Err(CoreError::UnknownEventType(unknown.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    #[default]
    Down,
    Up,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_code: Option<u32>,
    #[serde(default)]
    pub action: KeyAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MousePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseClickData {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollData {
    pub delta_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusData {
    pub focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteData {
    pub length: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceData {
    #[serde(default)]
    pub webdriver: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
    #[serde(default)]
    pub touch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnsweredData {
    pub question_id: String,
    pub duration_ms: u64,
}

/// Typed event payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    Keystroke(KeystrokeData),
    MouseMove(MousePoint),
    MouseClick(MouseClickData),
    Scroll(ScrollData),
    Focus(FocusData),
    Paste(PasteData),
    Device(DeviceData),
    QuestionAnswered(QuestionAnsweredData),
}

impl EventData {
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match *self {
            Self::Keystroke(_) => EventType::Keystroke,
            Self::MouseMove(_) => EventType::MouseMove,
            Self::MouseClick(_) => EventType::MouseClick,
            Self::Scroll(_) => EventType::Scroll,
            Self::Focus(_) => EventType::Focus,
            Self::Paste(_) => EventType::Paste,
            Self::Device(_) => EventType::Device,
            Self::QuestionAnswered(_) => EventType::QuestionAnswered,
        }
    }

    /// Decode a JSON payload for the given event type.
    pub fn decode(event_type: EventType, payload: serde_json::Value) -> Result<Self, CoreError> {
        let invalid = |source| CoreError::InvalidPayload { event_type: event_type.as_str(), source };
        let payload = match payload {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        Ok(match event_type {
            EventType::Keystroke => Self::Keystroke(serde_json::from_value(payload).map_err(invalid)?),
            EventType::MouseMove => Self::MouseMove(serde_json::from_value(payload).map_err(invalid)?),
            EventType::MouseClick => {
                Self::MouseClick(serde_json::from_value(payload).map_err(invalid)?)
            },
            EventType::Scroll => Self::Scroll(serde_json::from_value(payload).map_err(invalid)?),
            EventType::Focus => Self::Focus(serde_json::from_value(payload).map_err(invalid)?),
            EventType::Paste => Self::Paste(serde_json::from_value(payload).map_err(invalid)?),
            EventType::Device => Self::Device(serde_json::from_value(payload).map_err(invalid)?),
            EventType::QuestionAnswered => {
                Self::QuestionAnswered(serde_json::from_value(payload).map_err(invalid)?)
            },
        })
    }

    /// Encode the payload as the `data` JSON object.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        let encoded = match self {
            Self::Keystroke(d) => serde_json::to_value(d),
            Self::MouseMove(d) => serde_json::to_value(d),
            Self::MouseClick(d) => serde_json::to_value(d),
            Self::Scroll(d) => serde_json::to_value(d),
            Self::Focus(d) => serde_json::to_value(d),
            Self::Paste(d) => serde_json::to_value(d),
            Self::Device(d) => serde_json::to_value(d),
            Self::QuestionAnswered(d) => serde_json::to_value(d),
        };
        encoded.unwrap_or_default()
    }
}

/// One behavioral telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireEvent", into = "WireEvent")]
pub struct BehaviorEvent {
    pub timestamp: DateTime<Utc>,
    pub data: EventData,
}

impl BehaviorEvent {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, data: EventData) -> Self {
        Self { timestamp, data }
    }

    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.data.event_type()
    }

    /// Rebuild an event from its stored columns.
    pub fn from_parts(
        event_type: &str,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<Self, CoreError> {
        let event_type: EventType = event_type.parse()?;
        Ok(Self { timestamp, data: EventData::decode(event_type, payload)? })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl WireTimestamp {
    fn resolve(self) -> Result<DateTime<Utc>, CoreError> {
        let resolved = match self {
            Self::Millis(ms) => DateTime::from_timestamp_millis(ms),
            #[allow(clippy::cast_possible_truncation, reason = "bounded by chrono range check")]
            Self::FractionalMillis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_micros((ms * 1000.0) as i64)
            },
            Self::FractionalMillis(_) => None,
            Self::Text(text) => {
                DateTime::parse_from_rfc3339(&text).ok().map(|dt| dt.with_timezone(&Utc))
            },
        };
        resolved.ok_or_else(|| CoreError::InvalidInput("invalid event timestamp".to_owned()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEvent {
    event_type: String,
    timestamp: WireTimestamp,
    #[serde(default)]
    data: serde_json::Value,
}

impl TryFrom<WireEvent> for BehaviorEvent {
    type Error = CoreError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let timestamp = wire.timestamp.resolve()?;
        Self::from_parts(&wire.event_type, timestamp, wire.data)
    }
}

impl From<BehaviorEvent> for WireEvent {
    fn from(event: BehaviorEvent) -> Self {
        Self {
            event_type: event.event_type().as_str().to_owned(),
            timestamp: WireTimestamp::Text(
                event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            data: event.data.payload(),
        }
    }
}
