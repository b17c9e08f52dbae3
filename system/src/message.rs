use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub type ConnectionId = u16;

/// One line segment of a stroke. The server never looks inside it.
pub type Segment = Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    Stroke,
}

/// Undoable unit of drawing work. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    pub payload: Vec<Segment>,
}

impl Command {
    pub fn stroke(segments: Vec<Segment>) -> Self {
        Self {
            kind: CommandKind::Stroke,
            payload: segments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    Clear,
}

/// Out-of-band instruction that never enters the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub kind: ControlKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub cursor: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReplay {
    pub commands: Vec<Arc<Command>>,
    pub cursor: usize,
    pub total: usize,
}

/// Stroke segments as sent by a client. Accepts whatever arrives:
/// an array is taken as-is, `null` is an empty stroke and any other
/// value becomes a single segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Segments(pub Vec<Segment>);

impl From<Value> for Segments {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Segments(items),
            Value::Null => Segments(Vec::new()),
            other => Segments(vec![other]),
        }
    }
}

impl<'de> Deserialize<'de> for Segments {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Segments::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDescription {
    pub id: ConnectionId,
    /// Usually `#RRGGBB`, but clients may set anything.
    pub color: Value,
    pub name: String,
}

/// client -> server
///
/// Payloads are relayed as sent. A missing `data` reads as `null` and
/// events without payload ignore whatever `data` carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    NewStroke(Segments),
    SegmentDraw(Segment),
    Undo,
    Redo,
    Clear,
    #[serde(rename = "chat message")]
    ChatMessage(Value),
    ColorChange(Value),
    /// `{x, y}`, fields taken as-is.
    CursorMove(Value),
}

const CLIENT_EVENTS: &[&str] = &[
    "new-stroke",
    "segment-draw",
    "undo",
    "redo",
    "clear",
    "chat message",
    "color-change",
    "cursor-move",
];

#[derive(Deserialize)]
struct RawClientEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

impl<'de> Deserialize<'de> for ClientEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let RawClientEvent { event, data } = RawClientEvent::deserialize(deserializer)?;
        Ok(match event.as_str() {
            "new-stroke" => ClientEvent::NewStroke(Segments::from(data)),
            "segment-draw" => ClientEvent::SegmentDraw(data),
            "undo" => ClientEvent::Undo,
            "redo" => ClientEvent::Redo,
            "clear" => ClientEvent::Clear,
            "chat message" => ClientEvent::ChatMessage(data),
            "color-change" => ClientEvent::ColorChange(data),
            "cursor-move" => ClientEvent::CursorMove(data),
            other => return Err(D::Error::unknown_variant(other, CLIENT_EVENTS)),
        })
    }
}

/// server -> client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    InitialHistory(Vec<Arc<Command>>),
    HistoryState(HistoryState),
    HistoryReplay(HistoryReplay),
    Command(ControlCommand),
    SegmentDraw(Segment),
    UserInfo {
        id: ConnectionId,
        color: Value,
    },
    UsersUpdate(Vec<UserDescription>),
    #[serde(rename = "chat message")]
    ChatMessage(String),
    CursorUpdate {
        id: ConnectionId,
        #[serde(skip_serializing_if = "Option::is_none")]
        x: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y: Option<Value>,
    },
}

impl ServerEvent {
    pub fn clear() -> Self {
        ServerEvent::Command(ControlCommand {
            kind: ControlKind::Clear,
        })
    }
}
