//! JSON message types for the puzzle adapter.
//!
//! Line-delimited JSON; every message carries `type`, `seq` (sender sequence
//! number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::core::{SessionOutcome, SessionSnapshot};
use crate::types::{PieceId, PointerEvent, PuzzleVariant, SessionEvent, MAX_GESTURE_EVENTS};

use arrayvec::ArrayVec;

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "fullkit";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[default]
    #[serde(rename = "command")]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlType {
    #[default]
    #[serde(rename = "control")]
    Control,
}

/// Client hello message (first message on a connection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub formats: FormatsList,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatsList {
    pub json: bool,
}

impl<'de> Deserialize<'de> for FormatsList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = FormatsList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of format strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut json = false;
                while let Some(v) = seq.next_element::<&str>()? {
                    if v.eq_ignore_ascii_case("json") {
                        json = true;
                    }
                }
                Ok(FormatsList { json })
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for FormatsList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(usize::from(self.json)))?;
        if self.json {
            seq.serialize_element("json")?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    pub stream_observations: bool,
    /// Whether to receive `event` messages as the session emits them.
    #[serde(default = "default_true")]
    pub stream_events: bool,
    #[serde(default)]
    pub command_mode: CommandMode,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Command message (controller only).
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub mode: CommandMode,
    /// For `pointer` mode.
    #[serde(default)]
    pub events: Option<PointerList>,
    /// For `place` mode.
    #[serde(default)]
    pub place: Option<PlaceCommand>,
    /// For `restart` mode; keeps the current picture when absent.
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandMode {
    #[default]
    Pointer,
    Place,
    Restart,
}

impl CommandMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandMode::Pointer => "pointer",
            CommandMode::Place => "place",
            CommandMode::Restart => "restart",
        }
    }
}

impl<'de> Deserialize<'de> for CommandMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("pointer") {
            Ok(Self::Pointer)
        } else if s.eq_ignore_ascii_case("place") {
            Ok(Self::Place)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else {
            Err(serde::de::Error::custom("invalid command mode"))
        }
    }
}

impl Serialize for CommandMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Wire form of a single pointer event: `{"kind":"down","x":..,"y":..}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WirePointer {
    kind: PointerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PointerKind {
    Down,
    Move,
    Up,
}

impl WirePointer {
    fn into_event(self) -> Option<PointerEvent> {
        match (self.kind, self.x, self.y) {
            (PointerKind::Down, Some(x), Some(y)) => Some(PointerEvent::Down { x, y }),
            (PointerKind::Move, Some(x), Some(y)) => Some(PointerEvent::Move { x, y }),
            (PointerKind::Up, _, _) => Some(PointerEvent::Up),
            _ => None,
        }
    }
}

impl From<PointerEvent> for WirePointer {
    fn from(value: PointerEvent) -> Self {
        match value {
            PointerEvent::Down { x, y } => Self {
                kind: PointerKind::Down,
                x: Some(x),
                y: Some(y),
            },
            PointerEvent::Move { x, y } => Self {
                kind: PointerKind::Move,
                x: Some(x),
                y: Some(y),
            },
            PointerEvent::Up => Self {
                kind: PointerKind::Up,
                x: None,
                y: None,
            },
        }
    }
}

/// Pointer gesture carried by a `pointer` command, bounded at
/// [`MAX_GESTURE_EVENTS`].
#[derive(Debug, Clone, PartialEq)]
pub struct PointerList(pub ArrayVec<PointerEvent, MAX_GESTURE_EVENTS>);

impl<'de> Deserialize<'de> for PointerList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = PointerList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of pointer events")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<PointerEvent, MAX_GESTURE_EVENTS>::new();
                while let Some(wire) = seq.next_element::<WirePointer>()? {
                    let ev = wire
                        .into_event()
                        .ok_or_else(|| serde::de::Error::custom("down/move need x and y"))?;
                    out.try_push(ev)
                        .map_err(|_| serde::de::Error::custom("too many pointer events"))?;
                }
                Ok(PointerList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for PointerList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for ev in &self.0 {
            seq.serialize_element(&WirePointer::from(*ev))?;
        }
        seq.end()
    }
}

/// Target of a `place` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceCommand {
    pub row: u16,
    pub col: u16,
}

impl From<PlaceCommand> for PieceId {
    fn from(value: PlaceCommand) -> Self {
        PieceId::new(value.row, value.col)
    }
}

/// Control message (claim/release controller status).
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

impl Serialize for ControlAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ControlAction::Claim => serializer.serialize_str("claim"),
            ControlAction::Release => serializer.serialize_str("release"),
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    InvalidPlace,
    SessionOver,
    Backpressure,
}

/// Welcome message (response to hello).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: [CapabilityFormat; 1],
    pub command_modes: [CommandMode; 3],
    pub max_gesture_events: usize,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFormat {
    #[serde(rename = "json")]
    Json,
}

/// Acknowledgment, sent once a command has been applied to the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Full session state (sent to streaming clients whenever it changes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub ended: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub variant: String,
    pub grid: GridSnapshot,
    pub frame: FrameSnapshot,
    /// Staging order: later pieces are picked first where they overlap.
    pub pieces: Vec<PieceObservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragging: Option<PlaceCommand>,
    pub moves: u32,
    pub duration: u32,
    pub time_remaining: u32,
    pub batch: BatchSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeSnapshot>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: u16,
    pub cols: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceObservation {
    pub row: u16,
    pub col: u16,
    pub x: f32,
    pub y: f32,
    pub correct_x: f32,
    pub correct_y: f32,
    pub width: f32,
    pub height: f32,
    pub available: bool,
    pub placed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub interval: u32,
    pub remaining: u32,
    pub released: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSnapshot {
    pub completed: bool,
    pub moves: u32,
    pub time_remaining: u32,
    pub efficiency: i32,
    pub verdict: String,
}

impl From<SessionOutcome> for OutcomeSnapshot {
    fn from(value: SessionOutcome) -> Self {
        Self {
            completed: value.completed,
            moves: value.moves,
            time_remaining: value.time_remaining,
            efficiency: value.efficiency,
            verdict: value.verdict.as_str().to_string(),
        }
    }
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

/// One session notification. Fields not relevant to `event` are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<PlaceCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u32>,
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown type is reported to the client, not treated as malformed JSON.
            #[derive(Debug, Deserialize)]
            struct Header<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type {
                Some("hello" | "command" | "control") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Parsed incoming message.
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Best-effort `seq` for error replies to lines that failed to parse.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        formats: FormatsList { json: true },
        requested: RequestedCapabilities {
            stream_observations: true,
            stream_events: true,
            command_mode: CommandMode::Pointer,
        },
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        capabilities: ServerCapabilities {
            formats: [CapabilityFormat::Json],
            command_modes: [CommandMode::Pointer, CommandMode::Place, CommandMode::Restart],
            max_gesture_events: MAX_GESTURE_EVENTS,
            variants: PuzzleVariant::ALL
                .iter()
                .map(|v| v.as_str().to_string())
                .collect(),
        },
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Wrap a session notification for the wire.
pub fn create_event(seq: u64, event: &SessionEvent) -> EventMessage {
    let mut msg = EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event: event.name().to_string(),
        batch: None,
        released: None,
        piece: None,
        completed: None,
        moves: None,
        time_remaining: None,
    };
    match *event {
        SessionEvent::BatchArrived { batch, released } => {
            msg.batch = Some(batch);
            msg.released = Some(released);
        }
        SessionEvent::PieceSnapped { piece } => {
            msg.piece = Some(PlaceCommand {
                row: piece.row,
                col: piece.col,
            });
        }
        SessionEvent::SessionEnded {
            completed,
            moves,
            time_remaining,
        } => {
            msg.completed = Some(completed);
            msg.moves = Some(moves);
            msg.time_remaining = Some(time_remaining);
        }
    }
    msg
}

/// Build an observation from a session snapshot.
pub fn build_observation(snap: &SessionSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        ended: snap.ended,
        episode_id: snap.episode_id,
        seed: snap.seed,
        variant: snap.variant.as_str().to_string(),
        grid: GridSnapshot {
            rows: snap.rows,
            cols: snap.cols,
        },
        frame: FrameSnapshot {
            width: snap.frame_width,
            height: snap.frame_height,
        },
        pieces: snap
            .pieces
            .iter()
            .map(|p| PieceObservation {
                row: p.id.row,
                col: p.id.col,
                x: p.x,
                y: p.y,
                correct_x: p.correct_x,
                correct_y: p.correct_y,
                width: p.width,
                height: p.height,
                available: p.available,
                placed: p.placed,
            })
            .collect(),
        dragging: snap.dragging.map(|id| PlaceCommand {
            row: id.row,
            col: id.col,
        }),
        moves: snap.moves,
        duration: snap.duration,
        time_remaining: snap.time_remaining,
        batch: BatchSnapshot {
            interval: snap.batch_interval,
            remaining: snap.batch_remaining,
            released: snap.batches_released,
            count: snap.batch_count,
        },
        outcome: snap.outcome.map(OutcomeSnapshot::from),
        state_hash: state_hash(snap),
    }
}

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output may change between Rust releases; observers compare
/// hashes across runs, so this one must not.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

pub fn state_hash(snap: &SessionSnapshot) -> StateHash {
    use std::hash::{Hash, Hasher};
    let mut hasher = Fnv1aHasher::new();
    snap.hash_into(&mut hasher);
    snap.seed.hash(&mut hasher);
    StateHash(hasher.finish())
}

pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
