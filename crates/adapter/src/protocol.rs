//! Protocol module - JSON message types for game sessions
//!
//! Line-delimited JSON. Clients send `{"action": ..., "x"?, "y"?, "seq"?}`;
//! the server answers with `state`, `ack` and `error` messages, each carrying
//! `type`, `seq` and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::snapshot::GameSnapshot;
use crate::core::{color_of, Bomb, Shape};
use crate::types::{is_place_bomb_name, GameAction, PieceType, BOARD_HEIGHT, BOARD_WIDTH};

// ============== Client -> Server Messages ==============

/// Every action name a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    Left,
    Right,
    Down,
    Rotate,
    HardDrop,
    PlaceBomb,
    SpawnBomb,
    Pause,
    SpeedUp,
    SpeedDown,
    Start,
}

impl ActionName {
    /// Parse a wire name (case-insensitive, camelCase aliases accepted)
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("start") || s.eq_ignore_ascii_case("reset") {
            return Some(Self::Start);
        }
        if is_place_bomb_name(s) {
            return Some(Self::PlaceBomb);
        }
        GameAction::from_str(s).map(Self::from)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::Left => "left",
            ActionName::Right => "right",
            ActionName::Down => "down",
            ActionName::Rotate => "rotate",
            ActionName::HardDrop => "hard_drop",
            ActionName::PlaceBomb => "place_bomb",
            ActionName::SpawnBomb => "spawn_bomb",
            ActionName::Pause => "pause",
            ActionName::SpeedUp => "speed_up",
            ActionName::SpeedDown => "speed_down",
            ActionName::Start => "start",
        }
    }
}

impl From<GameAction> for ActionName {
    fn from(value: GameAction) -> Self {
        match value {
            GameAction::MoveLeft => Self::Left,
            GameAction::MoveRight => Self::Right,
            GameAction::SoftDrop => Self::Down,
            GameAction::Rotate => Self::Rotate,
            GameAction::HardDrop => Self::HardDrop,
            GameAction::PlaceBomb { .. } => Self::PlaceBomb,
            GameAction::SpawnBombPiece => Self::SpawnBomb,
            GameAction::TogglePause => Self::Pause,
            GameAction::SpeedUp => Self::SpeedUp,
            GameAction::SpeedDown => Self::SpeedDown,
        }
    }
}

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Self::from_str(&s).ok_or_else(|| serde::de::Error::custom("unknown action"))
    }
}

impl Serialize for ActionName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// What a client line asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRequest {
    Action(GameAction),
    /// Start a fresh game in place
    Reset,
}

/// A validated client line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRequest {
    pub seq: u64,
    pub name: ActionName,
    pub request: ClientRequest,
}

/// Why a client line was refused; becomes an `error` message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub seq: u64,
    pub code: ErrorCode,
    pub message: String,
}

impl RequestError {
    fn new(seq: u64, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            seq,
            code,
            message: message.into(),
        }
    }

    pub fn into_message(self) -> ErrorMessage {
        create_error(self.seq, self.code, &self.message)
    }
}

/// Parse one client line
///
/// Malformed JSON, unknown action names and a `place_bomb` without both
/// coordinates are reported as [`RequestError`]s and never reach the engine.
pub fn parse_request(json: &str) -> Result<ParsedRequest, RequestError> {
    #[derive(Debug, Deserialize)]
    struct RawRequest {
        action: Option<String>,
        x: Option<i64>,
        y: Option<i64>,
        seq: Option<u64>,
    }

    let raw = match serde_json::from_str::<RawRequest>(json) {
        Ok(raw) => raw,
        Err(e) => {
            let seq = extract_seq_best_effort(json).unwrap_or(0);
            return Err(RequestError::new(
                seq,
                ErrorCode::InvalidJson,
                format!("invalid message: {}", e),
            ));
        }
    };

    let seq = raw.seq.unwrap_or(0);
    let Some(action) = raw.action else {
        return Err(RequestError::new(seq, ErrorCode::InvalidAction, "missing action"));
    };
    let Some(name) = ActionName::from_str(&action) else {
        return Err(RequestError::new(
            seq,
            ErrorCode::InvalidAction,
            format!("unknown action: {}", action),
        ));
    };

    let request = match name {
        ActionName::Start => ClientRequest::Reset,
        ActionName::PlaceBomb => {
            let (Some(x), Some(y)) = (raw.x, raw.y) else {
                return Err(RequestError::new(
                    seq,
                    ErrorCode::MissingCoordinates,
                    "place_bomb requires x and y",
                ));
            };
            ClientRequest::Action(GameAction::PlaceBomb {
                x: clamp_coord(x),
                y: clamp_coord(y),
            })
        }
        _ => match GameAction::from_str(&action) {
            Some(a) => ClientRequest::Action(a),
            None => {
                return Err(RequestError::new(
                    seq,
                    ErrorCode::InvalidAction,
                    format!("unknown action: {}", action),
                ))
            }
        },
    };

    Ok(ParsedRequest { seq, name, request })
}

/// Coordinates beyond `i8` stay out of bounds after narrowing.
fn clamp_coord(v: i64) -> i8 {
    v.clamp(i8::MIN as i64, i8::MAX as i64) as i8
}

/// Pull a numeric `seq` out of a line that failed to parse as a whole.
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    #[serde(rename = "state")]
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_json")]
    InvalidJson,
    #[serde(rename = "invalid_action")]
    InvalidAction,
    #[serde(rename = "missing_coordinates")]
    MissingCoordinates,
}

/// A cell color as `[r, g, b]`; `None` serializes as `null`
pub type CellColor = Option<[u8; 3]>;

/// Full game state (sent on connect, after each applied message and each tick)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub msg_type: StateType,
    pub seq: u64,
    pub ts: u64,
    pub session_id: u64,
    pub board: Vec<Vec<CellColor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_piece: Option<CurrentPieceView>,
    pub next_piece: NextPieceView,
    pub bombs: Vec<BombView>,
    pub game_over: bool,
    pub paused: bool,
    pub clearing: bool,
    /// Rows being cleared while `clearing` is set
    pub pending_lines: u32,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub bombs_available: u32,
    pub speed_multiplier: f32,
    pub lines_cleared_this_frame: u32,
    pub effective_fall_ms: u32,
    pub high_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPieceView {
    pub x: i8,
    pub y: i8,
    /// Rotated shape, rows of 0/1
    pub shape: Vec<Vec<u8>>,
    pub color: [u8; 3],
    pub is_bomb: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPieceView {
    pub shape: Vec<Vec<u8>>,
    pub color: [u8; 3],
    pub is_bomb: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BombView {
    pub x: i8,
    pub y: i8,
    pub active: bool,
}

impl From<&Bomb> for BombView {
    fn from(value: &Bomb) -> Self {
        Self {
            x: value.x,
            y: value.y,
            active: value.active,
        }
    }
}

/// Result of one applied action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub action: ActionName,
    pub success: bool,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

// ============== Utility Functions ==============

fn shape_rows(shape: &Shape) -> Vec<Vec<u8>> {
    shape
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(u8::from).collect())
        .collect()
}

/// Build a state message from an engine snapshot
pub fn build_state(seq: u64, session_id: u64, snap: &GameSnapshot) -> StateMessage {
    let mut board = Vec::with_capacity(BOARD_HEIGHT as usize);
    for row in snap.board.iter() {
        let mut out = Vec::with_capacity(BOARD_WIDTH as usize);
        for cell in row.iter() {
            out.push(cell.map(|k| color_of(PieceType::Normal(k)).to_array()));
        }
        board.push(out);
    }

    let current_piece = snap.active.map(|a| CurrentPieceView {
        x: a.x,
        y: a.y,
        shape: shape_rows(&a.shape),
        color: a.color.to_array(),
        is_bomb: a.kind.is_bomb(),
    });

    StateMessage {
        msg_type: StateType::State,
        seq,
        ts: current_timestamp_ms(),
        session_id,
        board,
        current_piece,
        next_piece: NextPieceView {
            shape: shape_rows(&snap.next.shape),
            color: snap.next.color.to_array(),
            is_bomb: snap.next.kind.is_bomb(),
        },
        bombs: snap.bombs.iter().map(BombView::from).collect(),
        game_over: snap.game_over,
        paused: snap.paused,
        clearing: snap.clearing,
        pending_lines: snap.pending_lines,
        score: snap.score,
        level: snap.level,
        lines_cleared: snap.lines,
        bombs_available: snap.bombs_available,
        speed_multiplier: snap.speed_multiplier,
        lines_cleared_this_frame: snap.lines_cleared_this_frame,
        effective_fall_ms: snap.effective_fall_ms,
        high_score: snap.high_score,
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64, action: ActionName, success: bool) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        action,
        success,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
