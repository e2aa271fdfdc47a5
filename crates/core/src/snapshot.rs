//! Snapshot module - read-only copies of the game for observers
//!
//! The engine fills a reusable [`GameSnapshot`]; the adapter turns it into a
//! wire message.

use crate::bomb::Bomb;
use crate::game_state::Piece;
use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, PieceType, Rgb, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceType,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Shape after rotation
    pub shape: Shape,
    pub color: Rgb,
}

impl From<Piece> for ActiveSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
            shape: value.shape(),
            color: value.color(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NextSnapshot {
    pub kind: PieceType,
    /// Base (spawn) shape
    pub shape: Shape,
    pub color: Rgb,
}

impl From<Piece> for NextSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape(),
            color: value.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub next: NextSnapshot,
    /// Free-standing bombs still waiting to detonate
    pub bombs: Vec<Bomb>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub bombs_available: u32,
    pub speed_multiplier: f32,
    pub paused: bool,
    pub game_over: bool,
    /// A line clear is being held back for animation
    pub clearing: bool,
    pub pending_lines: u32,
    /// One-shot count reported once after a clear delay ends
    pub lines_cleared_this_frame: u32,
    pub effective_fall_ms: u32,
    /// Filled in by the session from its high-score store
    pub high_score: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.next = Piece::spawn(PieceType::Normal(PieceKind::I)).into();
        self.bombs.clear();
        self.score = 0;
        self.level = 1;
        self.lines = 0;
        self.bombs_available = 0;
        self.speed_multiplier = 1.0;
        self.paused = false;
        self.game_over = false;
        self.clearing = false;
        self.pending_lines = 0;
        self.lines_cleared_this_frame = 0;
        self.effective_fall_ms = 0;
        self.high_score = 0;
    }

    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }

    /// Number of filled cells on the board
    pub fn filled_cells(&self) -> usize {
        self.board.iter().flatten().filter(|c| c.is_some()).count()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            next: Piece::spawn(PieceType::Normal(PieceKind::I)).into(),
            bombs: Vec::new(),
            score: 0,
            level: 1,
            lines: 0,
            bombs_available: 0,
            speed_multiplier: 1.0,
            paused: false,
            game_over: false,
            clearing: false,
            pending_lines: 0,
            lines_cleared_this_frame: 0,
            effective_fall_ms: 0,
            high_score: 0,
        };
        s.clear();
        s
    }
}
