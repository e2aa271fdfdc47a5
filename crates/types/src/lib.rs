//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine and the
//! session transport. All types are pure data with no external dependencies.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: (4, 0), rotation index 0
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `LOCK_DELAY_MS` | 200 | Grace period before a grounded piece is placed |
//! | `FAST_LOCK_DELAY_MS` | 50 | Lock delay after a blocked soft drop while locking |
//! | `LINE_CLEAR_DELAY_MS` | 250 | Next piece is withheld this long after a clear |
//! | `BASE_FALL_MS` | 375 | Gravity interval at level 1 |
//! | `FALL_STEP_MS` | 37 | Gravity speed-up per level |
//! | `MIN_FALL_MS` | 50 | Floor for every fall interval |
//!
//! # Examples
//!
//! ```
//! use bomb_tetris_types::{GameAction, PieceKind, PieceType, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceType::Normal(PieceKind::T);
//! assert!(!piece.is_bomb());
//! assert!(PieceType::Bomb.is_bomb());
//!
//! assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
//! assert_eq!(Rotation::from_index(6), Rotation::South);
//!
//! assert_eq!(GameAction::from_str("hard_drop"), Some(GameAction::HardDrop));
//! assert_eq!(GameAction::from_str("place_bomb"), None); // needs coordinates
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Spawn column for the top-left corner of a new piece's bounding box.
pub const SPAWN_X: i8 = (BOARD_WIDTH / 2) as i8 - 1;

/// Spawn row for a new piece.
pub const SPAWN_Y: i8 = 0;

/// Lock delay when the active piece cannot fall any further.
pub const LOCK_DELAY_MS: u64 = 200;

/// Lock delay once a soft drop bottoms out while the piece is already locking.
pub const FAST_LOCK_DELAY_MS: u64 = 50;

/// How long the next piece is withheld after a line clear.
pub const LINE_CLEAR_DELAY_MS: u64 = 250;

/// Gravity interval at level 1.
pub const BASE_FALL_MS: u32 = 375;

/// Gravity interval reduction per level above 1.
pub const FALL_STEP_MS: u32 = 37;

/// Lower bound for both the level-driven and the effective fall interval.
pub const MIN_FALL_MS: u32 = 50;

/// Rows descended by a single soft drop action.
pub const SOFT_DROP_ROWS: u8 = 3;

/// Blast radius of every bomb (a 7x7 square).
pub const BOMB_RADIUS: i8 = 3;

/// Cumulative lines needed per bomb granted (and per level).
pub const BOMB_LINES_REQUIRED: u32 = 10;

/// Points per cleared line, multiplied by the level.
pub const LINE_SCORE_BASE: u32 = 100;

/// Speed multiplier granularity. The multiplier is stored as a count of steps.
pub const SPEED_STEP: f32 = 0.25;

/// Slowest multiplier, in steps (0.25).
pub const SPEED_MIN_STEPS: u8 = 1;

/// Fastest multiplier, in steps (3.0).
pub const SPEED_MAX_STEPS: u8 = 12;

/// Initial multiplier, in steps (1.0).
pub const SPEED_DEFAULT_STEPS: u8 = 4;


/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const CYAN: Rgb = Rgb(0, 255, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const PURPLE: Rgb = Rgb(128, 0, 128);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BOMB_RED: Rgb = Rgb(255, 50, 50);

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// The seven tetromino piece kinds, in catalog order
///
/// - **I**: Cyan, horizontal bar
/// - **O**: Yellow, 2x2 square
/// - **T**: Purple, T-shaped
/// - **L**: Orange
/// - **J**: Blue
/// - **S**: Green
/// - **Z**: Red
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// Every kind, in catalog order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Catalog index (0..7)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Kind for a catalog index; wraps modulo 7.
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }
}

/// What a falling piece is: one of the catalog tetrominoes, or the 1x1 bomb piece.
///
/// The bomb piece falls and is controlled like any other piece, but placing it
/// detonates a bomb instead of writing a cell into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Normal(PieceKind),
    Bomb,
}

impl PieceType {
    pub fn is_bomb(&self) -> bool {
        matches!(self, PieceType::Bomb)
    }

    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            PieceType::Normal(kind) => Some(*kind),
            PieceType::Bomb => None,
        }
    }
}

impl From<PieceKind> for PieceType {
    fn from(kind: PieceKind) -> Self {
        PieceType::Normal(kind)
    }
}

/// Rotation state, counted in clockwise quarter turns from spawn
///
/// The cycle goes: North (0) → East (1) → South (2) → West (3) → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use bomb_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns (0..=3)
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Rotation for a quarter-turn count; wraps modulo 4.
    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }
}

/// Player actions accepted by the engine
///
/// Each action returns a success flag when applied and mutates nothing when
/// rejected. Session lifecycle (`reset`) is not an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Descend up to three rows
    SoftDrop,
    /// Rotate piece 90° clockwise, with wall kicks
    Rotate,
    /// Drop to the lowest valid row and place immediately
    HardDrop,
    /// Put a free-standing bomb on a grid cell
    PlaceBomb { x: i8, y: i8 },
    /// Replace the next piece with the bomb piece
    SpawnBombPiece,
    /// Toggle pause state
    TogglePause,
    /// Raise the speed multiplier one step
    SpeedUp,
    /// Lower the speed multiplier one step
    SpeedDown,
}

impl GameAction {
    /// Parse a coordinate-free action from its wire name (case-insensitive)
    ///
    /// Accepts the snake_case names used by web clients and camelCase
    /// aliases. `place_bomb` carries coordinates and is never returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bomb_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("left"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("speed_up"), Some(GameAction::SpeedUp));
    /// assert_eq!(GameAction::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" | "moveleft" => Some(GameAction::MoveLeft),
            "right" | "moveright" => Some(GameAction::MoveRight),
            "down" | "softdrop" | "soft_drop" => Some(GameAction::SoftDrop),
            "rotate" => Some(GameAction::Rotate),
            "hard_drop" | "harddrop" => Some(GameAction::HardDrop),
            "spawn_bomb" | "spawnbomb" | "spawnbombpiece" => Some(GameAction::SpawnBombPiece),
            "pause" | "togglepause" => Some(GameAction::TogglePause),
            "speed_up" | "speedup" => Some(GameAction::SpeedUp),
            "speed_down" | "speeddown" => Some(GameAction::SpeedDown),
            _ => None,
        }
    }

    /// Whether this action moves or places the active piece.
    pub fn is_piece_control(&self) -> bool {
        matches!(
            self,
            GameAction::MoveLeft
                | GameAction::MoveRight
                | GameAction::SoftDrop
                | GameAction::Rotate
                | GameAction::HardDrop
        )
    }
}

/// Whether `s` names the free-standing bomb placement action.
pub fn is_place_bomb_name(s: &str) -> bool {
    s.eq_ignore_ascii_case("place_bomb") || s.eq_ignore_ascii_case("placeBomb")
}

/// A grid cell: empty, or the kind of the piece that was placed there.
pub type Cell = Option<PieceKind>;
