//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the bomb Tetris engine: the grid, the piece
//! catalog, gravity and lock timing, line clears, scoring and the bomb
//! mechanic. It has no dependencies on networking, clocks or I/O:
//!
//! - **Deterministic**: the same shape source and the same tick timestamps
//!   produce the same game
//! - **Passive**: a driver calls [`GameState::update`] with a monotonic
//!   millisecond timestamp; the engine never reads a clock
//! - **Independent**: each [`GameState`] is a self-contained value, so any
//!   number of sessions can run side by side
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with collision checks and line clearing
//! - [`bomb`]: square-blast bombs
//! - [`game_state`]: the engine itself (active/next piece, phases, actions)
//! - [`highscore`]: best-score store interface
//! - [`pieces`]: shape catalog, clockwise rotation and kicks
//! - [`rng`]: shape sources for spawning
//! - [`scoring`]: score, level, bomb grants and fall intervals
//! - [`snapshot`]: read-only views for observers
//!
//! # Rules
//!
//! - Pieces are drawn uniformly from the seven tetrominoes
//! - A grounded piece is placed after a 200ms lock delay
//! - A clear scores `lines × 100 × level`; one level and one bomb per ten lines
//! - The next piece waits 250ms after a clear
//! - A bomb clears the 7x7 square around it and scores nothing
//!
//! # Example
//!
//! ```
//! use bomb_tetris_core::GameState;
//! use bomb_tetris_types::GameAction;
//!
//! let mut game = GameState::new(12345);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! assert!(game.apply_action(GameAction::HardDrop));
//!
//! game.update(100);
//! assert_eq!(game.snapshot().filled_cells(), 4);
//! ```

pub mod board;
pub mod bomb;
pub mod game_state;
pub mod highscore;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use bomb_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use bomb::Bomb;
pub use game_state::{GameState, Phase, Piece};
pub use highscore::{HighScoreStore, MemoryHighScore};
pub use pieces::{color_of, shape_at, shape_of, try_rotate, Shape};
pub use rng::{CycleShapes, ShapeRng, ShapeSource, SimpleRng};
pub use scoring::{apply_line_clear, LineClearOutcome};
pub use snapshot::{ActiveSnapshot, GameSnapshot, NextSnapshot};
