//! Bomb Tetris (workspace facade crate).
//!
//! Re-exports the engine, the shared types and the session server under one
//! `bomb_tetris::{core,adapter,types}` path; the implementation lives in
//! dedicated crates under `crates/`.

pub use bomb_tetris_adapter as adapter;
pub use bomb_tetris_core as core;
pub use bomb_tetris_types as types;
