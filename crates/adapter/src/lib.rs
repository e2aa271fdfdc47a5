//! Adapter - game sessions over TCP with a JSON protocol
//!
//! Each TCP connection is one session with its own engine. Sessions are
//! fully independent; the only shared state is the high-score store and the
//! registry of live sessions.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects (default: 127.0.0.1:8080) and receives a `state`
//! 2. **Actions**: Client sends `{"action": ..., "seq": n}` lines
//! 3. **Replies**: Server answers each action with an `ack`, then a fresh `state`
//! 4. **Ticks**: Server advances the engine every tick and sends a `state`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - `left`, `right`, `down`, `rotate`, `hard_drop`
//! - `place_bomb` (with `x` and `y`), `spawn_bomb`
//! - `pause`, `speed_up`, `speed_down`
//! - `start` (or `reset`): begin a new game
//!
//! Names are case-insensitive; camelCase aliases (`hardDrop`, `placeBomb`,
//! `spawnBombPiece`, ...) are accepted.
//!
//! ## Server → Client
//!
//! - **state**: board colors, current/next piece, bombs, flags and counters
//! - **ack**: `{action, success}` for each applied action
//! - **error**: `invalid_json`, `invalid_action` or `missing_coordinates`
//!
//! # Environment Variables
//!
//! - `BOMB_TETRIS_HOST`: Bind address (default: "127.0.0.1")
//! - `BOMB_TETRIS_PORT`: Port number (default: 8080, 0 = ephemeral)
//! - `BOMB_TETRIS_TICK_MS`: Engine tick period (default: 100)
//! - `BOMB_TETRIS_SEED`: Base RNG seed (default: derived from the clock)
//! - `BOMB_TETRIS_HIGH_SCORE_PATH`: JSON high score file (default: in memory)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Server -> Client: {"type":"state","seq":1,"session_id":1,"board":[[null,...],...],...}
//! Client -> Server: {"action":"rotate","seq":1}
//! Server -> Client: {"type":"ack","seq":1,"action":"rotate","success":true,...}
//! Server -> Client: {"type":"state","seq":2,...}
//! Client -> Server: {"action":"place_bomb","seq":2}
//! Server -> Client: {"type":"error","seq":2,"code":"missing_coordinates",...}
//! ```

pub mod protocol;
pub mod server;
pub mod session;
pub mod store;

pub use bomb_tetris_core as core;
pub use bomb_tetris_types as types;

pub use server::{run_server, run_server_with, ServerConfig, SessionRegistry, SessionSummary};
pub use session::Session;
pub use store::{JsonFileHighScore, SharedHighScore};
