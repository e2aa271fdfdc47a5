//! One connection's game
//!
//! A session exclusively owns its engine. The server feeds it client lines and
//! tick timestamps strictly one at a time; the session turns them into engine
//! calls and outbound messages, and offers the final score to the shared
//! high-score store when a game ends.

use std::net::SocketAddr;
use std::sync::MutexGuard;

use crate::core::rng::{ShapeRng, ShapeSource};
use crate::core::{GameState, HighScoreStore};
use crate::protocol::{
    build_state, create_ack, parse_request, AckMessage, ClientRequest, ErrorMessage, StateMessage,
};
use crate::server::SessionSummary;
use crate::store::SharedHighScore;

pub struct Session<S = ShapeRng> {
    id: u64,
    game: GameState<S>,
    high_scores: SharedHighScore,
    /// Whether the current game's score has been offered to the store
    score_offered: bool,
    /// Outbound state sequence number
    state_seq: u64,
}

impl Session<ShapeRng> {
    pub fn new(id: u64, seed: u32, high_scores: SharedHighScore) -> Self {
        Self::with_game(id, GameState::new(seed), high_scores)
    }
}

impl<S: ShapeSource> Session<S> {
    pub fn with_game(id: u64, game: GameState<S>, high_scores: SharedHighScore) -> Self {
        Self {
            id,
            game,
            high_scores,
            score_offered: false,
            state_seq: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn game(&self) -> &GameState<S> {
        &self.game
    }

    fn store(&self) -> MutexGuard<'_, dyn HighScoreStore + Send + 'static> {
        self.high_scores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply one client line; the caller follows a successful ack with a state message
    pub fn handle_line(&mut self, line: &str) -> Result<AckMessage, ErrorMessage> {
        let req = parse_request(line).map_err(|e| e.into_message())?;

        let success = match req.request {
            ClientRequest::Action(action) => self.game.apply_action(action),
            ClientRequest::Reset => {
                self.game.reset();
                self.score_offered = false;
                println!("[Session] {} started a new game", self.id);
                true
            }
        };
        self.offer_score_if_over();

        Ok(create_ack(req.seq, req.name, success))
    }

    /// Advance the engine to `now_ms` (milliseconds since the session started)
    pub fn tick(&mut self, now_ms: u64) {
        self.game.update(now_ms);
        self.offer_score_if_over();
    }

    fn offer_score_if_over(&mut self) {
        if !self.game.is_game_over() || self.score_offered {
            return;
        }
        self.score_offered = true;

        let score = self.game.score();
        println!("[Session] {} game over, final score {}", self.id, score);
        if self.store().set_if_greater(score) {
            println!("[Session] {} set a new high score: {}", self.id, score);
        }
    }

    /// Observe the engine and wrap the snapshot for the wire
    pub fn state_message(&mut self) -> StateMessage {
        let mut snap = self.game.observe();
        snap.high_score = self.store().get();
        self.state_seq += 1;
        build_state(self.state_seq, self.id, &snap)
    }

    pub fn summary(&self, peer: SocketAddr) -> SessionSummary {
        SessionSummary {
            peer,
            score: self.game.score(),
            level: self.game.level(),
            game_over: self.game.is_game_over(),
        }
    }
}
