//! High score store interface
//!
//! The engine never persists anything itself; a session offers its final
//! score to a store when a game ends.

/// An opaque best-score store with get / set-if-greater semantics
pub trait HighScoreStore {
    /// Current best score (0 if none recorded)
    fn get(&self) -> u32;

    /// Record `score` if it beats the current best; returns whether it did
    fn set_if_greater(&mut self, score: u32) -> bool;
}

/// Process-local store, forgotten on exit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHighScore {
    best: u32,
}

impl MemoryHighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn get(&self) -> u32 {
        self.best
    }

    fn set_if_greater(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }
}
