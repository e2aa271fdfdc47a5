//! Game state module - the board engine
//!
//! Owns the grid, the active and next pieces, score/level/bomb inventory and
//! the tick-driven lock / line-clear state machine. The engine is passive: a
//! driver applies actions and calls [`GameState::update`] once per tick with a
//! monotonic millisecond timestamp. It never reads a clock, never blocks and
//! holds no process-wide state.

use crate::board::Board;
use crate::bomb::Bomb;
use crate::pieces::{color_of, shape_at, try_rotate, Shape};
use crate::rng::{ShapeRng, ShapeSource};
use crate::scoring::{
    apply_line_clear, base_fall_interval_ms, effective_fall_interval_ms, speed_multiplier,
    stack_ratio,
};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, NextSnapshot};
use crate::types::*;

/// A falling (or queued) piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a piece at the spawn position, unrotated
    pub fn spawn(kind: PieceType) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Shape for the current rotation
    pub fn shape(&self) -> Shape {
        shape_at(self.kind, self.rotation)
    }

    pub fn color(&self) -> Rgb {
        color_of(self.kind)
    }

    pub fn is_bomb(&self) -> bool {
        self.kind.is_bomb()
    }
}

/// Where the engine is in the fall / lock / clear cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The active piece falls under gravity
    Falling,
    /// The active piece is blocked below; placed once the lock delay passes
    Locking { since: u64 },
    /// Lines were just cleared; the next piece is withheld. `since` is stamped
    /// by the first tick observed after the clear.
    Clearing { since: Option<u64>, lines: u32 },
    /// A fresh piece had no legal spawn position
    GameOver,
}

/// Complete engine state for one session
#[derive(Debug, Clone)]
pub struct GameState<S = ShapeRng> {
    board: Board,
    active: Option<Piece>,
    next: Piece,
    source: S,
    /// Free-standing bombs waiting for the next tick
    bombs: Vec<Bomb>,
    bombs_available: u32,
    score: u32,
    level: u32,
    lines: u32,
    base_fall_ms: u32,
    /// Effective gravity interval after stack slowdown and speed multiplier
    fall_interval_ms: u32,
    /// Speed multiplier in quarter steps (1..=12)
    speed_steps: u8,
    paused: bool,
    phase: Phase,
    lock_delay_ms: u64,
    last_fall_ms: u64,
    /// One-shot count reported after a clear delay ends
    lines_cleared_this_frame: u32,
}

impl GameState<ShapeRng> {
    /// Create a new game drawing uniform random pieces from `seed`
    pub fn new(seed: u32) -> Self {
        Self::with_source(ShapeRng::new(seed))
    }
}

impl Default for GameState<ShapeRng> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<S: ShapeSource> GameState<S> {
    /// Create a new game drawing pieces from `source`; the first piece spawns immediately
    pub fn with_source(mut source: S) -> Self {
        let next = Piece::spawn(PieceType::Normal(source.next_kind()));
        let base_fall_ms = base_fall_interval_ms(1);
        let mut state = Self {
            board: Board::new(),
            active: None,
            next,
            source,
            bombs: Vec::new(),
            bombs_available: 0,
            score: 0,
            level: 1,
            lines: 0,
            base_fall_ms,
            fall_interval_ms: base_fall_ms,
            speed_steps: SPEED_DEFAULT_STEPS,
            paused: false,
            phase: Phase::Falling,
            lock_delay_ms: LOCK_DELAY_MS,
            last_fall_ms: 0,
            lines_cleared_this_frame: 0,
        };
        state.spawn_piece();
        state.check_stack_height();
        state
    }

    /// Reinitialize in place: empty grid, zeroed score/level/bombs, fresh pieces
    ///
    /// The shape source keeps running, so the new game sees a new sequence.
    pub fn reset(&mut self) {
        self.board.clear();
        self.active = None;
        self.next = self.draw_piece();
        self.bombs.clear();
        self.bombs_available = 0;
        self.score = 0;
        self.level = 1;
        self.lines = 0;
        self.base_fall_ms = base_fall_interval_ms(1);
        self.speed_steps = SPEED_DEFAULT_STEPS;
        self.paused = false;
        self.phase = Phase::Falling;
        self.lock_delay_ms = LOCK_DELAY_MS;
        self.last_fall_ms = 0;
        self.lines_cleared_this_frame = 0;
        self.spawn_piece();
        self.check_stack_height();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Whether a line clear is holding back the next piece
    pub fn is_clearing(&self) -> bool {
        matches!(self.phase, Phase::Clearing { .. })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn bombs_available(&self) -> u32 {
        self.bombs_available
    }

    pub fn speed_multiplier(&self) -> f32 {
        speed_multiplier(self.speed_steps)
    }

    pub fn fall_interval_ms(&self) -> u32 {
        self.fall_interval_ms
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    pub fn next(&self) -> Piece {
        self.next
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Peek at the one-shot cleared-lines counter without consuming it
    pub fn lines_cleared_this_frame(&self) -> u32 {
        self.lines_cleared_this_frame
    }

    /// Read and reset the one-shot cleared-lines counter
    pub fn take_lines_cleared(&mut self) -> u32 {
        std::mem::take(&mut self.lines_cleared_this_frame)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        for (row, cells) in out
            .board
            .iter_mut()
            .zip(self.board.cells().chunks(BOARD_WIDTH as usize))
        {
            row.copy_from_slice(cells);
        }

        out.active = self.active.map(ActiveSnapshot::from);
        out.next = NextSnapshot::from(self.next);
        out.bombs.clear();
        out.bombs.extend(self.bombs.iter().copied());
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.bombs_available = self.bombs_available;
        out.speed_multiplier = self.speed_multiplier();
        out.paused = self.paused;
        out.game_over = self.is_game_over();
        (out.clearing, out.pending_lines) = match self.phase {
            Phase::Clearing { lines, .. } => (true, lines),
            _ => (false, 0),
        };
        out.lines_cleared_this_frame = self.lines_cleared_this_frame;
        out.effective_fall_ms = self.fall_interval_ms;
    }

    /// Read-only snapshot; leaves the one-shot counter in place
    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Snapshot for an observer; consumes the one-shot cleared-lines counter
    pub fn observe(&mut self) -> GameSnapshot {
        let s = self.snapshot();
        self.lines_cleared_this_frame = 0;
        s
    }

    fn draw_piece(&mut self) -> Piece {
        Piece::spawn(PieceType::Normal(self.source.next_kind()))
    }

    /// Promote the next piece to active and draw a new next piece
    ///
    /// Returns false (and enters game over) if the new piece does not fit at
    /// the spawn position.
    pub fn spawn_piece(&mut self) -> bool {
        let upcoming = self.draw_piece();
        let piece = Piece::spawn(std::mem::replace(&mut self.next, upcoming).kind);
        self.active = Some(piece);
        self.lock_delay_ms = LOCK_DELAY_MS;

        if self.is_valid_move(piece.x, piece.y, &piece.shape()) {
            self.phase = Phase::Falling;
            true
        } else {
            self.phase = Phase::GameOver;
            false
        }
    }

    /// Whether `shape` fits with its origin at `(x, y)` on the current grid
    pub fn is_valid_move(&self, x: i8, y: i8, shape: &Shape) -> bool {
        self.board.is_valid_move(x, y, shape)
    }

    /// Try to move the active piece
    pub(crate) fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let (x, y) = (active.x + dx, active.y + dy);
        if self.is_valid_move(x, y, &active.shape()) {
            self.active = Some(Piece { x, y, ..active });
            true
        } else {
            false
        }
    }

    /// Rotate the active piece clockwise, kicking sideways then up if blocked
    pub(crate) fn try_rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let result = try_rotate(active.kind, active.rotation, active.x, active.y, |x, y, shape| {
            self.board.is_valid_move(x, y, shape)
        });

        match result {
            Some((rotation, (dx, dy))) => {
                self.active = Some(Piece {
                    rotation,
                    x: active.x + dx,
                    y: active.y + dy,
                    ..active
                });
                true
            }
            None => false,
        }
    }

    /// Descend up to [`SOFT_DROP_ROWS`] rows
    ///
    /// Bottoming out while already locking shortens this piece's lock delay.
    fn soft_drop(&mut self) -> bool {
        let mut moved = false;
        for _ in 0..SOFT_DROP_ROWS {
            if self.try_move(0, 1) {
                moved = true;
            } else {
                if matches!(self.phase, Phase::Locking { .. }) {
                    self.lock_delay_ms = FAST_LOCK_DELAY_MS;
                }
                break;
            }
        }
        moved
    }

    /// Drop the active piece to the lowest valid row and place it immediately
    fn hard_drop(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        while self.try_move(0, 1) {}
        self.place_piece();
        true
    }

    /// Bake the active piece into the grid (or detonate it, for the bomb piece)
    ///
    /// Completed rows are cleared; if any were, the next spawn waits for the
    /// line-clear delay, otherwise the next piece spawns now.
    pub fn place_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        let shape = piece.shape();
        match piece.kind {
            PieceType::Normal(kind) => self.board.lock_shape(&shape, piece.x, piece.y, kind),
            PieceType::Bomb => {
                for (dx, dy) in shape.minos() {
                    let (x, y) = (piece.x + dx, piece.y + dy);
                    if y >= 0 {
                        Bomb::new(x, y).explode(&mut self.board);
                    }
                }
            }
        }

        let cleared = self.board.clear_full_rows().len() as u32;
        if cleared > 0 {
            self.record_line_clear(cleared);
            self.phase = Phase::Clearing {
                since: None,
                lines: cleared,
            };
        } else {
            self.spawn_piece();
        }
    }

    fn record_line_clear(&mut self, cleared: u32) {
        let outcome = apply_line_clear(self.lines, cleared);
        self.lines = outcome.lines_total;
        self.level = outcome.level;
        self.score = self.score.saturating_add(outcome.score);
        self.bombs_available += outcome.bombs_granted;
        self.base_fall_ms = outcome.base_fall_ms;
    }

    /// Queue a free-standing bomb; it detonates on the next tick
    ///
    /// Needs one bomb in inventory and an in-bounds target. Occupancy of the
    /// target cell is not checked.
    pub fn place_bomb(&mut self, x: i8, y: i8) -> bool {
        if self.bombs_available == 0 || !self.board.in_bounds(x, y) {
            return false;
        }
        self.bombs.push(Bomb::new(x, y));
        self.bombs_available -= 1;
        true
    }

    /// Replace the next piece with the bomb piece, spending one bomb
    pub fn spawn_bomb_piece(&mut self) -> bool {
        if self.bombs_available == 0 {
            return false;
        }
        self.next = Piece::spawn(PieceType::Bomb);
        self.bombs_available -= 1;
        true
    }

    /// Detonate every armed free-standing bomb; returns the number of cells cleared
    pub fn explode_bombs(&mut self) -> usize {
        let mut destroyed = 0;
        for bomb in self.bombs.iter_mut().filter(|b| b.active) {
            destroyed += bomb.explode(&mut self.board).len();
        }
        self.bombs.retain(|b| b.active);
        destroyed
    }

    /// Recompute the effective fall interval from the stack height
    pub fn check_stack_height(&mut self) -> u32 {
        let ratio = stack_ratio(self.board.leading_empty_rows(), BOARD_HEIGHT as usize);
        self.fall_interval_ms =
            effective_fall_interval_ms(self.base_fall_ms, ratio, self.speed_multiplier());
        self.fall_interval_ms
    }

    fn change_speed(&mut self, faster: bool) -> bool {
        self.speed_steps = if faster {
            (self.speed_steps + 1).min(SPEED_MAX_STEPS)
        } else {
            self.speed_steps.saturating_sub(1).max(SPEED_MIN_STEPS)
        };
        self.check_stack_height();
        true
    }

    fn apply_gravity(&mut self, now: u64) {
        if now.saturating_sub(self.last_fall_ms) <= self.fall_interval_ms as u64 {
            return;
        }

        if self.try_move(0, 1) {
            self.phase = Phase::Falling;
        } else {
            match self.phase {
                Phase::Falling => self.phase = Phase::Locking { since: now },
                Phase::Locking { since } if now.saturating_sub(since) >= self.lock_delay_ms => {
                    self.place_piece();
                }
                _ => {}
            }
        }
        self.last_fall_ms = now;
    }

    /// Advance timers by one tick
    ///
    /// `now` is a monotonic millisecond timestamp and must never decrease
    /// between calls; timing is undefined otherwise. A no-op while paused or
    /// after game over.
    pub fn update(&mut self, now: u64) {
        if self.paused || self.is_game_over() {
            return;
        }

        match self.phase {
            Phase::Clearing { since, lines } => {
                let since = since.unwrap_or(now);
                if now.saturating_sub(since) >= LINE_CLEAR_DELAY_MS {
                    self.lines_cleared_this_frame = lines;
                    self.last_fall_ms = now;
                    self.spawn_piece();
                } else {
                    self.phase = Phase::Clearing {
                        since: Some(since),
                        lines,
                    };
                }
            }
            Phase::Falling | Phase::Locking { .. } => self.apply_gravity(now),
            Phase::GameOver => return,
        }

        self.check_stack_height();
        self.explode_bombs();
    }

    /// Whether the active piece may be moved, rotated or dropped right now
    pub fn can_control(&self) -> bool {
        !self.paused
            && self.active.is_some()
            && matches!(self.phase, Phase::Falling | Phase::Locking { .. })
    }

    /// Apply a player action; returns false (with no mutation) when rejected
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if self.is_game_over() {
            return false;
        }
        if action.is_piece_control() && !self.can_control() {
            return false;
        }

        match action {
            GameAction::MoveLeft => self.try_move(-1, 0),
            GameAction::MoveRight => self.try_move(1, 0),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::Rotate => self.try_rotate(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::PlaceBomb { x, y } => self.place_bomb(x, y),
            GameAction::SpawnBombPiece => self.spawn_bomb_piece(),
            GameAction::TogglePause => {
                self.paused = !self.paused;
                true
            }
            GameAction::SpeedUp => self.change_speed(true),
            GameAction::SpeedDown => self.change_speed(false),
        }
    }
}
