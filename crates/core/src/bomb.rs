//! Bomb module - square-blast neighborhood clearing
//!
//! A bomb clears every occupied cell in the `(2·radius+1)²` square centred on
//! it. Bombs never award score and never trigger the line-clear delay.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::BOMB_RADIUS;

/// Upper bound on cells a single blast can touch (radius 3 → 7x7).
pub const MAX_BLAST_CELLS: usize = ((2 * BOMB_RADIUS + 1) * (2 * BOMB_RADIUS + 1)) as usize;

/// A bomb at a grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bomb {
    pub x: i8,
    pub y: i8,
    pub radius: i8,
    pub active: bool,
}

impl Bomb {
    /// An armed bomb with the standard radius
    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x,
            y,
            radius: BOMB_RADIUS,
            active: true,
        }
    }

    /// Detonate: clear in-bounds, occupied cells in the blast square and disarm
    ///
    /// Returns the cleared cells as `(x, y)`, row by row from the top.
    pub fn explode(&mut self, board: &mut Board) -> ArrayVec<(i8, i8), MAX_BLAST_CELLS> {
        let mut destroyed = ArrayVec::new();
        let r = i16::from(self.radius.clamp(0, BOMB_RADIUS));
        for dy in -r..=r {
            for dx in -r..=r {
                // Cells that do not fit in i8 are off the board.
                let (Ok(x), Ok(y)) = (
                    i8::try_from(i16::from(self.x) + dx),
                    i8::try_from(i16::from(self.y) + dy),
                ) else {
                    continue;
                };
                if board.is_occupied(x, y) {
                    board.set(x, y, None);
                    destroyed.push((x, y));
                }
            }
        }
        self.active = false;
        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

    fn full_board() -> Board {
        let mut board = Board::new();
        for y in 0..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                board.set(x, y, Some(PieceKind::T));
            }
        }
        board
    }

    #[test]
    fn test_new_bomb_is_armed() {
        let bomb = Bomb::new(5, 10);
        assert!(bomb.active);
        assert_eq!(bomb.radius, 3);
    }

    #[test]
    fn test_explode_clears_exact_square() {
        let mut board = full_board();
        let mut bomb = Bomb::new(5, 10);

        let destroyed = bomb.explode(&mut board);
        assert_eq!(destroyed.len(), 49);
        assert!(!bomb.active);

        for y in 0..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                let inside = (2..=8).contains(&x) && (7..=13).contains(&y);
                assert_eq!(board.is_occupied(x, y), !inside, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_explode_clips_at_corner() {
        let mut board = full_board();
        let mut bomb = Bomb::new(0, 0);

        let destroyed = bomb.explode(&mut board);
        // Only the 4x4 in-bounds quarter of the square exists.
        assert_eq!(destroyed.len(), 16);
        assert!(!board.is_occupied(3, 3));
        assert!(board.is_occupied(4, 0));
        assert!(board.is_occupied(0, 4));
    }

    #[test]
    fn test_explode_on_empty_board_disarms() {
        let mut board = Board::new();
        let mut bomb = Bomb::new(5, 10);

        assert!(bomb.explode(&mut board).is_empty());
        assert!(!bomb.active);
    }

    #[test]
    fn test_explode_near_coordinate_limits() {
        let mut board = full_board();

        let mut far = Bomb::new(i8::MAX - 1, i8::MIN);
        assert!(far.explode(&mut board).is_empty());
        assert!(!far.active);

        // In range of the right edge, but the square extends past i8::MAX.
        let mut edge = Bomb::new(12, 5);
        let destroyed = edge.explode(&mut board);
        assert_eq!(destroyed.len(), 7);
        assert!(!board.is_occupied(9, 2));
        assert!(board.is_occupied(8, 5));
        assert_eq!(board.filled_count(), 200 - 7);
    }
}
