//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell can be empty or hold the kind of
//! the piece that was placed there. Uses a flat array for cache locality and
//! zero-allocation line clears.
//!
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top
//! to bottom). Rows above the board (`y < 0`) are legal for pieces and are
//! never checked against occupancy.

use arrayvec::ArrayVec;

use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Capacity for cleared row indices. A placement completes at most 4 rows, but
/// a hand-built grid may hold any number of full rows.
pub const MAX_CLEARED_ROWS: usize = BOARD_HEIGHT as usize;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn in_bounds(&self, x: i8, y: i8) -> bool {
        Self::index(x, y).is_some()
    }

    /// Whether `shape` fits with its origin at `(x, y)`
    ///
    /// Invalid if any occupied cell leaves the board sideways or through the
    /// floor, or overlaps a filled cell. Cells above the top (`y < 0`) only
    /// need to be horizontally in range.
    pub fn is_valid_move(&self, x: i8, y: i8, shape: &Shape) -> bool {
        shape.minos().all(|(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || nx >= BOARD_WIDTH as i8 || ny >= BOARD_HEIGHT as i8 {
                return false;
            }
            ny < 0 || !self.is_occupied(nx, ny)
        })
    }

    /// Write `shape` into the grid at `(x, y)`, skipping cells above the top
    pub fn lock_shape(&mut self, shape: &Shape, x: i8, y: i8, kind: PieceKind) {
        for (dx, dy) in shape.minos() {
            let (px, py) = (x + dx, y + dy);
            if py >= 0 {
                self.set(px, py, Some(kind));
            }
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y).is_some_and(|row| row.iter().all(|cell| cell.is_some()))
    }

    /// Check if a row has no filled cells (out-of-range rows count as empty)
    pub fn is_row_empty(&self, y: usize) -> bool {
        self.row(y).map_or(true, |row| row.iter().all(|cell| cell.is_none()))
    }

    /// One row of cells, left to right
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= BOARD_HEIGHT as usize {
            return None;
        }
        let start = y * BOARD_WIDTH as usize;
        Some(&self.cells[start..start + BOARD_WIDTH as usize])
    }

    /// Number of empty rows above the topmost filled cell
    pub fn leading_empty_rows(&self) -> usize {
        (0..BOARD_HEIGHT as usize)
            .take_while(|&y| self.is_row_empty(y))
            .count()
    }

    /// Clear all full rows and return the row indices that were cleared (sorted bottom to top)
    ///
    /// Rows above each cleared row shift down; fresh empty rows enter at the
    /// top, so the height never changes. Uses a two-pointer pass with no
    /// allocation.
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, MAX_CLEARED_ROWS> {
        let mut cleared_rows = ArrayVec::new();
        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;

        // Scan from bottom to top
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        cleared_rows
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Count of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [None; BOARD_SIZE];
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::shape_of;
    use crate::types::PieceType;

    fn fill_row(board: &mut Board, y: i8, kind: PieceKind) {
        for x in 0..BOARD_WIDTH as i8 {
            board.set(x, y, Some(kind));
        }
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_is_valid_move_allows_rows_above_top() {
        let board = Board::new();
        let i = shape_of(PieceType::Normal(PieceKind::I));
        assert!(board.is_valid_move(0, -1, &i));
        assert!(board.is_valid_move(6, -1, &i));
        assert!(!board.is_valid_move(7, -1, &i));
        assert!(!board.is_valid_move(-1, -1, &i));
    }

    #[test]
    fn test_is_valid_move_floor_and_occupancy() {
        let mut board = Board::new();
        let o = shape_of(PieceType::Normal(PieceKind::O));
        assert!(board.is_valid_move(0, 18, &o));
        assert!(!board.is_valid_move(0, 19, &o));

        board.set(1, 18, Some(PieceKind::Z));
        assert!(!board.is_valid_move(0, 17, &o));
        assert!(board.is_valid_move(2, 17, &o));
    }

    #[test]
    fn test_lock_shape_skips_negative_rows() {
        let mut board = Board::new();
        let o = shape_of(PieceType::Normal(PieceKind::O));
        board.lock_shape(&o, 3, -1, PieceKind::O);

        assert_eq!(board.filled_count(), 2);
        assert!(board.is_occupied(3, 0));
        assert!(board.is_occupied(4, 0));
    }

    #[test]
    fn test_clear_full_rows_shifts_down() {
        let mut board = Board::new();
        fill_row(&mut board, 19, PieceKind::I);
        board.set(2, 18, Some(PieceKind::T));
        board.set(7, 17, Some(PieceKind::S));

        let cleared = board.clear_full_rows();
        assert_eq!(cleared.as_slice(), &[19]);
        assert_eq!(board.get(2, 19), Some(Some(PieceKind::T)));
        assert_eq!(board.get(7, 18), Some(Some(PieceKind::S)));
        assert!(board.is_row_empty(0));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::new();
        fill_row(&mut board, 19, PieceKind::I);
        board.set(0, 18, Some(PieceKind::J));
        fill_row(&mut board, 17, PieceKind::L);

        let cleared = board.clear_full_rows();
        assert_eq!(cleared.as_slice(), &[19, 17]);
        assert_eq!(board.get(0, 19), Some(Some(PieceKind::J)));
        assert_eq!(board.filled_count(), 1);
    }

    #[test]
    fn test_leading_empty_rows() {
        let mut board = Board::new();
        assert_eq!(board.leading_empty_rows(), 20);

        board.set(4, 12, Some(PieceKind::O));
        assert_eq!(board.leading_empty_rows(), 12);
    }
}
