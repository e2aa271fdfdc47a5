//! Pieces module - the piece catalog and its rotation/kick rules
//!
//! Shapes are small boolean matrices anchored at the top-left of their bounding
//! box. Rotation is a pure 90° clockwise transform; every `(piece, rotation)`
//! pair is precomputed at compile time, so looking a shape up never rotates.

use crate::types::{PieceKind, PieceType, Rgb, Rotation};

/// Largest bounding-box side of any catalog shape.
pub const MAX_DIM: usize = 4;

/// Offset of an occupied cell relative to the piece origin: (dx, dy)
pub type MinoOffset = (i8, i8);

/// A rectangular boolean matrix (`rows × cols`, both at most [`MAX_DIM`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_DIM]; MAX_DIM],
}

impl Shape {
    const EMPTY: Shape = Shape {
        rows: 0,
        cols: 0,
        cells: [[false; MAX_DIM]; MAX_DIM],
    };

    /// Build a shape from the top-left `rows × cols` corner of `bits` (non-zero = occupied).
    pub const fn new(rows: u8, cols: u8, bits: [[u8; MAX_DIM]; MAX_DIM]) -> Self {
        let mut cells = [[false; MAX_DIM]; MAX_DIM];
        let mut r = 0;
        while r < rows as usize {
            let mut c = 0;
            while c < cols as usize {
                cells[r][c] = bits[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Whether `(r, c)` is occupied; false outside the bounding box.
    pub fn get(&self, r: usize, c: usize) -> bool {
        r < self.rows() && c < self.cols() && self.cells[r][c]
    }

    /// Occupied cells as `(dx, dy)` offsets, row-major.
    pub fn minos(&self) -> impl Iterator<Item = MinoOffset> {
        let shape = *self;
        (0..shape.rows()).flat_map(move |r| {
            (0..shape.cols())
                .filter(move |&c| shape.cells[r][c])
                .map(move |c| (c as i8, r as i8))
        })
    }

    /// Row-major copy of the matrix.
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.rows())
            .map(|r| self.cells[r][..self.cols()].to_vec())
            .collect()
    }
}

/// Rotate a shape 90° clockwise: `rotated[c][rows-1-r] = shape[r][c]`
///
/// The result has swapped dimensions. Four applications return the original.
pub const fn rotate_clockwise(shape: &Shape) -> Shape {
    let rows = shape.rows as usize;
    let cols = shape.cols as usize;
    let mut cells = [[false; MAX_DIM]; MAX_DIM];
    let mut r = 0;
    while r < rows {
        let mut c = 0;
        while c < cols {
            cells[c][rows - 1 - r] = shape.cells[r][c];
            c += 1;
        }
        r += 1;
    }
    Shape {
        rows: shape.cols,
        cols: shape.rows,
        cells,
    }
}

/// Base shapes in catalog order (I, O, T, L, J, S, Z), then the 1x1 bomb.
const BASE_SHAPES: [Shape; 8] = [
    Shape::new(1, 4, [[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]),
    Shape::new(2, 2, [[1, 1, 0, 0], [1, 1, 0, 0], [0; 4], [0; 4]]),
    Shape::new(2, 3, [[0, 1, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
    Shape::new(2, 3, [[1, 0, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
    Shape::new(2, 3, [[0, 0, 1, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
    Shape::new(2, 3, [[0, 1, 1, 0], [1, 1, 0, 0], [0; 4], [0; 4]]),
    Shape::new(2, 3, [[1, 1, 0, 0], [0, 1, 1, 0], [0; 4], [0; 4]]),
    Shape::new(1, 1, [[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
];

const BOMB_INDEX: usize = 7;

/// Every catalog entry in all four rotations.
const ROTATED_SHAPES: [[Shape; 4]; 8] = build_rotation_table();

const fn build_rotation_table() -> [[Shape; 4]; 8] {
    let mut table = [[Shape::EMPTY; 4]; 8];
    let mut id = 0;
    while id < BASE_SHAPES.len() {
        let mut shape = BASE_SHAPES[id];
        let mut turn = 0;
        while turn < 4 {
            table[id][turn] = shape;
            shape = rotate_clockwise(&shape);
            turn += 1;
        }
        id += 1;
    }
    table
}

fn catalog_index(piece: PieceType) -> usize {
    match piece {
        PieceType::Normal(kind) => kind.index(),
        PieceType::Bomb => BOMB_INDEX,
    }
}

/// Base (unrotated) shape of a piece
pub fn shape_of(piece: PieceType) -> Shape {
    BASE_SHAPES[catalog_index(piece)]
}

/// Shape of a piece after `rotation` clockwise quarter turns
pub fn shape_at(piece: PieceType, rotation: Rotation) -> Shape {
    ROTATED_SHAPES[catalog_index(piece)][rotation.index() as usize]
}

/// Fixed palette entry for a piece
pub fn color_of(piece: PieceType) -> Rgb {
    match piece {
        PieceType::Normal(PieceKind::I) => Rgb::CYAN,
        PieceType::Normal(PieceKind::O) => Rgb::YELLOW,
        PieceType::Normal(PieceKind::T) => Rgb::PURPLE,
        PieceType::Normal(PieceKind::L) => Rgb::ORANGE,
        PieceType::Normal(PieceKind::J) => Rgb::BLUE,
        PieceType::Normal(PieceKind::S) => Rgb::GREEN,
        PieceType::Normal(PieceKind::Z) => Rgb::RED,
        PieceType::Bomb => Rgb::BOMB_RED,
    }
}

/// Offsets tried, in order, when a rotation does not fit in place:
/// in place, then sideways kicks (-1, +1, -2, +2), then one row up.
pub const ROTATION_KICKS: [MinoOffset; 6] = [(0, 0), (-1, 0), (1, 0), (-2, 0), (2, 0), (0, -1)];

/// Try to rotate a piece clockwise with kicks
///
/// `fits(x, y, shape)` reports whether `shape` can sit with its origin at
/// `(x, y)`. Returns the new rotation and the kick offset that succeeded, or
/// `None` if every kick fails (the caller keeps the old rotation).
pub fn try_rotate(
    piece: PieceType,
    rotation: Rotation,
    x: i8,
    y: i8,
    fits: impl Fn(i8, i8, &Shape) -> bool,
) -> Option<(Rotation, MinoOffset)> {
    let new_rotation = rotation.rotate_cw();
    let new_shape = shape_at(piece, new_rotation);

    ROTATION_KICKS
        .iter()
        .copied()
        .find(|&(dx, dy)| fits(x + dx, y + dy, &new_shape))
        .map(|kick| (new_rotation, kick))
}
