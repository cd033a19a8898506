//! Staggered hex cell addressing.
//!
//! Bubbles sit in rows that alternate width: even rows hold
//! [`GRID_COLUMNS`] cells, odd rows one fewer and are shifted right by half
//! a cell. This is the classic bubble shooter layout, stored as plain
//! `(row, col)` pairs rather than axial coordinates.
//!
//! Screen space has Y pointing down, with row 0 (the ceiling) at the top.

use bevy::prelude::*;
use serde::Serialize;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Cell>();
}

/// Radius of a settled bubble (and of the projectile) in pixels.
pub const BUBBLE_RADIUS: f32 = 20.0;

/// Horizontal distance between neighbouring bubble centers.
pub const SPACING: f32 = BUBBLE_RADIUS * 2.0;

/// Vertical row pitch as a fraction of [`SPACING`].
pub const ROW_HEIGHT_FACTOR: f32 = 0.87;

/// Vertical distance between row centers.
pub const ROW_HEIGHT: f32 = SPACING * ROW_HEIGHT_FACTOR;

/// Number of cells in an even row. Odd rows hold one fewer.
pub const GRID_COLUMNS: usize = 12;

/// Number of storage rows in the grid.
pub const GRID_ROWS: usize = 14;

/// Width of the playfield. Even rows leave a half-bubble margin on each side.
pub const FIELD_WIDTH: f32 = SPACING * (GRID_COLUMNS as f32 + 1.0);

/// Height of the playfield.
pub const FIELD_HEIGHT: f32 = 700.0;

/// A `(row, col)` address in the staggered grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Number of cells in the given row.
#[inline]
pub const fn row_width(row: usize) -> usize {
    if row % 2 == 0 {
        GRID_COLUMNS
    } else {
        GRID_COLUMNS - 1
    }
}

/// Horizontal shift of a row: odd rows sit half a cell to the right.
#[inline]
pub fn col_offset(row: usize) -> f32 {
    if row % 2 == 0 { 0.0 } else { SPACING / 2.0 }
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether this address exists in a grid of [`GRID_ROWS`] rows.
    pub const fn in_bounds(&self) -> bool {
        self.row < GRID_ROWS && self.col < row_width(self.row)
    }

    /// All in-bounds neighbours of this cell.
    ///
    /// Same-row neighbours are `col ± 1`. Across rows, an even row touches
    /// `col - 1` and `col` of the rows above and below, while an odd row
    /// touches `col` and `col + 1`, which follows from the half-cell stagger.
    /// The relation is symmetric.
    pub fn neighbors(&self) -> Vec<Cell> {
        let Cell { row, col } = *self;
        let row = row as isize;
        let col = col as isize;

        let diagonal = if row % 2 == 0 { -1 } else { 1 };
        let candidates = [
            (row, col - 1),
            (row, col + 1),
            (row - 1, col),
            (row - 1, col + diagonal),
            (row + 1, col),
            (row + 1, col + diagonal),
        ];

        candidates
            .into_iter()
            .filter(|&(r, c)| r >= 0 && c >= 0)
            .map(|(r, c)| Cell::new(r as usize, c as usize))
            .filter(Cell::in_bounds)
            .collect()
    }

    /// Whether `other` is one of this cell's neighbours.
    pub fn is_adjacent(&self, other: Cell) -> bool {
        self.neighbors().contains(&other)
    }

    /// Euclidean distance between two addresses in `(row, col)` index space.
    ///
    /// This is deliberately not a true hex distance; area effects are
    /// measured this way.
    pub fn index_distance(&self, other: Cell) -> f32 {
        let dr = self.row as f32 - other.row as f32;
        let dc = self.col as f32 - other.col as f32;
        (dr * dr + dc * dc).sqrt()
    }

    /// Pixel center of this cell for the given ceiling offset.
    pub fn to_pixel(&self, vertical_offset: f32) -> Vec2 {
        let x = col_offset(self.row) + self.col as f32 * SPACING + SPACING;
        let y = self.row as f32 * ROW_HEIGHT + SPACING + vertical_offset;
        Vec2::new(x, y)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Every valid cell address, row-major.
pub fn all_cells() -> impl Iterator<Item = Cell> {
    (0..GRID_ROWS).flat_map(|row| (0..row_width(row)).map(move |col| Cell::new(row, col)))
}
