//! The staggered grid that holds all settled bubbles.
//!
//! Storage is a dense row-major `Vec` of optional slots; rows alternate
//! width (see [`row_width`]). A single vertical offset moves every bubble's
//! pixel position at once to simulate a descending ceiling, while logical
//! addresses stay fixed.

use bevy::prelude::*;
use rand::Rng;

use super::{
    bubble::{Bubble, BubbleColor},
    hex::{BUBBLE_RADIUS, Cell, GRID_ROWS, row_width},
};

/// Number of rows filled when a level starts.
pub const INITIAL_ROWS: usize = 5;

/// The grid of settled bubbles.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleGrid {
    rows: Vec<Vec<Option<Bubble>>>,
    /// Downward shift applied to every row, in pixels.
    pub vertical_offset: f32,
}

impl Default for BubbleGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BubbleGrid {
    /// Create an empty grid with no offset.
    pub fn new() -> Self {
        Self {
            rows: (0..GRID_ROWS).map(|r| vec![None; row_width(r)]).collect(),
            vertical_offset: 0.0,
        }
    }

    /// Get the bubble at a cell, including ones that are fading out.
    pub fn get(&self, cell: Cell) -> Option<&Bubble> {
        self.rows.get(cell.row)?.get(cell.col)?.as_ref()
    }

    /// Get the bubble at a cell only if it is not being removed.
    pub fn settled(&self, cell: Cell) -> Option<&Bubble> {
        self.get(cell).filter(|b| !b.is_removing())
    }

    /// Check if a cell holds any bubble.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    /// Place a new bubble at a cell.
    ///
    /// Returns the bubble it replaced, if the cell was occupied. Out-of-bounds
    /// cells are ignored.
    pub fn insert(&mut self, cell: Cell, color: BubbleColor) -> Option<Bubble> {
        let slot = self.rows.get_mut(cell.row)?.get_mut(cell.col)?;
        slot.replace(Bubble::new(color))
    }

    /// Remove a bubble from a cell, freeing it.
    pub fn remove(&mut self, cell: Cell) -> Option<Bubble> {
        self.rows.get_mut(cell.row)?.get_mut(cell.col)?.take()
    }

    /// Start the removal fade for the bubble at a cell.
    ///
    /// Returns false if the cell is empty or already fading.
    pub fn mark_for_removal(&mut self, cell: Cell) -> bool {
        self.rows
            .get_mut(cell.row)
            .and_then(|row| row.get_mut(cell.col))
            .and_then(Option::as_mut)
            .is_some_and(Bubble::mark_for_removal)
    }

    /// Remove every bubble and reset the offset.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(None);
        }
        self.vertical_offset = 0.0;
    }

    /// Iterate over all occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &Bubble)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, slot)| slot.as_ref().map(|b| (Cell::new(r, c), b)))
        })
    }

    /// Iterate over occupied cells that are not being removed, row-major.
    pub fn iter_settled(&self) -> impl Iterator<Item = (Cell, &Bubble)> {
        self.iter().filter(|(_, b)| !b.is_removing())
    }

    /// Get the number of occupied cells, fading ones included.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if the grid has no occupied cells at all.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }

    /// Pixel center of a cell at the current offset.
    pub fn position(&self, cell: Cell) -> Vec2 {
        cell.to_pixel(self.vertical_offset)
    }

    /// Fill the top [`INITIAL_ROWS`] rows with random ordinary colors.
    pub fn populate<R: Rng>(&mut self, rng: &mut R, color_count: u8) {
        self.clear();
        for row in 0..INITIAL_ROWS.min(GRID_ROWS) {
            for col in 0..row_width(row) {
                self.insert(Cell::new(row, col), BubbleColor::random_ordinary(rng, color_count));
            }
        }
        debug!("Populated grid with {} bubbles", self.len());
    }

    /// Advance every removal fade by `step`, freeing cells whose fade is done.
    ///
    /// Returns how many cells were freed.
    pub fn advance_removals(&mut self, step: f32) -> usize {
        let mut freed = 0;
        for slot in self.rows.iter_mut().flatten() {
            if slot.as_mut().is_some_and(|b| b.advance_removal(step)) {
                *slot = None;
                freed += 1;
            }
        }
        freed
    }

    /// Lowest bottom edge among bubbles that are not being removed.
    pub fn lowest_settled_edge(&self) -> Option<f32> {
        self.iter_settled()
            .map(|(cell, _)| self.position(cell).y + BUBBLE_RADIUS)
            .reduce(f32::max)
    }
}
