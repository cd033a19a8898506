//! Cluster detection - finding matching and unsupported bubbles.
//!
//! Both the color match and the ceiling connectivity check are breadth-first
//! visits over [`Cell::neighbors`] that skip bubbles already fading out. They
//! share [`flood`] and differ only in which neighbours they admit.

use std::collections::{HashSet, VecDeque};

use super::{
    bubble::{Bubble, BubbleColor},
    grid::BubbleGrid,
    hex::{Cell, GRID_ROWS, row_width},
};

/// Minimum cluster size to pop (match-3).
pub const MIN_MATCH_SIZE: usize = 3;

/// Radius of an area-clear impact, in `(row, col)` index units.
pub const AREA_CLEAR_RADIUS: usize = 2;

/// Breadth-first visit from `seeds` over non-removing bubbles.
///
/// Seeds are included if they hold a non-removing bubble; neighbours are
/// included when `admit` accepts them. Each cell is visited at most once and
/// the result is in visit order.
pub fn flood<F>(grid: &BubbleGrid, seeds: impl IntoIterator<Item = Cell>, admit: F) -> Vec<Cell>
where
    F: Fn(&Bubble) -> bool,
{
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut found = Vec::new();

    for seed in seeds {
        if grid.settled(seed).is_some() && visited.insert(seed) {
            queue.push_back(seed);
        }
    }

    while let Some(cell) = queue.pop_front() {
        found.push(cell);

        for neighbor in cell.neighbors() {
            if visited.contains(&neighbor) {
                continue;
            }
            if grid.settled(neighbor).is_some_and(&admit) {
                visited.insert(neighbor);
                queue.push_back(neighbor);
            }
        }
    }

    found
}

/// Find the color component containing `seed`.
///
/// A neighbour joins when it has the seed's color or is a wildcard. Seeds of
/// a special kind never start a match and yield an empty result.
pub fn find_match(grid: &BubbleGrid, seed: Cell) -> Vec<Cell> {
    let Some(seed_color) = grid.settled(seed).map(|b| b.color) else {
        return Vec::new();
    };
    if seed_color.is_special() {
        return Vec::new();
    }

    flood(grid, [seed], |bubble| {
        bubble.color == seed_color || bubble.color == BubbleColor::Wildcard
    })
}

/// Every occupied cell within [`AREA_CLEAR_RADIUS`] of `center`.
///
/// Bubbles already fading are included; marking them again keeps their
/// current fade progress.
pub fn area_cells(grid: &BubbleGrid, center: Cell) -> Vec<Cell> {
    let radius = AREA_CLEAR_RADIUS as f32;
    let first_row = center.row.saturating_sub(AREA_CLEAR_RADIUS);
    let last_row = (center.row + AREA_CLEAR_RADIUS).min(GRID_ROWS - 1);

    (first_row..=last_row)
        .flat_map(|row| (0..row_width(row)).map(move |col| Cell::new(row, col)))
        .filter(|&cell| center.index_distance(cell) <= radius)
        .filter(|&cell| grid.is_occupied(cell))
        .collect()
}

/// Bubbles no longer connected to the ceiling.
///
/// Runs a visit seeded from every non-removing bubble in row 0; anything
/// non-removing it does not reach is returned in row-major order.
pub fn find_floating(grid: &BubbleGrid) -> Vec<Cell> {
    let ceiling = (0..row_width(0)).map(|col| Cell::new(0, col));
    let anchored: HashSet<Cell> = flood(grid, ceiling, |_| true).into_iter().collect();

    grid.iter_settled()
        .map(|(cell, _)| cell)
        .filter(|cell| !anchored.contains(cell))
        .collect()
}
