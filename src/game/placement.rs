//! Snapping an impact point onto the grid.
//!
//! The row is found first by inverting the row-to-Y formula; the column then
//! uses that row's stagger. Both are rounded to nearest and clamped, so every
//! impact resolves to an in-bounds cell.

use bevy::prelude::*;

use super::{
    bubble::BubbleColor,
    grid::BubbleGrid,
    hex::{Cell, GRID_ROWS, ROW_HEIGHT, SPACING, col_offset, row_width},
};

/// Outcome of committing a projectile to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A bubble was written at this cell.
    Placed(Cell),
    /// An area-clear bubble hit here; nothing was written.
    AreaClear(Cell),
}

/// Nearest cell to a pixel position at the given ceiling offset.
pub fn snap_to_cell(pos: Vec2, vertical_offset: f32) -> Cell {
    let row = ((pos.y - SPACING - vertical_offset) / ROW_HEIGHT).round();
    let row = clamp_index(row, GRID_ROWS);

    let col = ((pos.x - SPACING - col_offset(row)) / SPACING).round();
    let col = clamp_index(col, row_width(row));

    Cell::new(row, col)
}

fn clamp_index(value: f32, len: usize) -> usize {
    // NaN saturates to 0 in the cast.
    (value.max(0.0) as usize).min(len - 1)
}

/// Commit a landed projectile of `color` at `pos`.
///
/// An occupied target cell is overwritten rather than searched around.
pub fn place(grid: &mut BubbleGrid, pos: Vec2, color: BubbleColor) -> Placement {
    let cell = snap_to_cell(pos, grid.vertical_offset);

    if color == BubbleColor::AreaClear {
        return Placement::AreaClear(cell);
    }

    if let Some(previous) = grid.insert(cell, color) {
        debug!(
            "Bubble landed on occupied cell {}, replacing {:?}",
            cell, previous.color
        );
    } else {
        debug!("Bubble landed at {} with color {:?}", cell, color);
    }

    Placement::Placed(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::hex::{FIELD_HEIGHT, FIELD_WIDTH, all_cells};

    #[test]
    fn test_cell_centers_snap_to_themselves() {
        for offset in [0.0, 17.5, 120.0] {
            for cell in all_cells() {
                assert_eq!(snap_to_cell(cell.to_pixel(offset), offset), cell);
            }
        }
    }

    #[test]
    fn test_snapping_is_always_in_bounds() {
        let mut y = -200.0;
        while y < FIELD_HEIGHT + 200.0 {
            let mut x = -200.0;
            while x < FIELD_WIDTH + 200.0 {
                for offset in [0.0, 60.0] {
                    let cell = snap_to_cell(Vec2::new(x, y), offset);
                    assert!(cell.in_bounds(), "({x}, {y}) snapped to {cell}");
                }
                x += 7.0;
            }
            y += 5.0;
        }
    }

    #[test]
    fn test_odd_row_last_column_is_clamped() {
        let cell = snap_to_cell(Vec2::new(FIELD_WIDTH, SPACING + ROW_HEIGHT), 0.0);
        assert_eq!(cell, Cell::new(1, row_width(1) - 1));
    }

    #[test]
    fn test_place_overwrites_occupied_cell() {
        let mut grid = BubbleGrid::new();
        let cell = Cell::new(3, 3);
        grid.insert(cell, BubbleColor::Red);

        let position = grid.position(cell);
        let placement = place(&mut grid, position, BubbleColor::Blue);
        assert_eq!(placement, Placement::Placed(cell));
        assert_eq!(grid.get(cell).map(|b| b.color), Some(BubbleColor::Blue));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_area_clear_places_nothing() {
        let mut grid = BubbleGrid::new();
        let cell = Cell::new(2, 2);
        let position = grid.position(cell);
        let placement = place(&mut grid, position, BubbleColor::AreaClear);
        assert_eq!(placement, Placement::AreaClear(cell));
        assert!(grid.is_empty());
    }
}
