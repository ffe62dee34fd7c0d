//! Sparse-per-sheet cell storage.
//!
//! The matrix grows lazily on write: writing past the current extent appends
//! rows and right-pads the target row with [`Cell::Empty`]. Reads past the
//! extent return an empty cell. Neither direction can fail on an index.

mod bounds;

pub use bounds::{last_non_empty_col, last_non_empty_row, Bounds, BoundsTracker};

use crate::types::{Cell, GridData, SheetData};

static EMPTY_CELL: Cell = Cell::Empty;

/// Read a slot, returning [`Cell::Empty`] for anything outside the matrix.
pub fn get_cell(data: &GridData, row: u32, col: u32) -> &Cell {
    data.get(row as usize)
        .and_then(|r| r.get(col as usize))
        .unwrap_or(&EMPTY_CELL)
}

/// Replace a slot, growing the matrix as needed. Returns the previous cell.
pub fn set_cell(data: &mut GridData, row: u32, col: u32, cell: Cell) -> Cell {
    let row_idx = row as usize;
    let col_idx = col as usize;

    if data.len() <= row_idx {
        data.resize_with(row_idx + 1, Vec::new);
    }
    let Some(target_row) = data.get_mut(row_idx) else {
        return Cell::Empty;
    };
    if target_row.len() <= col_idx {
        target_row.resize_with(col_idx + 1, Cell::default);
    }
    match target_row.get_mut(col_idx) {
        Some(slot) => std::mem::replace(slot, cell),
        None => Cell::Empty,
    }
}

impl SheetData {
    pub fn get_cell(&self, row: u32, col: u32) -> &Cell {
        get_cell(&self.data, row, col)
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) -> Cell {
        set_cell(&mut self.data, row, col, cell)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::of(&self.data)
    }
}
