use serde::{Deserialize, Serialize};

/// A single selected cell, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    pub row: u32,
    pub col: u32,
}

impl CellPosition {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Navigable extent of the active sheet: data bounds plus padding, columns
/// capped at `ZZZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridExtent {
    pub row_count: u32,
    pub col_count: u32,
}
