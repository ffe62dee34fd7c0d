use serde::{Deserialize, Serialize};

use super::Cell;

/// Dense-per-row cell matrix. Rows may have different lengths; a missing
/// trailing entry reads as [`Cell::Empty`].
pub type GridData = Vec<Vec<Cell>>;

/// A single worksheet held by the editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    /// Unique within the session, assigned in increasing order.
    pub id: u32,
    /// Unique within the workbook.
    pub name: String,
    pub data: GridData,
}

impl SheetData {
    /// A sheet with no rows.
    pub fn blank(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            data: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Longest row length in the matrix.
    pub fn max_row_len(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }
}
