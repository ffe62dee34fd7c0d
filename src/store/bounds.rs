//! Data extent of a sheet.
//!
//! Both bounds are 1-based exclusive: an empty sheet is `(0, 0)` and a sheet
//! whose last content sits at `(r, c)` reports `(r + 1, c + 1)`.

use serde::Serialize;

use crate::types::{Cell, GridData};

/// Number of leading rows that contain data.
///
/// Scans backward from the end while the last row holds no formula and no
/// non-empty literal.
pub fn last_non_empty_row(data: &[Vec<Cell>]) -> u32 {
    let mut last = data.len();
    while last > 0 {
        let has_data = data
            .get(last - 1)
            .is_some_and(|row| row.iter().any(Cell::has_content));
        if has_data {
            break;
        }
        last -= 1;
    }
    u32::try_from(last).unwrap_or(u32::MAX)
}

/// Number of leading columns that contain data, over the longest row.
pub fn last_non_empty_col(data: &[Vec<Cell>]) -> u32 {
    let last = data
        .iter()
        .filter_map(|row| row.iter().rposition(Cell::has_content))
        .max()
        .map_or(0, |idx| idx + 1);
    u32::try_from(last).unwrap_or(u32::MAX)
}

/// Row/column extent containing all non-empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Bounds {
    pub rows: u32,
    pub cols: u32,
}

impl Bounds {
    pub fn of(data: &GridData) -> Self {
        Self {
            rows: last_non_empty_row(data),
            cols: last_non_empty_col(data),
        }
    }
}

/// Caches the active sheet's bounds between mutations so renders never rescan.
#[derive(Debug, Clone, Default)]
pub struct BoundsTracker {
    current: Bounds,
}

impl BoundsTracker {
    pub fn new(data: &GridData) -> Self {
        Self {
            current: Bounds::of(data),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.current
    }

    /// Recompute after a mutation. Returns true when the extent changed.
    pub fn refresh(&mut self, data: &GridData) -> bool {
        let next = Bounds::of(data);
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::store::set_cell;

    #[test]
    fn test_empty_sheet_bounds() {
        let data: GridData = Vec::new();
        assert_eq!(Bounds::of(&data), Bounds { rows: 0, cols: 0 });
    }

    #[test]
    fn test_trailing_blank_rows_ignored() {
        let data: GridData = vec![
            vec![Cell::literal(1.0)],
            vec![Cell::Empty, Cell::literal("")],
            vec![],
        ];
        assert_eq!(last_non_empty_row(&data), 1);
        assert_eq!(last_non_empty_col(&data), 1);
    }

    #[test]
    fn test_formula_without_cache_counts() {
        let data: GridData = vec![vec![], vec![Cell::Empty, Cell::Empty, Cell::formula("1/0")]];
        assert_eq!(Bounds::of(&data), Bounds { rows: 2, cols: 3 });
    }

    #[test]
    fn test_distant_write_expands_immediately() {
        let mut data: GridData = Vec::new();
        set_cell(&mut data, 999, 77, Cell::literal("far"));
        assert_eq!(Bounds::of(&data), Bounds { rows: 1000, cols: 78 });
    }

    #[test]
    fn test_tracker_reports_change() {
        let mut data: GridData = Vec::new();
        let mut tracker = BoundsTracker::new(&data);
        assert!(!tracker.refresh(&data));
        set_cell(&mut data, 2, 2, Cell::literal(1.0));
        assert!(tracker.refresh(&data));
        assert_eq!(tracker.bounds(), Bounds { rows: 3, cols: 3 });
    }
}
