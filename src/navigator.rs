//! Cursor state machine: `NoSelection -> CellSelected -> Editing`.
//!
//! All movement goes through [`SelectionNavigator::select_cell`], which wraps
//! horizontally across row ends and refuses to leave the grid vertically.
//! Scrolling the target into view is the caller's half of the contract, see
//! `EditorSession::select_cell`.

use serde::Serialize;

use crate::types::{CellPosition, GridExtent};

/// Where the cursor is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SelectionState {
    #[default]
    NoSelection,
    CellSelected { cell: CellPosition },
    /// The cell editor is open with an uncommitted draft.
    Editing { cell: CellPosition, draft: String },
}

/// What a single Escape press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EscapeOutcome {
    /// Editing -> CellSelected, draft discarded.
    CancelledEdit,
    /// Fullscreen left; selection untouched.
    ExitedFullscreen,
    /// CellSelected -> NoSelection.
    ClearedSelection,
    Ignored,
}

/// Wraparound addressing within `extent`.
///
/// A column at or past `col_count` continues at column 0 of the next row, a
/// negative column continues at the last column of the previous row, and
/// any resulting row outside `0..row_count` is rejected.
pub fn normalize(row: i64, col: i64, extent: GridExtent) -> Option<CellPosition> {
    let row_count = i64::from(extent.row_count);
    let col_count = i64::from(extent.col_count);
    if col_count == 0 {
        return None;
    }
    let (mut r, mut c) = (row, col);
    if c >= col_count {
        c = 0;
        r += 1;
    } else if c < 0 {
        c = col_count - 1;
        r -= 1;
    }
    if r < 0 || r >= row_count {
        return None;
    }
    Some(CellPosition::new(
        u32::try_from(r).ok()?,
        u32::try_from(c).ok()?,
    ))
}

#[derive(Debug, Clone, Default)]
pub struct SelectionNavigator {
    state: SelectionState,
}

impl SelectionNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> Option<CellPosition> {
        match &self.state {
            SelectionState::NoSelection => None,
            SelectionState::CellSelected { cell } | SelectionState::Editing { cell, .. } => {
                Some(*cell)
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SelectionState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            SelectionState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Move the cursor with wraparound. Out-of-grid targets leave the state
    /// unchanged and return `None`. Selecting always leaves edit mode.
    pub fn select_cell(&mut self, row: i64, col: i64, extent: GridExtent) -> Option<CellPosition> {
        let cell = normalize(row, col, extent)?;
        self.state = SelectionState::CellSelected { cell };
        Some(cell)
    }

    /// Relative move from the current cell; no-op without a selection.
    pub fn move_by(&mut self, d_row: i64, d_col: i64, extent: GridExtent) -> Option<CellPosition> {
        let current = self.selected()?;
        self.select_cell(
            i64::from(current.row) + d_row,
            i64::from(current.col) + d_col,
            extent,
        )
    }

    /// Open the editor on the selected cell with its current editable text.
    pub fn begin_edit(&mut self, initial: String) -> bool {
        match self.state {
            SelectionState::CellSelected { cell } => {
                self.state = SelectionState::Editing {
                    cell,
                    draft: initial,
                };
                true
            }
            _ => false,
        }
    }

    pub fn update_draft(&mut self, text: &str) -> bool {
        match &mut self.state {
            SelectionState::Editing { draft, .. } => {
                text.clone_into(draft);
                true
            }
            _ => false,
        }
    }

    /// Close the editor and hand back the draft for committing.
    pub fn finish_edit(&mut self) -> Option<(CellPosition, String)> {
        match std::mem::take(&mut self.state) {
            SelectionState::Editing { cell, draft } => {
                self.state = SelectionState::CellSelected { cell };
                Some((cell, draft))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Close the editor, discarding the draft.
    pub fn cancel_edit(&mut self) -> bool {
        self.finish_edit().is_some()
    }

    /// Unwind one level. With `fullscreen` set, a window-level Escape that is
    /// not closing an editor exits fullscreen instead of clearing.
    pub fn escape(&mut self, fullscreen: bool) -> EscapeOutcome {
        if self.cancel_edit() {
            return EscapeOutcome::CancelledEdit;
        }
        if fullscreen {
            return EscapeOutcome::ExitedFullscreen;
        }
        match self.state {
            SelectionState::CellSelected { .. } => {
                self.state = SelectionState::NoSelection;
                EscapeOutcome::ClearedSelection
            }
            _ => EscapeOutcome::Ignored,
        }
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::NoSelection;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;

    const EXTENT: GridExtent = GridExtent {
        row_count: 10,
        col_count: 5,
    };

    #[test_case(2, 5, Some((3, 0)) ; "past last column wraps to next row")]
    #[test_case(2, -1, Some((1, 4)) ; "before first column wraps to previous row")]
    #[test_case(0, -1, None ; "wrap above first row")]
    #[test_case(9, 5, None ; "wrap below last row")]
    #[test_case(-1, 0, None ; "above first row")]
    #[test_case(10, 0, None ; "below last row")]
    #[test_case(4, 3, Some((4, 3)) ; "inside")]
    fn test_normalize(row: i64, col: i64, expected: Option<(u32, u32)>) {
        let expected = expected.map(|(r, c)| CellPosition::new(r, c));
        assert_eq!(normalize(row, col, EXTENT), expected);
    }

    #[test]
    fn test_out_of_grid_move_keeps_selection() {
        let mut nav = SelectionNavigator::new();
        nav.select_cell(0, 2, EXTENT);
        assert_eq!(nav.move_by(-1, 0, EXTENT), None);
        assert_eq!(nav.selected(), Some(CellPosition::new(0, 2)));
    }

    #[test]
    fn test_escape_unwinds_one_level() {
        let mut nav = SelectionNavigator::new();
        nav.select_cell(1, 1, EXTENT);
        assert!(nav.begin_edit("draft".into()));
        nav.update_draft("changed");
        assert_eq!(nav.escape(false), EscapeOutcome::CancelledEdit);
        assert_eq!(nav.selected(), Some(CellPosition::new(1, 1)));
        assert!(!nav.is_editing());
        assert_eq!(nav.escape(false), EscapeOutcome::ClearedSelection);
        assert_eq!(nav.selected(), None);
        assert_eq!(nav.escape(false), EscapeOutcome::Ignored);
    }

    #[test]
    fn test_escape_in_fullscreen_keeps_selection() {
        let mut nav = SelectionNavigator::new();
        nav.select_cell(1, 1, EXTENT);
        assert_eq!(nav.escape(true), EscapeOutcome::ExitedFullscreen);
        assert_eq!(nav.selected(), Some(CellPosition::new(1, 1)));
    }

    #[test]
    fn test_finish_edit_returns_draft() {
        let mut nav = SelectionNavigator::new();
        assert!(!nav.begin_edit(String::new()));
        nav.select_cell(3, 0, EXTENT);
        nav.begin_edit("=A1".into());
        let (cell, draft) = nav.finish_edit().unwrap();
        assert_eq!(cell, CellPosition::new(3, 0));
        assert_eq!(draft, "=A1");
        assert_eq!(nav.state(), &SelectionState::CellSelected { cell });
    }
}
