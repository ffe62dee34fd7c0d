//! Find-in-sheet over displayed text.

use crate::display::display_cell;
use crate::types::{CellPosition, GridData};

/// Ordered matches for the current query plus a cycling cursor.
#[derive(Debug, Clone, Default)]
pub struct FindIndex {
    query: String,
    matches: Vec<CellPosition>,
    cursor: usize,
}

impl FindIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Change the query and rescan. Returns the first match, if any; the
    /// cursor is reset to it.
    pub fn set_query(&mut self, query: &str, data: &GridData) -> Option<CellPosition> {
        query.clone_into(&mut self.query);
        self.cursor = 0;
        self.matches = scan(&self.query, data);
        self.current()
    }

    /// Rescan with the current query after the data changed. The cursor
    /// keeps its position, clamped to the new match count.
    pub fn rescan(&mut self, data: &GridData) {
        self.matches = scan(&self.query, data);
        self.cursor = self.cursor.min(self.matches.len().saturating_sub(1));
    }

    /// Forget the query and all matches.
    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.cursor = 0;
    }

    pub fn matches(&self) -> &[CellPosition] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Index of the current match; meaningless while there are none.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<CellPosition> {
        self.matches.get(self.cursor).copied()
    }

    /// Advance to the next match, wrapping after the last.
    pub fn next(&mut self) -> Option<CellPosition> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        self.cursor = (self.cursor + 1) % count;
        self.current()
    }

    /// Step back to the previous match, wrapping before the first.
    pub fn prev(&mut self) -> Option<CellPosition> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        self.cursor = (self.cursor + count - 1) % count;
        self.current()
    }
}

/// Row-major case-insensitive substring scan over display text.
fn scan(query: &str, data: &GridData) -> Vec<CellPosition> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let mut found = Vec::new();
    for (r, row) in data.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.has_content() {
                continue;
            }
            if display_cell(cell).to_lowercase().contains(&needle) {
                if let (Ok(r), Ok(c)) = (u32::try_from(r), u32::try_from(c)) {
                    found.push(CellPosition::new(r, c));
                }
            }
        }
    }
    found
}
