//! Undo/redo over single-cell mutations.
//!
//! Each entry stores the cell a mutation replaced. Applying an entry swaps
//! that cell back in and files the displaced cell on the opposite stack, so
//! undo and redo are the same operation in two directions.

use crate::types::{Cell, CellPosition, SheetData};

/// One reversible cell mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub sheet_index: usize,
    pub row: u32,
    pub col: u32,
    /// The cell that was in the slot before the mutation.
    pub prev_cell: Cell,
}

/// Where an undo/redo landed, for recalculation and reselection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEdit {
    pub sheet_index: usize,
    pub cell: CellPosition,
}

#[derive(Debug, Clone, Default)]
pub struct UndoRedoLog {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
}

impl UndoRedoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh edit. Invalidates everything that could be redone.
    pub fn record(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Revert the most recent edit in `sheets`.
    pub fn undo(&mut self, sheets: &mut [SheetData]) -> Option<AppliedEdit> {
        let entry = self.undo_stack.pop()?;
        let (applied, displaced) = apply(entry, sheets)?;
        self.redo_stack.push(displaced);
        Some(applied)
    }

    /// Re-apply the most recently undone edit in `sheets`.
    pub fn redo(&mut self, sheets: &mut [SheetData]) -> Option<AppliedEdit> {
        let entry = self.redo_stack.pop()?;
        let (applied, displaced) = apply(entry, sheets)?;
        self.undo_stack.push(displaced);
        Some(applied)
    }

    /// Drop both stacks (sheet switch, sheet delete, workbook load).
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn apply(entry: UndoEntry, sheets: &mut [SheetData]) -> Option<(AppliedEdit, UndoEntry)> {
    let Some(sheet) = sheets.get_mut(entry.sheet_index) else {
        log::debug!("dropping history entry for missing sheet {}", entry.sheet_index);
        return None;
    };
    let current = sheet.set_cell(entry.row, entry.col, entry.prev_cell);
    let applied = AppliedEdit {
        sheet_index: entry.sheet_index,
        cell: CellPosition::new(entry.row, entry.col),
    };
    let displaced = UndoEntry {
        sheet_index: entry.sheet_index,
        row: entry.row,
        col: entry.col,
        prev_cell: current,
    };
    Some((applied, displaced))
}
