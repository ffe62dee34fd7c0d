//! Common test utilities and assertion helpers.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use xlgrid::codec::ExternalWorkbook;
use xlgrid::{EditorSession, EditorSettings};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// A session on a blank workbook with default settings.
#[must_use]
pub fn blank_session() -> EditorSession {
    EditorSession::new(EditorSettings::default())
}

/// A session with `workbook` loaded under `file_name`.
#[must_use]
pub fn loaded_session(file_name: &str, workbook: ExternalWorkbook) -> EditorSession {
    let mut session = blank_session();
    session
        .load_workbook(file_name, workbook)
        .expect("fixture workbook should load");
    session
}

/// Type a value into a cell, panicking if the edit is rejected.
pub fn type_into(session: &mut EditorSession, row: u32, col: u32, text: &str) {
    session
        .commit_text(row, col, text)
        .unwrap_or_else(|e| panic!("edit at ({row}, {col}) rejected: {e}"));
}

/// Display text of each cell in a column of the active sheet.
#[must_use]
pub fn column_text(session: &EditorSession, col: u32, rows: u32) -> Vec<String> {
    (0..rows).map(|r| session.display_text(r, col)).collect()
}
