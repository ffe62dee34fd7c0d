//! Structured error types for xlgrid.
//!
//! Only user-visible failures live here: file loads, rejected edits and sheet
//! lifecycle refusals. Formula failures are data (see [`crate::recalc::EvalResult`])
//! and out-of-range coordinates are ignored, so neither ever becomes a `GridError`.

/// All errors that can surface from the grid engine to the host UI.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The dropped/opened file does not have an accepted extension.
    #[error("Unsupported file type: {0} (expected .xlsx, .xls or .csv)")]
    UnsupportedFileType(String),

    /// The workbook codec could not produce a workbook from the file.
    #[error("Could not read workbook: {0}")]
    Decode(String),

    /// A second load was started while another one is still in flight.
    #[error("A workbook is already loading")]
    LoadInProgress,

    /// A load completion arrived for a ticket that is no longer current.
    #[error("Load ticket {0} is not the active load")]
    StaleLoad(u64),

    /// Cell editor text that cannot be coerced to the cell's type.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// A sibling sheet already uses the requested name.
    #[error("A sheet named {0:?} already exists")]
    DuplicateSheetName(String),

    /// Empty or otherwise unusable sheet name.
    #[error("Invalid sheet name: {0:?}")]
    InvalidSheetName(String),

    /// Refused to delete the only remaining sheet.
    #[error("A workbook must keep at least one sheet")]
    LastSheet,

    /// JSON (de)serialization of the codec workbook shape.
    #[error("Serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
