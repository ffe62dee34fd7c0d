//! Editor configuration.
//!
//! One settings object is handed to the editor at construction; UI
//! preferences such as dark mode live here instead of in global state.

use serde::{Deserialize, Serialize};

/// Default row count at or above which rows are rendered through the
/// windowed virtualizer instead of all at once.
pub const DEFAULT_VIRTUALIZE_THRESHOLD_ROWS: u32 = 1000;

/// Configuration for one editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    /// Dark color scheme.
    pub dark_mode: bool,
    /// Use Cmd instead of Ctrl for shortcuts.
    pub is_mac: bool,
    /// Localized base name for new sheets, e.g. "Sheet1".
    pub new_sheet_base_name: String,
    /// Rows at or above this count switch the grid to windowed rendering.
    pub virtualize_threshold_rows: u32,
    /// Empty rows navigable past the last data row.
    pub row_padding: u32,
    /// Empty columns navigable past the last data column.
    pub col_padding: u32,
    /// Estimated row height in pixels before measurement.
    pub default_row_height: f64,
    /// Estimated column width in pixels before measurement.
    pub default_col_width: f64,
    /// Extra rows rendered beyond each edge of the viewport.
    pub overscan_rows: u32,
    /// Initial viewport width in pixels.
    pub viewport_width: f64,
    /// Initial viewport height in pixels.
    pub viewport_height: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            is_mac: false,
            new_sheet_base_name: "Sheet1".to_string(),
            virtualize_threshold_rows: DEFAULT_VIRTUALIZE_THRESHOLD_ROWS,
            row_padding: 100,
            col_padding: 26,
            default_row_height: 24.0,
            default_col_width: 96.0,
            overscan_rows: 10,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}
