//! xlgrid - spreadsheet grid engine for the web
//!
//! Edits workbooks in the browser via WebAssembly:
//! - Sparse per-sheet cell store that grows on write
//! - Virtualized viewport for sheets with up to ~10^6 rows
//! - Formula recalculation after every edit
//! - Undo/redo, find, sheet tabs, keyboard navigation
//!
//! Binary file formats are decoded and encoded by the host's workbook codec;
//! this crate consumes and produces the codec's in-memory workbook object.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { XlGrid } from 'xlgrid';
//! await init();
//! const grid = new XlGrid({ isMac: true });
//! grid.attachKeyboard();
//! await grid.loadFile(file.name, decodeWithCodec(file));
//! grid.setCellText(0, 0, '=1+2');
//! const out = grid.exportWorkbook();
//! ```

pub mod cell_ref;
pub mod codec;
pub mod display;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod find;
pub mod history;
pub mod layout;
pub mod navigator;
pub mod recalc;
pub mod settings;
pub mod sheets;
pub mod store;
pub mod types;

#[cfg(target_arch = "wasm32")]
mod bindings;

#[cfg(target_arch = "wasm32")]
pub use bindings::XlGrid;

use wasm_bindgen::prelude::*;

pub use editor::EditorSession;
pub use error::{GridError, Result};
pub use settings::EditorSettings;
pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
