//! Test fixtures for building codec workbooks in memory.
//!
//! # Example
//!
//! ```rust
//! use fixtures::WorkbookBuilder;
//!
//! let workbook = WorkbookBuilder::new()
//!     .add_sheet("Data")
//!     .add_cell("A1", 5)
//!     .add_formula("A2", "A1*2", 10)
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use serde_json::{json, Map, Value};
use xlgrid::cell_ref::{format_cell_range, parse_cell_ref};
use xlgrid::codec::ExternalWorkbook;

struct SheetFixture {
    name: String,
    cells: Map<String, Value>,
}

/// Builds the workbook object a host codec would hand over.
#[derive(Default)]
pub struct WorkbookBuilder {
    sheets: Vec<SheetFixture>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new sheet; later cells go into it.
    pub fn add_sheet(mut self, name: &str) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_string(),
            cells: Map::new(),
        });
        self
    }

    /// Add a literal; the type tag follows the JSON type.
    pub fn add_cell(self, address: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let tag = match &value {
            Value::Bool(_) => "b",
            Value::Number(_) => "n",
            _ => "s",
        };
        self.add_raw(address, json!({ "v": value, "t": tag }))
    }

    /// Add a formula with the result the codec cached for it.
    pub fn add_formula(self, address: &str, formula: &str, cached: impl Into<Value>) -> Self {
        self.add_raw(address, json!({ "f": formula, "v": cached.into(), "t": "n" }))
    }

    /// Add an arbitrary cell object.
    pub fn add_raw(mut self, address: &str, cell: Value) -> Self {
        let sheet = self
            .sheets
            .last_mut()
            .expect("add_sheet must be called before adding cells");
        sheet.cells.insert(address.to_string(), cell);
        self
    }

    pub fn build(self) -> ExternalWorkbook {
        let mut names = Vec::new();
        let mut sheets = Map::new();
        for sheet in self.sheets {
            let mut object = sheet.cells;
            object.insert("!ref".to_string(), Value::String(used_range(&object)));
            names.push(Value::String(sheet.name.clone()));
            sheets.insert(sheet.name, Value::Object(object));
        }
        serde_json::from_value(json!({ "SheetNames": names, "Sheets": sheets }))
            .expect("fixture workbook should deserialize")
    }
}

fn used_range(cells: &Map<String, Value>) -> String {
    let coords: Vec<(u32, u32)> = cells.keys().filter_map(|k| parse_cell_ref(k)).collect();
    let rows = coords.iter().map(|c| c.0).max().unwrap_or(0);
    let cols = coords.iter().map(|c| c.1).max().unwrap_or(0);
    format_cell_range(0, 0, rows, cols)
}
