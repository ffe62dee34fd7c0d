//! Boundary with the host's workbook codec.
//!
//! Binary formats are parsed and written by the host. What crosses the
//! boundary is the codec's in-memory workbook: ordered sheet names and, per
//! sheet, a sparse map from A1 address to cell object (`v` value, `t` type
//! tag, `f` formula) plus the `!ref` used-range descriptor. Keys starting
//! with `!` other than `!ref` (merges, column info...) are carried through
//! untouched.

mod export;
mod import;

pub use export::{encode_cell, write_sheet};
pub use import::{decode_cell, read_sheet, read_workbook};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, Result};

/// Key of the used-range descriptor inside a sheet object.
pub const RANGE_KEY: &str = "!ref";

/// One cell object as the codec stores it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<String>,
    /// Formatted text; only consulted for error cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<String>,
}

/// One worksheet object: `!ref` plus address and metadata keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalSheet {
    #[serde(rename = "!ref", default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, Value>,
}

impl ExternalSheet {
    /// A sheet with no cells.
    pub fn blank() -> Self {
        Self {
            range: Some("A1".to_string()),
            entries: BTreeMap::new(),
        }
    }

    /// Address keys, skipping `!` metadata.
    pub fn cell_entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter(|(k, _)| !k.starts_with('!'))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// The codec's workbook object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalWorkbook {
    #[serde(rename = "SheetNames")]
    pub sheet_names: Vec<String>,
    #[serde(rename = "Sheets")]
    pub sheets: BTreeMap<String, ExternalSheet>,
    /// Workbook-level properties the editor does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ExternalWorkbook {
    /// A workbook with one blank sheet.
    pub fn blank(sheet_name: &str) -> Self {
        let mut workbook = Self::default();
        workbook.add_sheet(sheet_name);
        workbook
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn sheet(&self, name: &str) -> Option<&ExternalSheet> {
        self.sheets.get(name)
    }

    /// Append a blank sheet.
    pub fn add_sheet(&mut self, name: &str) {
        self.sheet_names.push(name.to_string());
        self.sheets.insert(name.to_string(), ExternalSheet::blank());
    }

    /// Rename the sheet at `index`, relinking its data under the new name.
    pub fn rename_sheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        let slot = self
            .sheet_names
            .get_mut(index)
            .ok_or_else(|| GridError::Other(format!("no codec sheet at index {index}")))?;
        if slot == new_name {
            return Ok(());
        }
        let old_name = std::mem::replace(slot, new_name.to_string());
        let data = self.sheets.remove(&old_name).unwrap_or_default();
        self.sheets.insert(new_name.to_string(), data);
        Ok(())
    }

    /// Remove the sheet at `index` and its data.
    pub fn remove_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheet_names.len() {
            return Err(GridError::Other(format!("no codec sheet at index {index}")));
        }
        let name = self.sheet_names.remove(index);
        self.sheets.remove(&name);
        Ok(())
    }
}
