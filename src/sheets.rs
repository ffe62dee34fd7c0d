//! Ordered sheets of the loaded workbook plus the active index.

use crate::error::{GridError, Result};
use crate::types::SheetData;

/// Fallback prefix when a localized base name is all digits or blank.
const DEFAULT_PREFIX: &str = "Sheet";

/// First free name derived from `base`.
///
/// A trailing number on `base` is the first suffix tried ("Sheet1" tries
/// Sheet1, Sheet2, ...). A base without a number is used verbatim when free,
/// otherwise suffixes are tried from 1.
pub fn next_sheet_name<'a>(existing: impl IntoIterator<Item = &'a str>, base: &str) -> String {
    let used: std::collections::HashSet<&str> = existing.into_iter().collect();
    let trimmed = base.trim();
    let digits_at = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    let (prefix, start) = match digits_at {
        Some(i) => {
            let (prefix, digits) = trimmed.split_at(i);
            let start = digits.parse::<u64>().ok().filter(|n| *n > 0).unwrap_or(1);
            (prefix, start)
        }
        None => {
            if !trimmed.is_empty() && !used.contains(trimmed) {
                return trimmed.to_string();
            }
            (trimmed, 1)
        }
    };
    let prefix = if prefix.is_empty() {
        DEFAULT_PREFIX
    } else {
        prefix
    };

    let mut counter = start;
    loop {
        let candidate = format!("{prefix}{counter}");
        if !used.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Sheets in tab order. Always holds at least one sheet once built, and
/// `active` is always a valid index.
#[derive(Debug, Clone)]
pub struct SheetCollection {
    sheets: Vec<SheetData>,
    active: usize,
    next_id: u32,
}

impl SheetCollection {
    /// Adopt imported sheets. Ids are reassigned 1..=n in tab order. An
    /// empty import gets one blank sheet named `fallback_name`.
    pub fn from_sheets(mut sheets: Vec<SheetData>, fallback_name: &str) -> Self {
        if sheets.is_empty() {
            sheets.push(SheetData::blank(0, fallback_name));
        }
        let mut next_id = 1;
        for sheet in &mut sheets {
            sheet.id = next_id;
            next_id += 1;
        }
        Self {
            sheets,
            active: 0,
            next_id,
        }
    }

    /// A workbook with a single blank sheet.
    pub fn blank(name: &str) -> Self {
        Self::from_sheets(Vec::new(), name)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheets(&self) -> &[SheetData] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [SheetData] {
        &mut self.sheets
    }

    pub fn get(&self, index: usize) -> Option<&SheetData> {
        self.sheets.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SheetData> {
        self.sheets.get_mut(index)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&SheetData> {
        self.sheets.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut SheetData> {
        self.sheets.get_mut(self.active)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Whether a sheet other than `except` already uses `name`.
    pub fn is_name_taken(&self, name: &str, except: Option<usize>) -> bool {
        self.sheets
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != except && s.name == name)
    }

    /// Switch tabs. Returns false for out-of-range or unchanged indices.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.sheets.len() || index == self.active {
            return false;
        }
        self.active = index;
        true
    }

    /// Append a blank sheet named from `localized_base` and make it active.
    /// Returns its index.
    pub fn add_sheet(&mut self, localized_base: &str) -> usize {
        let name = next_sheet_name(self.names(), localized_base);
        let id = self.next_id;
        self.next_id += 1;
        log::info!("adding sheet {name:?} (id {id})");
        self.sheets.push(SheetData::blank(id, name));
        self.active = self.sheets.len() - 1;
        self.active
    }

    /// Rename in place. Returns the old name.
    pub fn rename_sheet(&mut self, index: usize, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GridError::InvalidSheetName(name.to_string()));
        }
        if self.is_name_taken(name, Some(index)) {
            return Err(GridError::DuplicateSheetName(name.to_string()));
        }
        let sheet = self
            .sheets
            .get_mut(index)
            .ok_or_else(|| GridError::Other(format!("no sheet at index {index}")))?;
        Ok(std::mem::replace(&mut sheet.name, name.to_string()))
    }

    /// Remove a sheet. The last remaining sheet cannot be removed.
    ///
    /// The active index follows the sheet that was active; when the active
    /// sheet itself is removed the previous sheet becomes active.
    pub fn delete_sheet(&mut self, index: usize) -> Result<SheetData> {
        if self.sheets.len() <= 1 {
            return Err(GridError::LastSheet);
        }
        if index >= self.sheets.len() {
            return Err(GridError::Other(format!("no sheet at index {index}")));
        }
        let removed = self.sheets.remove(index);
        if index < self.active || (index == self.active && index > 0) {
            self.active -= 1;
        }
        self.active = self.active.min(self.sheets.len() - 1);
        log::info!("deleted sheet {:?}", removed.name);
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&["Sheet1"], "Sheet1", "Sheet2" ; "numbered base counts upward")]
    #[test_case(&[], "Sheet1", "Sheet1" ; "numbered base free")]
    #[test_case(&["Data"], "Data", "Data1" ; "plain base taken")]
    #[test_case(&[], "Data", "Data" ; "plain base free")]
    #[test_case(&["Hoja1", "Hoja2"], "  Hoja1 ", "Hoja3" ; "trimmed localized base")]
    #[test_case(&[], "2024", "Sheet2024" ; "digits only")]
    #[test_case(&["Sheet1"], "Sheet0", "Sheet2" ; "zero suffix starts at one")]
    #[test_case(&["Sheet1"], "", "Sheet2" ; "blank base")]
    fn test_next_sheet_name(existing: &[&str], base: &str, expected: &str) {
        assert_eq!(next_sheet_name(existing.iter().copied(), base), expected);
    }

    fn three() -> SheetCollection {
        SheetCollection::from_sheets(
            vec![
                SheetData::blank(0, "A"),
                SheetData::blank(0, "B"),
                SheetData::blank(0, "C"),
            ],
            "Sheet1",
        )
    }

    #[test]
    fn test_ids_are_monotone() {
        let mut sheets = three();
        sheets.delete_sheet(2).unwrap();
        let idx = sheets.add_sheet("Sheet1");
        assert_eq!(sheets.get(idx).unwrap().id, 4);
        assert_eq!(sheets.active_index(), idx);
    }

    #[test]
    fn test_delete_last_sheet_fails() {
        let mut sheets = SheetCollection::blank("Sheet1");
        assert!(matches!(sheets.delete_sheet(0), Err(GridError::LastSheet)));
        assert_eq!(sheets.len(), 1);
    }

    #[test_case(1, 1, 0 ; "removing active picks previous")]
    #[test_case(2, 2, 1 ; "removing last active picks previous")]
    #[test_case(0, 0, 0 ; "removing first active stays at first")]
    #[test_case(2, 0, 1 ; "removing before active shifts down")]
    #[test_case(0, 2, 0 ; "removing after active keeps it")]
    fn test_delete_clamps_active(active: usize, removed: usize, expected: usize) {
        let mut sheets = three();
        sheets.set_active(active);
        sheets.delete_sheet(removed).unwrap();
        assert_eq!(sheets.active_index(), expected);
    }

    #[test]
    fn test_rename_rejects_duplicates_and_blank() {
        let mut sheets = three();
        assert!(matches!(
            sheets.rename_sheet(0, "B"),
            Err(GridError::DuplicateSheetName(_))
        ));
        assert!(matches!(
            sheets.rename_sheet(0, "  "),
            Err(GridError::InvalidSheetName(_))
        ));
        assert_eq!(sheets.rename_sheet(0, "A").unwrap(), "A");
        assert_eq!(sheets.rename_sheet(1, "Totals").unwrap(), "B");
        assert_eq!(sheets.get(1).unwrap().name, "Totals");
    }
}
