//! Cell editor text <-> cell conversion.

use chrono::{NaiveDate, NaiveDateTime};

use crate::display::display_value;
use crate::error::{GridError, Result};
use crate::types::{Cell, CellType, CellValue};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Coerce committed editor text into a cell.
///
/// - blank text clears the cell
/// - a leading `=` makes a formula
/// - a date-typed cell only accepts date text; anything else is rejected
/// - `true`/`false` (any case) become booleans
/// - finite numbers become numbers
/// - everything else is kept verbatim as text
pub fn coerce_input(text: &str, current: Option<CellType>) -> Result<Cell> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Cell::Empty);
    }
    if trimmed.len() > 1 && trimmed.starts_with('=') {
        return Ok(Cell::formula(trimmed));
    }
    if current == Some(CellType::Date) {
        return parse_date_input(trimmed)
            .map(Cell::literal)
            .ok_or_else(|| GridError::InvalidInput(format!("{trimmed:?} is not a date (YYYY-MM-DD)")));
    }
    Ok(Cell::literal(detect_value(trimmed, text)))
}

fn detect_value(trimmed: &str, original: &str) -> CellValue {
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if let Some(n) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) {
        return CellValue::Number(n);
    }
    CellValue::Text(original.to_string())
}

/// `YYYY-MM-DD`, optionally followed by a time.
pub fn parse_date_input(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Text the cell editor opens with: formulas as `=source`, values as shown.
pub fn editable_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Literal { value, .. } => display_value(value),
        Cell::Formula { source, .. } => format!("={source}"),
    }
}
