//! User-visible text for cell values.
//!
//! Find and the grid share these rules so a search matches exactly what the
//! user sees, not the raw stored value.

use chrono::{NaiveDateTime, Timelike};

use crate::types::{Cell, CellValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a value for display in a grid cell.
pub fn display_value(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::Date(d) => format_date(d),
    }
}

/// Formats a cell; formulas show their cached result, errors show nothing.
pub fn display_cell(cell: &Cell) -> String {
    cell.value().map(display_value).unwrap_or_default()
}

/// Shortest round-trip form, integers without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // -0.0 displays as 0
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

/// Dates at midnight show the date only.
pub fn format_date(d: &NaiveDateTime) -> String {
    let t = d.time();
    if t.hour() == 0 && t.minute() == 0 && t.second() == 0 {
        d.format(DATE_FORMAT).to_string()
    } else {
        d.format(DATE_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    #[test_case(10.0, "10" ; "integer")]
    #[test_case(0.1, "0.1" ; "fraction")]
    #[test_case(-2.5, "-2.5" ; "negative")]
    #[test_case(-0.0, "0" ; "negative zero")]
    #[test_case(1e21, "1000000000000000000000" ; "large")]
    fn test_format_number(n: f64, expected: &str) {
        assert_eq!(format_number(n), expected);
    }

    #[test]
    fn test_booleans_upper_case() {
        assert_eq!(display_value(&CellValue::Bool(true)), "TRUE");
        assert_eq!(display_value(&CellValue::Bool(false)), "FALSE");
    }

    #[test]
    fn test_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let midnight = day.and_hms_opt(0, 0, 0).unwrap();
        let afternoon = day.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(format_date(&midnight), "2024-03-09");
        assert_eq!(format_date(&afternoon), "2024-03-09 13:05:00");
    }

    #[test]
    fn test_formula_display_uses_cache() {
        let errored = Cell::formula("1/0");
        assert_eq!(display_cell(&errored), "");
        let computed = Cell::Formula {
            source: "A1*2".into(),
            cached_value: Some(CellValue::Number(10.0)),
            cached_type: None,
        };
        assert_eq!(display_cell(&computed), "10");
    }
}
