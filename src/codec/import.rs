//! Codec workbook -> editor sheets.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::{ExternalCell, ExternalSheet, ExternalWorkbook};
use crate::cell_ref::{is_valid_cell, parse_cell_ref};
use crate::store::set_cell;
use crate::types::{Cell, CellType, CellValue, GridData, SheetData};

/// Flatten every sheet in tab order. Ids are provisional; the sheet
/// collection assigns the final ones.
pub fn read_workbook(workbook: &ExternalWorkbook) -> Vec<SheetData> {
    workbook
        .sheet_names
        .iter()
        .zip(1u32..)
        .map(|(name, id)| {
            let data = match workbook.sheet(name) {
                Some(sheet) => read_sheet(sheet),
                None => {
                    log::warn!("sheet {name:?} listed without data; importing it blank");
                    Vec::new()
                }
            };
            SheetData {
                id,
                name: name.clone(),
                data,
            }
        })
        .collect()
}

/// Flatten a sparse sheet into the row matrix. Unparseable addresses and
/// cell objects are skipped.
pub fn read_sheet(sheet: &ExternalSheet) -> GridData {
    let mut data = GridData::new();
    for (address, raw) in sheet.cell_entries() {
        let Some((row, col)) = parse_cell_ref(address).filter(|&(r, c)| is_valid_cell(r, c)) else {
            log::debug!("skipping codec key {address:?}");
            continue;
        };
        let cell = match serde_json::from_value::<ExternalCell>(raw.clone()) {
            Ok(cell) => decode_cell(&cell),
            Err(e) => {
                log::warn!("skipping malformed cell {address}: {e}");
                continue;
            }
        };
        if cell != Cell::Empty {
            set_cell(&mut data, row, col, cell);
        }
    }
    data
}

/// Convert one codec cell. A declared type tag coerces the value when the
/// value can be read as that type; otherwise the value keeps its own type.
pub fn decode_cell(cell: &ExternalCell) -> Cell {
    let declared = cell.t.as_deref().and_then(CellType::from_tag);
    let value = match cell.t.as_deref() {
        Some("z") => None,
        Some("e") => cell.w.clone().map(CellValue::Text),
        _ => cell
            .v
            .as_ref()
            .and_then(|v| decode_value(v, declared))
            .map(|value| coerce_to(value, declared)),
    };

    if let Some(source) = cell.f.as_deref().filter(|f| !f.is_empty()) {
        let cached_type = value.as_ref().map(CellValue::cell_type);
        return Cell::Formula {
            source: source.strip_prefix('=').unwrap_or(source).to_string(),
            cached_value: value,
            cached_type,
        };
    }

    match value {
        Some(value) => {
            let ty = value.cell_type();
            Cell::Literal { value, ty }
        }
        None => Cell::Empty,
    }
}

/// Text under a numeric or boolean tag is converted when it parses.
fn coerce_to(value: CellValue, declared: Option<CellType>) -> CellValue {
    match (declared, value) {
        (Some(CellType::Number), CellValue::Text(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(s),
        },
        (Some(CellType::Boolean), CellValue::Text(s)) => {
            if s.trim().eq_ignore_ascii_case("true") {
                CellValue::Bool(true)
            } else if s.trim().eq_ignore_ascii_case("false") {
                CellValue::Bool(false)
            } else {
                CellValue::Text(s)
            }
        }
        (_, value) => value,
    }
}

fn decode_value(v: &Value, declared: Option<CellType>) -> Option<CellValue> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(CellValue::Bool(*b)),
        Value::Number(n) => {
            let n = n.as_f64()?;
            if declared == Some(CellType::Date) {
                return date_from_serial(n).map(CellValue::Date);
            }
            Some(CellValue::Number(n))
        }
        Value::String(s) => {
            if declared == Some(CellType::Date) {
                if let Some(d) = parse_iso_date(s) {
                    return Some(CellValue::Date(d));
                }
            }
            Some(CellValue::Text(s.clone()))
        }
        Value::Array(_) | Value::Object(_) => Some(CellValue::Text(v.to_string())),
    }
}

/// ISO 8601 as produced by `Date.toISOString()` or a bare date.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Spreadsheet serial day number (1899-12-30 epoch) to a timestamp.
fn date_from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if millis.abs() > 1e15 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)] // bounded above
    let millis = millis as i64;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell(value: Value) -> ExternalCell {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_untyped_value_derives_type() {
        assert_eq!(decode_cell(&cell(json!({"v": 3}))), Cell::literal(3.0));
        assert_eq!(decode_cell(&cell(json!({"v": true}))), Cell::literal(true));
        assert_eq!(decode_cell(&cell(json!({"v": "x"}))), Cell::literal("x"));
    }

    #[test]
    fn test_declared_type_coerces_text() {
        assert_eq!(
            decode_cell(&cell(json!({"v": "12", "t": "n"}))),
            Cell::literal(12.0)
        );
        assert_eq!(
            decode_cell(&cell(json!({"v": "TRUE", "t": "b"}))),
            Cell::literal(true)
        );
    }

    #[test]
    fn test_declared_type_that_does_not_fit_falls_back() {
        for raw in [
            json!({"v": "n/a", "t": "n"}),
            json!({"v": 12, "t": "s"}),
            json!({"v": "maybe", "t": "b"}),
            json!({"v": "soon", "t": "d"}),
            json!({"f": "A1", "v": "x", "t": "n"}),
        ] {
            let decoded = decode_cell(&cell(raw.clone()));
            let value = decoded.value().unwrap();
            assert_eq!(decoded.cell_type(), Some(value.cell_type()), "{raw}");
        }
    }

    #[test]
    fn test_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let iso = decode_cell(&cell(json!({"v": "2024-03-01T00:00:00.000Z", "t": "d"})));
        assert_eq!(iso.value(), Some(&CellValue::Date(expected)));
        let serial = decode_cell(&cell(json!({"v": 45352, "t": "d"})));
        assert_eq!(serial.value(), Some(&CellValue::Date(expected)));
    }

    #[test]
    fn test_formula_keeps_cache() {
        let decoded = decode_cell(&cell(json!({"f": "A1*2", "v": 10, "t": "n"})));
        assert_eq!(decoded.formula_source(), Some("A1*2"));
        assert_eq!(decoded.value(), Some(&CellValue::Number(10.0)));
        let uncached = decode_cell(&cell(json!({"f": "=SUM(A:A)"})));
        assert_eq!(uncached.formula_source(), Some("SUM(A:A)"));
        assert_eq!(uncached.value(), None);
    }

    #[test]
    fn test_error_and_stub_cells() {
        let err = decode_cell(&cell(json!({"v": 7, "t": "e", "w": "#DIV/0!"})));
        assert_eq!(err, Cell::Literal {
            value: CellValue::Text("#DIV/0!".into()),
            ty: CellType::String,
        });
        assert_eq!(decode_cell(&cell(json!({"t": "z"}))), Cell::Empty);
    }

    #[test]
    fn test_read_sheet_is_dense_per_row() {
        let sheet: ExternalSheet = serde_json::from_value(json!({
            "!ref": "A1:C3",
            "!cols": [],
            "C3": {"v": 1},
            "A1": {"v": "a"},
            "bogus": {"v": 2}
        }))
        .unwrap();
        let data = read_sheet(&sheet);
        assert_eq!(data.len(), 3);
        assert_eq!(data[0], vec![Cell::literal("a")]);
        assert!(data[1].is_empty());
        assert_eq!(data[2][2], Cell::literal(1.0));
        assert_eq!(data[2][0], Cell::Empty);
    }

    #[test]
    fn test_read_workbook_keeps_order() {
        let wb: ExternalWorkbook = serde_json::from_value(json!({
            "SheetNames": ["Z", "A"],
            "Sheets": {"A": {"A1": {"v": 1}}, "Z": {}}
        }))
        .unwrap();
        let sheets = read_workbook(&wb);
        assert_eq!(sheets[0].name, "Z");
        assert!(sheets[0].data.is_empty());
        assert_eq!(sheets[1].get_cell(0, 0), &Cell::literal(1.0));
    }
}
