//! Editor sheets -> codec workbook.
//!
//! Only sheets the editor touched are rewritten; everything else in the
//! codec workbook passes through as it was loaded.

use serde_json::{json, Value};

use super::{ExternalCell, ExternalSheet, RANGE_KEY};
use crate::cell_ref::{format_cell_range, format_cell_ref};
use crate::error::Result;
use crate::store::Bounds;
use crate::types::{Cell, CellValue, SheetData};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Replace the cell entries of `target` with the contents of `sheet` and
/// recompute its used range. `!` metadata other than the range is kept.
pub fn write_sheet(target: &mut ExternalSheet, sheet: &SheetData) -> Result<()> {
    target.entries.retain(|key, _| key.starts_with('!') && key != RANGE_KEY);

    for (r, row) in sheet.data.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let Some(encoded) = encode_cell(cell) else {
                continue;
            };
            let (Ok(r), Ok(c)) = (u32::try_from(r), u32::try_from(c)) else {
                continue;
            };
            target
                .entries
                .insert(format_cell_ref(r, c), serde_json::to_value(encoded)?);
        }
    }

    let bounds = Bounds::of(&sheet.data);
    target.range = Some(if bounds.rows == 0 || bounds.cols == 0 {
        "A1".to_string()
    } else {
        format_cell_range(0, 0, bounds.rows - 1, bounds.cols - 1)
    });
    log::debug!(
        "wrote sheet {:?} back to the codec workbook ({})",
        sheet.name,
        target.range.as_deref().unwrap_or_default()
    );
    Ok(())
}

/// Codec form of one cell; `None` for slots with no content.
pub fn encode_cell(cell: &Cell) -> Option<ExternalCell> {
    match cell {
        Cell::Empty => None,
        Cell::Literal { value, ty } => {
            if value.is_blank() {
                return None;
            }
            Some(ExternalCell {
                v: Some(encode_value(value)),
                t: Some(ty.tag().to_string()),
                ..ExternalCell::default()
            })
        }
        Cell::Formula {
            source,
            cached_value,
            cached_type,
        } => Some(ExternalCell {
            v: cached_value.as_ref().map(encode_value),
            t: cached_type
                .or_else(|| cached_value.as_ref().map(CellValue::cell_type))
                .map(|t| t.tag().to_string()),
            f: Some(source.clone()),
            ..ExternalCell::default()
        }),
    }
}

fn encode_value(value: &CellValue) -> Value {
    match value {
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::Number(n) => json!(n),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Date(d) => Value::String(d.format(ISO_FORMAT).to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::codec::read_sheet;
    use crate::types::CellType;
    use chrono::NaiveDate;

    #[test]
    fn test_write_recomputes_range_and_keeps_metadata() {
        let mut target: ExternalSheet = serde_json::from_value(json!({
            "!ref": "A1:Z99",
            "!merges": [],
            "Z99": {"v": "stale"}
        }))
        .unwrap();
        let mut sheet = SheetData::blank(1, "S");
        sheet.set_cell(0, 0, Cell::literal(5.0));
        sheet.set_cell(2, 1, Cell::formula("A1*2"));
        sheet.set_cell(4, 4, Cell::literal(""));

        write_sheet(&mut target, &sheet).unwrap();
        assert_eq!(target.range.as_deref(), Some("A1:B3"));
        assert!(target.entries.contains_key("!merges"));
        assert!(!target.entries.contains_key("Z99"));
        assert!(!target.entries.contains_key("E5"));
        assert_eq!(target.entries["A1"], json!({"v": 5.0, "t": "n"}));
        assert_eq!(target.entries["B3"], json!({"f": "A1*2"}));
    }

    #[test]
    fn test_empty_sheet_range() {
        let mut target = ExternalSheet::default();
        write_sheet(&mut target, &SheetData::blank(1, "S")).unwrap();
        assert_eq!(target.range.as_deref(), Some("A1"));
    }

    #[test]
    fn test_cells_survive_a_trip_through_the_codec_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let mut sheet = SheetData::blank(1, "S");
        sheet.set_cell(0, 0, Cell::literal(date));
        sheet.set_cell(0, 1, Cell::Formula {
            source: "A1".into(),
            cached_value: Some(CellValue::Bool(true)),
            cached_type: Some(CellType::Boolean),
        });
        let mut target = ExternalSheet::default();
        write_sheet(&mut target, &sheet).unwrap();
        assert_eq!(read_sheet(&target), sheet.data);
    }
}
