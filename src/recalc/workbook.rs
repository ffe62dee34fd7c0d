//! Default formula collaborator backed by `formualizer`.
//!
//! Every recalculation loads the input matrix into a fresh
//! [`formualizer_workbook::Workbook`] and runs one `evaluate_all` pass. The
//! engine schedules formulas in dependency layers, so long reference chains
//! are evaluated without recursing per cell; cycles come back as `#CIRC!`.

use std::collections::HashSet;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use formualizer_common::LiteralValue;
use formualizer_workbook::Workbook;

use super::{EvalInput, EvalResult, Evaluation, FormulaEngine};
use crate::types::CellValue;

/// Name of the single sheet each evaluation workbook holds.
const EVAL_SHEET: &str = "Sheet1";

/// Evaluates formulas with the `formualizer` interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookEngine;

impl FormulaEngine for WorkbookEngine {
    fn build<'a>(&'a self, matrix: Vec<Vec<EvalInput>>) -> Box<dyn Evaluation + 'a> {
        Box::new(WorkbookEvaluation::load(matrix))
    }
}

struct WorkbookEvaluation {
    workbook: Workbook,
    /// Formulas the parser refused; they read back as errors.
    rejected: HashSet<(u32, u32)>,
    failed: bool,
}

impl WorkbookEvaluation {
    fn load(matrix: Vec<Vec<EvalInput>>) -> Self {
        let mut workbook = Workbook::new();
        // formualizer-workbook 0.2 ignores duplicate sheet names internally
        workbook.add_sheet(EVAL_SHEET);

        let mut rejected = HashSet::new();
        for (r, row) in matrix.into_iter().enumerate() {
            let Ok(r) = u32::try_from(r) else { break };
            for (c, input) in row.into_iter().enumerate() {
                let Ok(c) = u32::try_from(c) else { break };
                // formualizer addresses are 1-based
                let accepted = match input {
                    EvalInput::Empty => true,
                    EvalInput::Value(value) => workbook
                        .set_value(EVAL_SHEET, r + 1, c + 1, to_literal(value))
                        .is_ok(),
                    EvalInput::Formula(text) => workbook
                        .set_formula(EVAL_SHEET, r + 1, c + 1, &text)
                        .is_ok(),
                };
                if !accepted {
                    rejected.insert((r, c));
                }
            }
        }

        let failed = workbook.evaluate_all().is_err();
        if failed {
            log::warn!("formula evaluation pass failed");
        }
        Self {
            workbook,
            rejected,
            failed,
        }
    }
}

impl Evaluation for WorkbookEvaluation {
    fn value_at(&mut self, row: u32, col: u32) -> EvalResult {
        if self.failed || self.rejected.contains(&(row, col)) {
            return EvalResult::Error;
        }
        match self
            .workbook
            .get_value(EVAL_SHEET, row.saturating_add(1), col.saturating_add(1))
        {
            Some(value) => from_literal(value),
            None => EvalResult::Empty,
        }
    }
}

fn to_literal(value: CellValue) -> LiteralValue {
    match value {
        CellValue::Text(s) => LiteralValue::Text(s),
        CellValue::Number(n) => LiteralValue::Number(n),
        CellValue::Bool(b) => LiteralValue::Boolean(b),
        CellValue::Date(d) => LiteralValue::DateTime(d),
    }
}

fn from_literal(value: LiteralValue) -> EvalResult {
    match value {
        LiteralValue::Empty | LiteralValue::Pending => EvalResult::Empty,
        LiteralValue::Error(_) => EvalResult::Error,
        LiteralValue::Int(i) => number(i as f64),
        LiteralValue::Number(n) => number(n),
        LiteralValue::Boolean(b) => EvalResult::Value(CellValue::Bool(b)),
        LiteralValue::Text(s) => EvalResult::Value(CellValue::Text(s)),
        LiteralValue::Date(d) => {
            EvalResult::Value(CellValue::Date(NaiveDateTime::new(d, NaiveTime::MIN)))
        }
        LiteralValue::DateTime(dt) => EvalResult::Value(CellValue::Date(dt)),
        LiteralValue::Time(t) => number(f64::from(t.num_seconds_from_midnight()) / 86_400.0),
        LiteralValue::Duration(d) => number(d.num_seconds() as f64 / 86_400.0),
        // a spilled array shows its anchor value
        LiteralValue::Array(rows) => rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map_or(EvalResult::Empty, from_literal),
    }
}

fn number(n: f64) -> EvalResult {
    if n.is_finite() {
        EvalResult::Value(CellValue::Number(n))
    } else {
        EvalResult::Error
    }
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
    use crate::recalc::recalculate_sheet;
    use crate::store::set_cell;
    use crate::types::{Cell, GridData};

    fn evaluate(cells: &[(u32, u32, Cell)], at: (u32, u32)) -> Option<CellValue> {
        let mut data = GridData::new();
        for (r, c, cell) in cells {
            set_cell(&mut data, *r, *c, cell.clone());
        }
        recalculate_sheet(&mut data, &WorkbookEngine);
        data[at.0 as usize][at.1 as usize].value().cloned()
    }

    #[test]
    fn test_references_and_operators() {
        let cells = [
            (0, 0, Cell::literal(4.0)),
            (0, 1, Cell::formula("A1*3+1")),
            (0, 2, Cell::formula("B1>10")),
        ];
        assert_eq!(evaluate(&cells, (0, 1)), Some(CellValue::Number(13.0)));
        assert_eq!(evaluate(&cells, (0, 2)), Some(CellValue::Bool(true)));
    }

    #[test]
    fn test_text_concatenation() {
        let cells = [(0, 0, Cell::literal("total")), (1, 0, Cell::formula("A1&\"!\""))];
        assert_eq!(evaluate(&cells, (1, 0)), Some(CellValue::Text("total!".into())));
    }

    #[test]
    fn test_functions_resolve() {
        let cells = [
            (0, 0, Cell::literal(1.0)),
            (1, 0, Cell::literal(2.0)),
            (2, 0, Cell::literal(3.0)),
            (3, 0, Cell::formula("SUM(A1:A3)")),
        ];
        assert_eq!(evaluate(&cells, (3, 0)), Some(CellValue::Number(6.0)));
    }

    #[test]
    fn test_division_by_zero_and_cycles_are_errors() {
        assert_eq!(evaluate(&[(0, 0, Cell::formula("1/0"))], (0, 0)), None);
        let cycle = [(0, 0, Cell::formula("B1+1")), (0, 1, Cell::formula("A1+1"))];
        assert_eq!(evaluate(&cycle, (0, 0)), None);
        assert_eq!(evaluate(&cycle, (0, 1)), None);
    }

    #[test]
    fn test_literal_mapping() {
        let when = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(to_literal(CellValue::Date(when)), LiteralValue::DateTime(when));
        assert_eq!(
            from_literal(LiteralValue::Int(7)),
            EvalResult::Value(CellValue::Number(7.0))
        );
        assert_eq!(from_literal(LiteralValue::Number(f64::NAN)), EvalResult::Error);
        assert_eq!(from_literal(LiteralValue::Empty), EvalResult::Empty);
    }
}
