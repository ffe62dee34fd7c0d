//! Recalculation pipeline.
//!
//! The formula language lives behind [`FormulaEngine`]. A recalculation
//! hands the engine the whole sheet as an input matrix (literals as values,
//! formulas as `=source` text), asks it for the result of every formula cell,
//! and writes the results back into the formula cells' caches. Each call
//! builds a fresh [`Evaluation`] and drops it afterwards, so no engine state
//! survives between edits.

mod workbook;

pub use workbook::WorkbookEngine;

use crate::types::{Cell, CellValue, GridData};

/// One slot of the matrix handed to an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalInput {
    Empty,
    Value(CellValue),
    /// Formula text including the leading `=`.
    Formula(String),
}

impl From<&Cell> for EvalInput {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Empty => EvalInput::Empty,
            Cell::Literal { value, .. } => EvalInput::Value(value.clone()),
            Cell::Formula { source, .. } => EvalInput::Formula(format!("={source}")),
        }
    }
}

/// What an engine reports for one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Empty,
    Value(CellValue),
    /// Error sentinel (`#VALUE!`, `#DIV/0!`, unsupported syntax, cycles...).
    Error,
}

/// A formula collaborator.
pub trait FormulaEngine {
    /// Build a workspace over `matrix`. The workspace is dropped at the end
    /// of the recalculation that built it.
    fn build<'a>(&'a self, matrix: Vec<Vec<EvalInput>>) -> Box<dyn Evaluation + 'a>;
}

/// A built workspace answering per-cell queries.
pub trait Evaluation {
    /// Result for the cell at `(row, col)`, 0-indexed.
    fn value_at(&mut self, row: u32, col: u32) -> EvalResult;
}

/// The input matrix for a sheet: same shape as `data`.
pub fn build_input(data: &GridData) -> Vec<Vec<EvalInput>> {
    data.iter()
        .map(|row| row.iter().map(EvalInput::from).collect())
        .collect()
}

/// Recompute the cache of every formula cell in `data`.
///
/// Errors (and empty results) clear the cache. Literal cells are never
/// touched. Returns the number of formula cells recomputed.
pub fn recalculate_sheet(data: &mut GridData, engine: &dyn FormulaEngine) -> usize {
    let formula_cells: Vec<(u32, u32)> = formula_positions(data);
    if formula_cells.is_empty() {
        return 0;
    }

    let mut evaluation = engine.build(build_input(data));
    let mut errors = 0usize;
    for &(row, col) in &formula_cells {
        let result = evaluation.value_at(row, col);
        let Some(Cell::Formula {
            cached_value,
            cached_type,
            ..
        }) = data
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        else {
            continue;
        };
        match result {
            EvalResult::Value(value) => {
                *cached_type = Some(value.cell_type());
                *cached_value = Some(value);
            }
            EvalResult::Empty | EvalResult::Error => {
                if result == EvalResult::Error {
                    errors += 1;
                }
                *cached_value = None;
                *cached_type = None;
            }
        }
    }
    drop(evaluation);

    log::debug!(
        "recalculated {} formula cells ({errors} errors)",
        formula_cells.len()
    );
    formula_cells.len()
}

fn formula_positions(data: &GridData) -> Vec<(u32, u32)> {
    let mut positions = Vec::new();
    for (r, row) in data.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_formula() {
                if let (Ok(r), Ok(c)) = (u32::try_from(r), u32::try_from(c)) {
                    positions.push((r, c));
                }
            }
        }
    }
    positions
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
    use std::cell::Cell as Counter;

    /// Answers every query with a fixed result and counts builds.
    struct Fixed {
        result: EvalResult,
        builds: Counter<usize>,
    }

    struct FixedEvaluation<'a>(&'a EvalResult);

    impl Evaluation for FixedEvaluation<'_> {
        fn value_at(&mut self, _row: u32, _col: u32) -> EvalResult {
            self.0.clone()
        }
    }

    impl FormulaEngine for Fixed {
        fn build<'a>(&'a self, _matrix: Vec<Vec<EvalInput>>) -> Box<dyn Evaluation + 'a> {
            self.builds.set(self.builds.get() + 1);
            Box::new(FixedEvaluation(&self.result))
        }
    }

    #[test]
    fn test_input_marks_formulas() {
        let data = vec![vec![Cell::literal(5.0), Cell::formula("A1*2"), Cell::Empty]];
        let input = build_input(&data);
        assert_eq!(input[0][0], EvalInput::Value(CellValue::Number(5.0)));
        assert_eq!(input[0][1], EvalInput::Formula("=A1*2".into()));
        assert_eq!(input[0][2], EvalInput::Empty);
    }

    #[test]
    fn test_error_clears_cache() {
        let mut data = vec![vec![Cell::Formula {
            source: "1/0".into(),
            cached_value: Some(CellValue::Number(3.0)),
            cached_type: None,
        }]];
        let engine = Fixed {
            result: EvalResult::Error,
            builds: Counter::new(0),
        };
        assert_eq!(recalculate_sheet(&mut data, &engine), 1);
        assert_eq!(data[0][0].value(), None);
        assert_eq!(data[0][0].cell_type(), None);
    }

    #[test]
    fn test_fresh_engine_per_call_and_none_without_formulas() {
        let engine = Fixed {
            result: EvalResult::Value(CellValue::Bool(true)),
            builds: Counter::new(0),
        };
        let mut literals = vec![vec![Cell::literal(1.0)]];
        assert_eq!(recalculate_sheet(&mut literals, &engine), 0);
        assert_eq!(engine.builds.get(), 0);

        let mut data = vec![vec![Cell::formula("X")], vec![Cell::formula("Y")]];
        recalculate_sheet(&mut data, &engine);
        recalculate_sheet(&mut data, &engine);
        assert_eq!(engine.builds.get(), 2);
        assert_eq!(data[1][0].value(), Some(&CellValue::Bool(true)));
    }
}
