//! Benchmarks for the edit pipeline and viewport queries.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xlgrid::recalc::{recalculate_sheet, WorkbookEngine};
use xlgrid::store::{set_cell, Bounds};
use xlgrid::{Cell, EditorSession, EditorSettings, GridData};

/// A column of numbers with a running-total formula beside each.
fn running_totals(rows: u32) -> GridData {
    let mut data = GridData::new();
    for r in 0..rows {
        set_cell(&mut data, r, 0, Cell::literal(f64::from(r)));
        let formula = if r == 0 {
            "A1".to_string()
        } else {
            format!("B{}+A{}", r, r + 1)
        };
        set_cell(&mut data, r, 1, Cell::formula(formula));
    }
    data
}

fn bench_recalculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("recalculate_sheet");
    for rows in [100u32, 1_000, 10_000] {
        group.throughput(Throughput::Elements(u64::from(rows)));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let mut data = running_totals(rows);
            b.iter(|| recalculate_sheet(black_box(&mut data), &WorkbookEngine));
        });
    }
    group.finish();
}

fn bench_bounds(c: &mut Criterion) {
    let mut data = running_totals(10_000);
    // trailing blank rows force the backward scan
    set_cell(&mut data, 19_999, 0, Cell::Empty);
    c.bench_function("bounds_10k_rows", |b| b.iter(|| Bounds::of(black_box(&data))));
}

fn bench_commit_text(c: &mut Criterion) {
    let mut session = EditorSession::new(EditorSettings::default());
    for r in 0..1_000 {
        session
            .commit_text(r, 0, &r.to_string())
            .expect("seed edit");
    }
    let mut n = 0u32;
    c.bench_function("commit_text_1k_rows", |b| {
        b.iter(|| {
            n = n.wrapping_add(1);
            session
                .commit_text(black_box(n % 1_000), 1, "=A1+1")
                .expect("edit");
        });
    });
}

fn bench_visible_rows(c: &mut Criterion) {
    let mut session = EditorSession::new(EditorSettings::default());
    session
        .commit_text(999_999, 0, "last")
        .expect("far edit");
    let mut top = 0.0;
    c.bench_function("visible_rows_1m", |b| {
        b.iter(|| {
            top = (top + 7_919.0) % 20_000_000.0;
            session.set_scroll(0.0, top);
            black_box(session.visible_rows())
        });
    });
}

fn bench_find(c: &mut Criterion) {
    let mut session = EditorSession::new(EditorSettings::default());
    for r in 0..5_000 {
        session
            .commit_text(r, r % 10, &format!("item {r}"))
            .expect("seed edit");
    }
    c.bench_function("find_query_5k_cells", |b| {
        b.iter(|| session.set_find_query(black_box("item 49")));
    });
}

criterion_group!(
    benches,
    bench_recalculate,
    bench_bounds,
    bench_commit_text,
    bench_visible_rows,
    bench_find
);
criterion_main!(benches);
