use advisor_core::schema::{Column, Table};
use advisor_core::types::ConstraintKind;
use advisor_core::{Constraint, Scan};
use advisor_synth::{synthesize, DEFAULT_MAX_DISTINCT_MASKS};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn wide_table() -> Table {
    let columns = (0..16)
        .map(|i| Column::new(format!("c{i}"), "BINARY", i == 0))
        .collect();
    Table::new("wide", columns)
}

fn scan_with_joins(join_tables: usize) -> Scan {
    let mut scan = Scan::new("wide", 1);
    for i in 1..join_tables.min(12) {
        scan.push_equality(Constraint::new(
            i,
            "BINARY",
            ConstraintKind::Equality,
            1 << i,
            false,
        ));
    }
    scan.push_orderby(Constraint::new(15, "BINARY", ConstraintKind::OrderBy, 0, false));
    scan
}

fn bench_synthesize(c: &mut Criterion) {
    let table = wide_table();

    let mut group = c.benchmark_group("synthesize");
    for joins in [1usize, 4, 8, 12] {
        let scan = scan_with_joins(joins);
        group.bench_function(format!("joins_{joins}"), |b| {
            b.iter(|| {
                black_box(synthesize(
                    black_box(&table),
                    black_box(&scan),
                    black_box(&[]),
                    DEFAULT_MAX_DISTINCT_MASKS,
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_synthesize);
criterion_main!(benches);
