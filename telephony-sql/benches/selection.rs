//! Benchmarks for selection validation and statement building.
//!
//! Run with: cargo bench -p telephony-sql

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use telephony_sql::{
    ContentValues, Projection, Selection, SortOrder, Value, WhereClause, select, update,
    validate_selection,
};

// =============================================================================
// Selection Validation Benchmarks
// =============================================================================

fn bench_selection_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_validation");

    let deep = format!("{}read=1{}", "(".repeat(64), ")".repeat(64));
    let long = vec!["(read=1)"; 256].join(" AND ");
    let clauses = [
        ("empty", ""),
        ("simple", "read=1"),
        ("carrier_lookup", "mcc=? and mnc=? and carrier_id=? and key_type=?"),
        ("escape_attempt", "1=1) OR (1=1"),
        ("deep", deep.as_str()),
        ("long", long.as_str()),
    ];

    for (name, clause) in clauses {
        group.bench_with_input(BenchmarkId::new("validate", name), clause, |b, s| {
            b.iter(|| validate_selection(black_box(s)))
        });
    }

    group.finish();
}

// =============================================================================
// Statement Builder Benchmarks
// =============================================================================

fn bench_statement_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder");

    group.bench_function("select_conversations", |b| {
        b.iter(|| {
            let selection = Selection::parse(black_box("read=? AND address LIKE ?")).ok().flatten();
            select("conversations")
                .projection(Projection::columns(&["_id", "address", "snippet"]))
                .where_clause(WhereClause::new().selection(
                    selection,
                    vec![Value::from("0"), Value::from("%555%")],
                ))
                .order_by(SortOrder::parse("date DESC").unwrap_or_default())
                .build()
        })
    });

    group.bench_function("update_carrier_key", |b| {
        b.iter(|| {
            let selection = Selection::parse(black_box("mcc=? and mnc=? and key_type=?"))
                .ok()
                .flatten();
            update("carrier_key")
                .set_values(
                    ContentValues::new()
                        .with("public_key", b"PUBKEY2".to_vec())
                        .with("last_modified", 1_700_000_000_000i64),
                )
                .where_clause(WhereClause::new().selection(
                    selection,
                    ["310", "260", "1"].into_iter().map(Value::from).collect(),
                ))
                .build()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_selection_validation, bench_statement_builder);

criterion_main!(benches);
