//! Benchmarks for report building: statistics and normalization.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use imagediff::model::{DiffField, DiffKey, DiffResult, DiffValue, Statistics};
use imagediff::reports::{build_report, Normalizer};
use std::hint::black_box;

/// Synthetic results resembling a metadata run: a handful of changed tags
/// per pair, one of them a long maker note.
fn synthetic_results(pairs: usize) -> Vec<DiffResult> {
    (0..pairs)
        .map(|i| {
            let mut result = DiffResult::empty(format!("cover{i}.jpg"), format!("stego{i}.jpg"));
            let metadata = result.diff.entry("metadata".to_string()).or_default();
            for tag in ["Software", "DateTime", "Make", "Model"].iter().take(1 + i % 4) {
                metadata.insert(
                    DiffKey::from(*tag),
                    DiffValue::changed(DiffField::text("before"), DiffField::text("after")),
                );
            }
            metadata.insert(
                DiffKey::from("MakerNote"),
                DiffValue::changed(DiffField::text("x".repeat(4096)), DiffField::Absent),
            );
            result
        })
        .collect()
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");
    for pairs in [100, 1_000, 10_000] {
        let results = synthetic_results(pairs);
        group.bench_with_input(BenchmarkId::from_parameter(pairs), &results, |b, results| {
            b.iter(|| black_box(Statistics::compute(results)));
        });
    }
    group.finish();
}

fn bench_build_report(c: &mut Criterion) {
    let results = synthetic_results(1_000);
    let normalizer = Normalizer::new(Some(100));

    c.bench_function("build_report_1000_truncated", |b| {
        b.iter(|| black_box(build_report(&results, normalizer)));
    });
    c.bench_function("build_report_1000_untruncated", |b| {
        b.iter(|| black_box(build_report(&results, Normalizer::disabled())));
    });
}

criterion_group!(benches, bench_statistics, bench_build_report);
criterion_main!(benches);
