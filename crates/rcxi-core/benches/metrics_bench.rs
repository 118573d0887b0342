// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Metric Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the metric engine, lock scan and shuffle
//! transform at transcript-sized inputs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rcxi_core::{compute_metrics, detect_lock, shuffle_series, EmbeddingProvider, HashProvider};
use rcxi_types::{EmbeddingSeries, RunConfig};

fn transcript(turns: usize, dim: usize) -> EmbeddingSeries {
    let texts: Vec<String> = (0..turns).map(|i| format!("turn {}", i % 7)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    HashProvider::new(dim).unwrap().embed(&refs).unwrap()
}

// ── compute_metrics() ───────────────────────────────────────────────

fn bench_metrics_40x384(c: &mut Criterion) {
    let series = transcript(40, 384);
    let config = RunConfig::default();
    c.bench_function("metrics_40x384", |b| {
        b.iter(|| compute_metrics(black_box(&series), &config).unwrap())
    });
}

fn bench_metrics_400x384(c: &mut Criterion) {
    let series = transcript(400, 384);
    let config = RunConfig::default();
    c.bench_function("metrics_400x384", |b| {
        b.iter(|| compute_metrics(black_box(&series), &config).unwrap())
    });
}

// ── detect_lock() ───────────────────────────────────────────────────

fn bench_lock_scan_400(c: &mut Criterion) {
    let series = transcript(400, 384);
    let config = RunConfig::default();
    let metrics = compute_metrics(&series, &config).unwrap();
    c.bench_function("lock_scan_400", |b| {
        b.iter(|| detect_lock(black_box(&metrics), &config))
    });
}

// ── shuffle_series() ────────────────────────────────────────────────

fn bench_shuffle_400x384(c: &mut Criterion) {
    let series = transcript(400, 384);
    c.bench_function("shuffle_400x384", |b| {
        b.iter(|| shuffle_series(black_box(&series), 42).unwrap())
    });
}

criterion_group!(
    benches,
    bench_metrics_40x384,
    bench_metrics_400x384,
    bench_lock_scan_400,
    bench_shuffle_400x384,
);
criterion_main!(benches);
