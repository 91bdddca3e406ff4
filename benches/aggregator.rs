//! Aggregator hot-path benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use tripmetrics::metrics::MetricsAggregator;

fn bench_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator/increment");

    let metrics = MetricsAggregator::new();
    group.bench_function("unlabeled", |b| {
        b.iter(|| {
            metrics.increment("bench_total", 1.0, &[]).unwrap();
        });
    });

    group.bench_function("labeled", |b| {
        b.iter(|| {
            metrics
                .increment(
                    "bench_labeled_total",
                    1.0,
                    &[("method", "GET"), ("status", "200")],
                )
                .unwrap();
        });
    });

    group.finish();
}

fn bench_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator/observe");

    let unbounded = MetricsAggregator::new();
    group.bench_function("unbounded", |b| {
        b.iter(|| {
            unbounded.observe("bench_ms", 12.5, &[]).unwrap();
        });
    });

    let capped = MetricsAggregator::with_max_samples(1024);
    group.bench_function("reservoir_1024", |b| {
        b.iter(|| {
            capped.observe("bench_ms", 12.5, &[]).unwrap();
        });
    });

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let metrics = MetricsAggregator::with_max_samples(1024);
    for i in 0..1000 {
        metrics
            .increment("requests_total", 1.0, &[("status", "200")])
            .unwrap();
        metrics
            .observe("duration_ms", (i % 250) as f64, &[("endpoint", "api")])
            .unwrap();
    }

    c.bench_function("aggregator/export", |b| {
        b.iter(|| {
            let output = metrics.export();
            assert!(!output.is_empty());
        });
    });
}

criterion_group!(benches, bench_increment, bench_observe, bench_export);
criterion_main!(benches);
