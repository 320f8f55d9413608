use benchmarks::metrics::Metrics;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn series(n: usize) -> (Vec<f64>, Vec<f64>) {
    let y_true = (0..n).map(|i| i as f64 * 0.1).collect();
    let y_pred = (0..n).map(|i| i as f64 * 0.1 + 0.5).collect();
    (y_true, y_pred)
}

fn bench_metrics(c: &mut Criterion) {
    for size in [100, 1_000, 100_000].iter() {
        let (y_true, y_pred) = series(*size);

        c.bench_with_input(BenchmarkId::new("mse", size), size, |b, _| {
            b.iter(|| black_box(Metrics::mse(black_box(&y_true), black_box(&y_pred))));
        });
        c.bench_with_input(BenchmarkId::new("mae", size), size, |b, _| {
            b.iter(|| black_box(Metrics::mae(black_box(&y_true), black_box(&y_pred))));
        });
        c.bench_with_input(BenchmarkId::new("r_squared", size), size, |b, _| {
            b.iter(|| black_box(Metrics::r_squared(black_box(&y_true), black_box(&y_pred))));
        });
    }
}

criterion_group!(benches, bench_metrics);
criterion_main!(benches);
