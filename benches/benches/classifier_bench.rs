//! # Classifier Benchmarks
//!
//! Per-reading cost of feature extraction and of each bundled model, plus
//! batch throughput through the dispatcher.
//!
//! Run: `cargo bench --bench classifier_bench`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use enose_core::prelude::*;
use enose_ml::{Dispatcher, reference};

const SCENARIO_A: [f32; 10] = [3.2, 2.9, 3.0, 2.8, 4.0, 6.5, 10.7, 18.5, 0.0, 6.0];

/// Readings spread around the training distribution
fn session(n: usize) -> Vec<RawReading> {
    (0..n)
        .map(|i| {
            let jitter = 1.0 + ((i % 17) as f32 - 8.0) * 0.01;
            RawReading::new([
                1412.0 * jitter,
                2163.0,
                3112.0 / jitter,
                4541.0,
                6866.0 * jitter,
                10867.0,
                17894.0,
                30882.0 / jitter,
                64590.0,
                100000.0,
            ])
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let raw = RawReading::new(SCENARIO_A);

    c.bench_function("extract", |b| b.iter(|| black_box(extract(black_box(&raw)))));
}

fn bench_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    let features = RawReading::new(SCENARIO_A).features().unwrap();

    for kind in ModelKind::ALL {
        let model = reference::model(kind).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(kind.short()), &features, |b, x| {
            b.iter(|| black_box(model.predict(black_box(x))))
        });
    }

    group.finish();
}

fn bench_svm_margin(c: &mut Criterion) {
    let svm = reference::linear_svm().unwrap();
    let features = RawReading::new(SCENARIO_A).features().unwrap();

    c.bench_function("svm_decision_value", |b| {
        b.iter(|| black_box(svm.decision_value(black_box(&features))))
    });
}

fn bench_dispatcher_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_batch");

    for size in [100usize, 10_000] {
        let readings = session(size);
        group.throughput(Throughput::Elements(size as u64));

        for kind in ModelKind::ALL {
            let dispatcher = Dispatcher::reference(kind).unwrap();
            group.bench_with_input(
                BenchmarkId::new(kind.short(), size),
                &readings,
                |b, readings| b.iter(|| black_box(dispatcher.classify_batch(readings))),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_extract,
    bench_models,
    bench_svm_margin,
    bench_dispatcher_batch
);
criterion_main!(benches);
