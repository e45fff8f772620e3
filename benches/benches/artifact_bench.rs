//! # Artifact Benchmarks
//!
//! Load-time cost: JSON parsing plus full model validation.
//!
//! Run: `cargo bench --bench artifact_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use enose_core::prelude::*;
use enose_ml::{Artifact, reference};

fn bench_artifact_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("artifact_load");

    for kind in ModelKind::ALL {
        let model = reference::model(kind).unwrap();
        let json = Artifact::from_model(&model, reference::class_table())
            .to_json_pretty()
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(kind.short()), &json, |b, json| {
            b.iter(|| {
                let artifact = Artifact::from_json(black_box(json)).unwrap();
                black_box(artifact.into_model().unwrap())
            })
        });
    }

    group.finish();
}

fn bench_reference_build(c: &mut Criterion) {
    c.bench_function("reference_forest", |b| {
        b.iter(|| black_box(reference::random_forest().unwrap()))
    });
}

criterion_group!(benches, bench_artifact_load, bench_reference_build);
criterion_main!(benches);
