//! Benchmark suite for the preprocessing pipeline.
//!
//! Run with: `cargo bench`
//!
//! Measures:
//! - Rolling feature computation throughput
//! - Window extraction
//! - Full pipeline over a synthetic fleet

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rul_predictor::prelude::*;

/// Synthetic fleet: `n_units` units, `cycles` records each, 17 channels.
fn synthetic_fleet(n_units: u32, cycles: u32) -> SensorFrame {
    let names: Vec<String> = (1..=17).map(|i| format!("s{i}")).collect();
    let n_rows = (n_units * cycles) as usize;

    let mut units = Vec::with_capacity(n_rows);
    let mut time = Vec::with_capacity(n_rows);
    for unit in 1..=n_units {
        for c in 1..=cycles {
            units.push(unit);
            time.push(c);
        }
    }
    let columns: Vec<Vec<f64>> = (0..17)
        .map(|j| {
            (0..n_rows)
                .map(|i| ((i * 31 + j * 17) % 997) as f64 * 0.01)
                .collect()
        })
        .collect();

    SensorFrame::new(units, time, names, columns).unwrap()
}

struct MeanModel;

impl RulModel for MeanModel {
    fn predict(&self, batch: &WindowBatch) -> Result<Vec<f64>> {
        Ok(batch
            .windows
            .iter()
            .map(|w| w.mean().unwrap_or(0.0))
            .collect())
    }
}

fn bench_feature_engine(c: &mut Criterion) {
    let frame = synthetic_fleet(20, 200);
    let engine = FeatureEngine::new();

    let mut group = c.benchmark_group("feature_engine");
    group.throughput(Throughput::Elements(frame.n_rows() as u64));
    group.bench_function("run_20x200", |b| {
        b.iter(|| engine.run(black_box(&frame)).unwrap())
    });
    group.finish();
}

fn bench_windower(c: &mut Criterion) {
    let frame = synthetic_fleet(20, 200);
    let featurized = FeatureEngine::new().run(&frame).unwrap();
    let layout = FeatureLayout::from_frame(&featurized);
    let matrix = featurized.feature_matrix(&layout).unwrap();
    let windower = Windower::new();

    let mut group = c.benchmark_group("windower");
    group.throughput(Throughput::Elements(20));
    group.bench_function("build_20x200", |b| {
        b.iter(|| windower.build(black_box(&featurized), matrix.view()).unwrap())
    });
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let frame = synthetic_fleet(20, 200);
    let pipeline = Pipeline::new(
        PipelineConfig::default(),
        Box::new(IdentityScaler),
        Box::new(MeanModel),
    )
    .unwrap();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(frame.n_rows() as u64));
    group.bench_function("run_20x200", |b| {
        b.iter(|| pipeline.run(black_box(&frame)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_feature_engine,
    bench_windower,
    bench_full_pipeline
);
criterion_main!(benches);
