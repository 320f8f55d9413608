use benchmarks::SyntheticCars;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use horsepower_mpg::{
    config::PipelineConfig,
    data::source::InMemorySource,
    data::DataCleaner,
    loss::MSELoss,
    model::{build_model, Fitted, ModelSpec, Sequential, TrainableModel},
    optimizer::Adam,
    predict::Predictor,
    preprocessing::{NormalizedDataset, TensorNormalizer},
    trainer::Trainer,
    CpuBackend, Pipeline,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    Runtime::new().expect("Failed to start tokio runtime")
}

fn normalized(n: usize) -> NormalizedDataset<CpuBackend> {
    let records = SyntheticCars::default().cleaned(n, 0);
    TensorNormalizer::new()
        .normalize(&records, &mut StdRng::seed_from_u64(0))
        .expect("Failed to normalize")
}

fn trained_model(rt: &Runtime, data: &NormalizedDataset<CpuBackend>) -> Sequential<CpuBackend, Fitted> {
    let mut rng = StdRng::seed_from_u64(1);
    let mut model = build_model(&ModelSpec::default(), &mut rng).expect("Failed to build model");
    let mut trainer = Trainer::builder(MSELoss, Adam::new(0.01)).build();
    rt.block_on(trainer.fit_tensors(&mut model, &data.inputs, &data.labels, &mut rng))
        .expect("Failed to fit model");
    model.into_fitted()
}

fn bench_clean(c: &mut Criterion) {
    let raw = SyntheticCars::default().raw(10_000, 7, 0);
    let cleaner = DataCleaner::default();
    c.bench_function("clean_10000", |b| {
        b.iter(|| black_box(cleaner.clean(black_box(&raw))));
    });
}

fn bench_normalize(c: &mut Criterion) {
    for size in [100, 1_000, 10_000].iter() {
        let records = SyntheticCars::default().cleaned(*size, 0);
        c.bench_with_input(BenchmarkId::new("normalize", size), size, |b, _| {
            let normalizer = TensorNormalizer::<CpuBackend>::new();
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| black_box(normalizer.normalize(black_box(&records), &mut rng)));
        });
    }
}

fn bench_train_epoch(c: &mut Criterion) {
    let rt = runtime();
    for size in [400, 4_000].iter() {
        let data = normalized(*size);
        c.bench_with_input(BenchmarkId::new("train_one_epoch", size), size, |b, _| {
            let mut rng = StdRng::seed_from_u64(2);
            b.iter(|| {
                let mut model =
                    build_model(&ModelSpec::default(), &mut rng).expect("Failed to build model");
                let mut trainer = Trainer::builder(MSELoss, Adam::new(0.001)).epochs(1).build();
                let history = rt
                    .block_on(trainer.fit_tensors(&mut model, &data.inputs, &data.labels, &mut rng))
                    .expect("Failed to fit model");
                black_box((history, model.params().param_count()));
            });
        });
    }
}

fn bench_predict_sweep(c: &mut Criterion) {
    let rt = runtime();
    let data = normalized(400);
    let model = trained_model(&rt, &data);
    let records = SyntheticCars::default().cleaned(400, 0);

    for sweep in [100, 10_000].iter() {
        c.bench_with_input(BenchmarkId::new("predict_sweep", sweep), sweep, |b, &n| {
            let predictor = Predictor::new(n);
            b.iter(|| black_box(predictor.predict(&model, black_box(&records), &data.bounds)));
        });
    }
}

fn bench_full_pipeline(c: &mut Criterion) {
    let rt = runtime();
    let raw = SyntheticCars::default().raw(400, 20, 3);
    let mut config = PipelineConfig::default();
    config.training.seed = Some(3);

    c.bench_function("pipeline_400_records", |b| {
        b.iter(|| {
            let pipeline = Pipeline::new(InMemorySource::new(raw.clone()), config.clone())
                .expect("Invalid config");
            black_box(rt.block_on(pipeline.run::<CpuBackend>()))
        });
    });
}

criterion_group!(
    benches,
    bench_clean,
    bench_normalize,
    bench_train_epoch,
    bench_predict_sweep,
    bench_full_pipeline
);
criterion_main!(benches);
