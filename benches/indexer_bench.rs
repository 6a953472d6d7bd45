use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pddmat::job_index::JobIndexer;
use pddmat::pair_index;

fn bench_pair_decode_small(c: &mut Criterion) {
    c.bench_function("pair_decode_small_n", |b| {
        b.iter(|| {
            for index in 0..pair_index::pair_count(100) {
                black_box(pair_index::decode(black_box(index), 100).unwrap());
            }
        })
    });
}

fn bench_pair_decode_large(c: &mut Criterion) {
    let n = 3_000_000_000usize;
    let last = pair_index::pair_count(n) - 1;
    c.bench_function("pair_decode_large_n", |b| {
        b.iter(|| pair_index::decode(black_box(last), n).unwrap())
    });
}

fn bench_job_round_trip(c: &mut Criterion) {
    let indexer = JobIndexer::new(16, 60).unwrap();
    c.bench_function("job_round_trip", |b| {
        b.iter(|| {
            for job_id in 0..indexer.total_jobs() {
                let parts = indexer.job_to_components(black_box(job_id)).unwrap();
                let back = indexer.components_to_job(parts.parameter_index, parts.i, parts.j);
                black_box(back.unwrap());
            }
        })
    });
}

fn bench_bottleneck(c: &mut Criterion) {
    use pddmat::diagram::PersistenceDiagram;
    use pddmat::distance::bottleneck::bottleneck;

    let a = PersistenceDiagram::new((0..60).map(|k| (0.0, 0.1 + k as f64 * 0.013)).collect());
    let b = PersistenceDiagram::new((0..55).map(|k| (0.0, 0.12 + k as f64 * 0.014)).collect());
    c.bench_function("bottleneck_60x55", |bench| {
        bench.iter(|| bottleneck(black_box(&a), black_box(&b)))
    });
}

criterion_group!(
    benches,
    bench_pair_decode_small,
    bench_pair_decode_large,
    bench_job_round_trip,
    bench_bottleneck
);
criterion_main!(benches);
