//! Criterion benchmarks comparing sequential and parallel aggregation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_bench::{reference_profile, strided_profile, Profile};
use trellis_grid::SparseGrid;
use trellis_rules::{aggregate_parallel, aggregate_sequential, build_sample_rules};

fn bench_profile(c: &mut Criterion, name: &str, profile: &Profile) {
    let inputs = profile.inputs.as_slice();
    let geometry = &profile.geometry;

    c.bench_function(&format!("{name}_sequential"), |b| {
        b.iter(|| black_box(aggregate_sequential(inputs, geometry).unwrap()));
    });

    c.bench_function(&format!("{name}_parallel"), |b| {
        b.iter(|| black_box(aggregate_parallel(inputs, geometry).unwrap()));
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap();
    c.bench_function(&format!("{name}_parallel_2_threads"), |b| {
        b.iter(|| pool.install(|| black_box(aggregate_parallel(inputs, geometry).unwrap())));
    });
}

fn bench_reference(c: &mut Criterion) {
    let profile = reference_profile(42).unwrap();
    bench_profile(c, "reference", &profile);
}

fn bench_strided(c: &mut Criterion) {
    let profile = strided_profile(42).unwrap();
    bench_profile(c, "strided", &profile);
}

fn bench_single_sample(c: &mut Criterion) {
    let profile = reference_profile(7).unwrap();
    let input = &profile.inputs.as_slice()[0];
    c.bench_function("single_sample_reference", |b| {
        b.iter(|| {
            let mut output = SparseGrid::new();
            let mut rules = trellis_core::RuleBook::default();
            build_sample_rules(input, &mut output, &profile.geometry, &mut rules).unwrap();
            black_box((output, rules))
        });
    });
}

criterion_group!(benches, bench_reference, bench_strided, bench_single_sample);
criterion_main!(benches);
