//! Benchmarks for candidate filtering and queue assembly.
//!
//! Pools are sized like a generous sourcer response: a few hundred familiar
//! tracks with repeated artists and overlapping ids, and a discovery pool of
//! similar size.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use moodcast_core::types::Track;
use moodcast_prompt::{assemble_pools, assemble_queue, filter_candidates, PoolShuffle};

/// Familiar pool with every artist appearing several times.
fn familiar_pool(size: usize) -> Vec<Track> {
    (0..size)
        .map(|i| {
            Track::new(
                format!("track-{}", i),
                format!("artist-{}", i % (size / 4).max(1)),
                150_000 + (i as u64 % 7) * 20_000,
            )
        })
        .collect()
}

/// Discovery pool overlapping the familiar ids by roughly a tenth.
fn discovery_pool(size: usize) -> Vec<Track> {
    (0..size)
        .map(|i| {
            let id = if i % 10 == 0 {
                format!("track-{}", i)
            } else {
                format!("new-{}", i)
            };
            Track::new(id, format!("new-artist-{}", i % (size / 2).max(1)), 200_000)
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_candidates");

    for size in [50usize, 500, 5_000] {
        let familiar = familiar_pool(size);
        let discovery = discovery_pool(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| filter_candidates(black_box(familiar.clone()), black_box(discovery.clone())));
        });
    }

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_queue");
    group.measurement_time(Duration::from_secs(5));

    let familiar = familiar_pool(500);
    let discovery = discovery_pool(500);

    // 45 minutes, the typical vibe target.
    group.bench_function("target_45_min", |b| {
        b.iter(|| {
            assemble_queue(
                black_box(familiar.clone()),
                black_box(discovery.clone()),
                45 * 60_000,
            )
        });
    });

    // Target larger than the pools can fill, so assembly drains both.
    group.bench_function("drain_pools", |b| {
        b.iter(|| {
            assemble_queue(
                black_box(familiar.clone()),
                black_box(discovery.clone()),
                u64::MAX,
            )
        });
    });

    let pools = filter_candidates(familiar.clone(), discovery.clone());
    group.bench_function("prefiltered_45_min", |b| {
        b.iter(|| assemble_pools(black_box(pools.clone()), 45 * 60_000));
    });

    group.bench_function("seeded_shuffle_and_filter", |b| {
        b.iter(|| {
            let mut f = familiar.clone();
            let mut d = discovery.clone();
            PoolShuffle::Seeded(42).apply(&mut f, &mut d);
            filter_candidates(f, d)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_filter, bench_assemble);
criterion_main!(benches);
