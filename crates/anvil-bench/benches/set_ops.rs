//! Criterion micro-benchmarks for OpenHashSet and Map.

use std::hint::black_box;

use anvil_bench::{random_keys, random_words};
use anvil_containers::{Fnv1a, Map, OpenHashSet, ValueEquality};
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark: insert 10K keys (with repeats) into an empty set.
fn bench_set_insert_10k(c: &mut Criterion) {
    let keys = random_keys(10_000, 5_000, 42);
    c.bench_function("set_insert_10k", |b| {
        b.iter(|| {
            let mut set = OpenHashSet::with_strategies(Fnv1a, ValueEquality);
            for k in &keys {
                set.add(*k);
            }
            black_box(set.len());
        });
    });
}

/// Benchmark: 10K lookups, half hits and half misses.
fn bench_set_lookup_10k(c: &mut Criterion) {
    let stored = random_keys(10_000, 1 << 20, 1);
    let probes = random_keys(10_000, 1 << 21, 2);
    let mut set = OpenHashSet::with_strategies(Fnv1a, ValueEquality);
    set.append(stored.iter().copied());
    c.bench_function("set_lookup_10k", |b| {
        b.iter(|| {
            let hits = probes.iter().filter(|k| set.contains(k)).count();
            black_box(hits);
        });
    });
}

/// Benchmark: word counting with string keys.
fn bench_map_word_count(c: &mut Criterion) {
    let words = random_words(5_000, 7);
    c.bench_function("map_word_count_5k", |b| {
        b.iter(|| {
            let mut counts = Map::with_strategies(Fnv1a, ValueEquality);
            for w in &words {
                let next = counts.get(w).copied().unwrap_or(0u32) + 1;
                counts.add(w.clone(), next);
            }
            black_box(counts.len());
        });
    });
}

criterion_group!(
    benches,
    bench_set_insert_10k,
    bench_set_lookup_10k,
    bench_map_word_count
);
criterion_main!(benches);
