use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use sorted_set::{BTreeSet, SortedSet, WavlTreeSet};
use std::collections::BTreeSet as StdBTreeSet;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn key_sequences() -> [(&'static str, fn(usize) -> Vec<i64>); 3] {
    [
        ("ordered", ordered_keys),
        ("reverse", reverse_ordered_keys),
        ("random", random_keys),
    ]
}

fn filled<S: SortedSet<i64> + Default>(keys: &[i64]) -> S {
    let mut set = S::default();
    for &k in keys {
        set.insert(k);
    }
    set
}

// ─── Set Benchmarks ─────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (order, keys_for) in key_sequences() {
        let mut group = c.benchmark_group(format!("set_insert_{order}"));
        for n in SIZES {
            let keys = keys_for(n);
            group.bench_function(BenchmarkId::new("BTreeSet", n), |b| b.iter(|| filled::<BTreeSet<i64>>(&keys)));
            group.bench_function(BenchmarkId::new("WavlTreeSet", n), |b| b.iter(|| filled::<WavlTreeSet<i64>>(&keys)));
            group.bench_function(BenchmarkId::new("std::BTreeSet", n), |b| {
                b.iter(|| keys.iter().copied().collect::<StdBTreeSet<i64>>());
            });
        }
        group.finish();
    }
}

fn bench_contains(c: &mut Criterion) {
    for (order, keys_for) in key_sequences() {
        let mut group = c.benchmark_group(format!("set_contains_{order}"));
        for n in SIZES {
            let keys = keys_for(n);
            let btree: BTreeSet<i64> = filled(&keys);
            let wavl: WavlTreeSet<i64> = filled(&keys);

            group.bench_function(BenchmarkId::new("BTreeSet", n), |b| {
                b.iter(|| keys.iter().filter(|k| btree.contains(k)).count());
            });
            group.bench_function(BenchmarkId::new("WavlTreeSet", n), |b| {
                b.iter(|| keys.iter().filter(|k| wavl.contains(k)).count());
            });
        }
        group.finish();
    }
}

fn bench_remove(c: &mut Criterion) {
    for (order, keys_for) in key_sequences() {
        let mut group = c.benchmark_group(format!("set_remove_{order}"));
        for n in SIZES {
            let inserted = random_keys(n);
            let keys = keys_for(n);

            group.bench_function(BenchmarkId::new("BTreeSet", n), |b| {
                b.iter_batched(
                    || filled::<BTreeSet<i64>>(&inserted),
                    |mut set| {
                        for k in &keys {
                            set.remove(k);
                        }
                        set
                    },
                    BatchSize::SmallInput,
                );
            });
            group.bench_function(BenchmarkId::new("WavlTreeSet", n), |b| {
                b.iter_batched(
                    || filled::<WavlTreeSet<i64>>(&inserted),
                    |mut set| {
                        for k in &keys {
                            set.remove(k);
                        }
                        set
                    },
                    BatchSize::SmallInput,
                );
            });
        }
        group.finish();
    }
}

fn bench_drain_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_drain_first");
    for n in SIZES {
        let keys = random_keys(n);
        group.bench_function(BenchmarkId::new("BTreeSet", n), |b| {
            b.iter_batched(|| filled::<BTreeSet<i64>>(&keys), drain, BatchSize::SmallInput);
        });
        group.bench_function(BenchmarkId::new("WavlTreeSet", n), |b| {
            b.iter_batched(|| filled::<WavlTreeSet<i64>>(&keys), drain, BatchSize::SmallInput);
        });
    }
    group.finish();
}

fn drain<S: SortedSet<i64>>(mut set: S) -> i64 {
    let mut sum = 0i64;
    while let Ok(&first) = set.first() {
        set.remove(&first);
        sum = sum.wrapping_add(first);
    }
    sum
}

criterion_group!(benches, bench_insert, bench_contains, bench_remove, bench_drain_first);
criterion_main!(benches);
