// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for block allocation and release.

use buddy_pool::{BuddyAllocator, PoolConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn bench_split_and_merge(c: &mut Criterion) {
    // Every iteration splits a fresh root down to a single id and merges it back.
    let mut pool = BuddyAllocator::new(PoolConfig::default()).unwrap();
    c.bench_function("get_put_class_1", |b| {
        b.iter(|| {
            let id = pool.get(black_box(1)).unwrap();
            pool.put(id);
        })
    });
}

fn bench_fill_class(c: &mut Criterion) {
    c.bench_function("fill_64k_ids_class_4", |b| {
        b.iter_batched(
            || BuddyAllocator::new(PoolConfig::new(0, (1 << 16) - 1, 12)).unwrap(),
            |mut pool| {
                let mut live = Vec::with_capacity(8192);
                while let Ok(id) = pool.get(4) {
                    live.push(id);
                }
                for id in live {
                    pool.put(id);
                }
                pool
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_split_and_merge, bench_fill_class);
criterion_main!(benches);
