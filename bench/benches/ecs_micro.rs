//! ECS microbenchmarks using Criterion.
//!
//! These benchmarks measure individual operations in isolation:
//! - Entity acquire/release churn
//! - Sparse-map insert, lookup, and erase
//! - Multi-component view iteration

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ember_bench::components::*;
use ember_ecs::{Entity, Registry, SparseMap};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Entity Store Benchmarks
// =============================================================================

fn bench_acquire(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("fresh", count), &count, |b, &n| {
            b.iter(|| {
                let mut registry = Registry::new();
                for _ in 0..n {
                    black_box(registry.acquire_entity());
                }
            });
        });

        // Recycled slots: drain and refill a warmed registry.
        group.bench_with_input(BenchmarkId::new("recycled", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let mut registry = Registry::new();
                    let entities: Vec<_> = (0..n).map(|_| registry.acquire_entity()).collect();
                    for entity in entities {
                        registry.release_entity(entity);
                    }
                    registry
                },
                |mut registry| {
                    for _ in 0..n {
                        black_box(registry.acquire_entity());
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        // Randomised acquire/release interleave with a seeded generator.
        group.bench_with_input(BenchmarkId::new("random", count), &count, |b, &n| {
            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(0xEC5);
                let mut registry = Registry::new();
                let mut live: Vec<Entity> = Vec::with_capacity(n);
                for _ in 0..n {
                    if !live.is_empty() && rng.gen_bool(0.3) {
                        let victim = live.swap_remove(rng.gen_range(0..live.len()));
                        registry.release_entity(victim);
                    } else {
                        live.push(registry.acquire_entity());
                    }
                }
                black_box(registry.entity_count())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Sparse Map Benchmarks
// =============================================================================

fn bench_sparse_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_map");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("insert", count), &count, |b, &n| {
            b.iter(|| {
                let mut map = SparseMap::new();
                for index in 0..n as u32 {
                    map.insert(Entity::new(index, 0), Position::default());
                }
                black_box(map.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("lookup", count), &count, |b, &n| {
            let mut map = SparseMap::new();
            for index in 0..n as u32 {
                map.insert(Entity::new(index, 0), index);
            }
            b.iter(|| {
                let mut sum = 0u64;
                for index in 0..n as u32 {
                    sum += *map.get(Entity::new(index, 0)).unwrap() as u64;
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("erase_half", count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let mut map = SparseMap::new();
                    for index in 0..n as u32 {
                        map.insert(Entity::new(index, 0), Transform::default());
                    }
                    map
                },
                |mut map| {
                    for index in (0..n as u32).step_by(2) {
                        black_box(map.remove(Entity::new(index, 0)));
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// View Benchmarks
// =============================================================================

/// Populate a registry where half the entities carry both components.
fn scene(count: usize) -> Registry {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5CE);
    let mut registry = Registry::new();
    for object_id in 0..count {
        let entity = registry.acquire_entity();
        registry.assign(entity, Position::default());
        if rng.gen_bool(0.5) {
            registry.assign(
                entity,
                Renderable {
                    object_id: object_id as u32,
                    mesh_id: 0,
                },
            );
        }
    }
    registry
}

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("two_components", count), &count, |b, &n| {
            let registry = scene(n);
            b.iter(|| {
                let mut sum = 0u64;
                for (_, (_, renderable)) in registry.view::<(&Position, &Renderable)>() {
                    sum += renderable.object_id as u64;
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("mutate", count), &count, |b, &n| {
            let mut registry = scene(n);
            b.iter(|| {
                registry
                    .view_mut::<(&Renderable, &mut Position)>()
                    .for_each(|_, (renderable, position)| {
                        position.x += renderable.object_id as f32;
                    });
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_acquire,
    bench_churn,
    bench_sparse_map,
    bench_view
);
criterion_main!(benches);
