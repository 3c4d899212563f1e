//! Component registry and entity codec benchmarks.
//!
//! Measures the hot paths presenters hit every frame (typed lookup, lazy
//! insert under contention) and the cost of persisting an entity.
//!
//! Run with: `cargo bench --bench component_benchmarks`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tessera_ecs::prelude::*;

// ---------------------------------------------------------------------------
// Benchmark component types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Position {
    x: f64,
    y: f64,
}
tessera_ecs::persistent_component!(Position, "position");

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Health(u32);
tessera_ecs::persistent_component!(Health, "health");

#[derive(Debug, Default)]
struct Velocity {
    dx: f64,
    dy: f64,
}
tessera_ecs::component!(Velocity, "velocity");

struct Crate;
impl EntityKind for Crate {
    const NAME: &'static str = "Crate";
    const PERSISTENT: bool = true;

    fn assemble(entity: &Entity) {
        entity.insert(Position { x: 4.0, y: 2.0 });
        entity.insert(Health(100));
        entity.add::<Velocity>();
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_lookup(c: &mut Criterion) {
    let entity = Entity::build::<Crate>();

    c.bench_function("components/get_hit", |b| {
        b.iter(|| black_box(entity.get::<Position>()))
    });

    c.bench_function("components/has_miss", |b| {
        entity.remove::<Velocity>();
        b.iter(|| black_box(entity.has::<Velocity>()))
    });

    c.bench_function("components/get_and_mutate", |b| {
        let velocity = entity.get_or_add::<Velocity>();
        b.iter(|| {
            let mut v = velocity.write();
            v.dx += 1.0;
            v.dy -= 1.0;
        })
    });
}

fn bench_contended_get_or_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("components/get_or_add_contended");
    for threads in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let entity = Arc::new(Entity::new(TypeKey::of::<Crate>()));
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let entity = Arc::clone(&entity);
                        std::thread::spawn(move || {
                            for _ in 0..64 {
                                black_box(entity.get_or_add::<Health>());
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            })
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut catalog = ComponentCatalog::new();
    catalog
        .register::<Position>()
        .register::<Health>()
        .register::<ViewBinding>();
    let format = EntityFormat::json(catalog);

    let entity = Entity::build::<Crate>().with(ViewBinding::with_prefab(Prefab::new("crate")));
    let mut encoded = Vec::new();
    entity
        .write(&mut encoded, &format)
        .expect("benchmark entity encodes");

    c.bench_function("codec/write", |b| {
        b.iter(|| {
            let mut sink = Vec::with_capacity(encoded.len());
            entity.write(&mut sink, &format).unwrap();
            black_box(sink)
        })
    });

    c.bench_function("codec/read", |b| {
        b.iter(|| {
            let target = Entity::new(TypeKey::of::<Crate>());
            black_box(target.read(&mut encoded.as_slice(), &format).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_lookup,
    bench_contended_get_or_add,
    bench_codec
);
criterion_main!(benches);
