use anvil_forge::section::Section;
use anvil_forge::{biome, blocks, BlockId, SaveOptions, World};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

// ── Helpers ──────────────────────────────────────────────────────────────────

const LAYERS: [BlockId; 4] = [
    blocks::BEDROCK,
    blocks::STONE,
    blocks::DIRT,
    blocks::GRASS_BLOCK,
];

/// Flat terrain `size` x `size` blocks wide, 64 blocks deep.
fn make_world_flat(size: i32) -> World {
    let mut world = World::new();
    for x in 0..size {
        for z in 0..size {
            for y in 0..64 {
                let block = LAYERS[(y as usize * LAYERS.len()) / 64];
                world.set_block(block, x, y, z).unwrap();
            }
        }
    }
    world
}

/// Pseudo-random scatter of many block types over a single chunk.
fn make_world_noisy() -> World {
    let mut world = World::new();
    let ids: Vec<BlockId> = world.registry().iter().map(|(id, _)| id).collect();
    let mut counter = 0i32;
    for y in 0..256 {
        for z in 0..16 {
            for x in 0..16 {
                counter = counter.wrapping_mul(1103515245).wrapping_add(12345);
                let id = ids[(counter.unsigned_abs() as usize) % ids.len()];
                world.set_block(id, x, y, z).unwrap();
            }
        }
    }
    world
}

// ── Benchmarks ───────────────────────────────────────────────────────────────

fn bench_set_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_block");
    group.measurement_time(Duration::from_secs(3));

    for &size in &[16, 64] {
        group.bench_function(format!("{}_flat", size), |b| {
            b.iter(|| black_box(make_world_flat(size)));
        });
    }
    group.bench_function("biome_columns_64", |b| {
        b.iter(|| {
            let mut world = World::new();
            for x in 0..64 {
                for z in 0..64 {
                    world.set_biome_column(x, z, 0, 255, biome::FOREST).unwrap();
                }
            }
            black_box(world);
        });
    });
    group.finish();
}

fn bench_encode_states(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_states");

    let mut solid = Section::new(0);
    let mut mixed = Section::new(0);
    for y in 0..16 {
        for z in 0..16 {
            for x in 0..16 {
                solid.set_block(blocks::STONE, x, y, z).unwrap();
                mixed
                    .set_block(LAYERS[((x + y + z) % 4) as usize], x, y, z)
                    .unwrap();
            }
        }
    }
    for (name, section) in [("solid", &solid), ("mixed", &mixed)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let palette = section.palette();
                black_box(section.encode_states(&palette))
            });
        });
    }
    group.finish();
}

fn bench_save_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_regions");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    let flat = make_world_flat(128);
    let noisy = make_world_noisy();
    let serial = SaveOptions {
        parallel: false,
        ..SaveOptions::default()
    };

    group.bench_function("flat_128_parallel", |b| {
        b.iter(|| black_box(flat.save_regions(&SaveOptions::default()).unwrap()));
    });
    group.bench_function("flat_128_serial", |b| {
        b.iter(|| black_box(flat.save_regions(&serial).unwrap()));
    });
    group.bench_function("noisy_chunk", |b| {
        b.iter(|| black_box(noisy.save_regions(&serial).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_set_block,
    bench_encode_states,
    bench_save_regions
);
criterion_main!(benches);
