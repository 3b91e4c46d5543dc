use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use terrain_erosion::{erode, generate_heightmap, ErosionBrush, ErosionSettings, NoiseSettings, Region, TerrainChunker};

fn bench_heightmap(c: &mut Criterion) {
    let settings = NoiseSettings::with_seed(7);
    c.bench_function("generate_heightmap 256x256", |b| {
        b.iter(|| generate_heightmap(256, 256, black_box(&settings)))
    });
}

fn bench_erosion(c: &mut Criterion) {
    let base = generate_heightmap(128, 128, &NoiseSettings::with_seed(7)).unwrap();
    let brush = ErosionBrush::build(128, 3).unwrap();
    let settings = ErosionSettings {
        droplet_count: 5_000,
        ..Default::default()
    };

    c.bench_function("erode 128x128 5k droplets", |b| {
        b.iter(|| {
            let mut grid = base.clone();
            erode(&mut grid, &brush, black_box(&settings))
        })
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let grid = generate_heightmap(256, 256, &NoiseSettings::with_seed(7)).unwrap();
    let region = Region::full(&grid);

    c.bench_function("TerrainChunker rebuild 256x256 / 32", |b| {
        b.iter(|| {
            let mut chunker = TerrainChunker::new(32, 1.0).unwrap();
            chunker.rebuild(black_box(&grid), region)
        })
    });
}

criterion_group!(benches, bench_heightmap, bench_erosion, bench_rebuild);
criterion_main!(benches);
