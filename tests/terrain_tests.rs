use terrain_erosion::export::{export_grid_png_u8, import_grid_png};
use terrain_erosion::{
    erode, generate_heightmap, rescale, ChunkIndex, ErosionBrush, ErosionSettings, HeightGrid, NoiseSettings,
    Region, Terrain, TerrainChunker, TerrainConfig,
};

fn config(size: usize, chunk_size: usize, droplets: u32) -> TerrainConfig {
    TerrainConfig {
        width: size,
        height: size,
        chunk_size,
        cell_size: 1.0,
        noise: NoiseSettings::with_seed(2024),
        erosion: ErosionSettings {
            droplet_count: droplets,
            seed: 99,
            ..Default::default()
        },
    }
}

#[test]
fn full_cycle_through_terrain() {
    let mut terrain = Terrain::new(&config(96, 32, 2_000)).unwrap();
    let stats = terrain.regenerate().unwrap();

    assert_eq!(stats.droplets, 2_000);
    assert_eq!(terrain.chunks().len(), 9);
    for chunk in terrain.chunks().values() {
        assert_eq!(chunk.vertices.len(), 33 * 33);
        assert!(chunk.world_bounding_box.is_valid());
        assert!(chunk.vertices.iter().all(|v| v.normal.is_normalized()));
    }
}

#[test]
fn manual_pipeline_matches_terrain() {
    let cfg = config(64, 16, 500);

    let mut grid = generate_heightmap(64, 64, &cfg.noise).unwrap();
    let brush = ErosionBrush::build(64, cfg.erosion.erosion_radius).unwrap();
    erode(&mut grid, &brush, &cfg.erosion).unwrap();

    let mut terrain = Terrain::new(&cfg).unwrap();
    terrain.regenerate().unwrap();

    assert_eq!(terrain.grid(), &grid);
}

#[test]
fn fresh_grid_is_within_terrain_height() {
    let noise = NoiseSettings {
        terrain_height: 12.0,
        ..NoiseSettings::with_seed(5)
    };
    let grid = generate_heightmap(80, 48, &noise).unwrap();
    assert!(grid.as_slice().iter().all(|&h| (0.0..=12.0).contains(&h)));
}

#[test]
fn rescale_round_trip() {
    let mut grid = generate_heightmap(32, 32, &NoiseSettings::with_seed(3)).unwrap();
    let original = grid.clone();

    rescale(&mut grid, 0.0, 32.0, -100.0, 100.0).unwrap();
    rescale(&mut grid, -100.0, 100.0, 0.0, 32.0).unwrap();

    for (a, b) in original.as_slice().iter().zip(grid.as_slice()) {
        assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
    }
}

#[test]
fn chunk_coverage_for_uneven_grid() {
    let grid = generate_heightmap(100, 100, &NoiseSettings::with_seed(1)).unwrap();
    let mut chunker = TerrainChunker::new(32, 2.0).unwrap();
    chunker.rebuild(&grid, Region::full(&grid));

    // ceil(100 / 32) = 4
    assert_eq!(chunker.len(), 16);
    let last = chunker.get(ChunkIndex::new(3, 3)).expect("far corner chunk");
    assert_eq!(last.world_bounding_box.max.x, 128.0 * 2.0);
}

#[test]
fn shrink_then_grow_region() {
    let mut terrain = Terrain::new(&config(64, 16, 0)).unwrap();
    terrain.regenerate().unwrap();

    let stats = terrain.rebuild(Region::new(0, 0, 16, 16));
    assert_eq!(stats.removed, 15);
    assert_eq!(terrain.chunks().len(), 1);

    let stats = terrain.rebuild(Region::full(terrain.grid()));
    assert_eq!(stats.added, 15);
    assert_eq!(terrain.chunks().len(), 16);
}

#[test]
fn imported_heightmap_drives_chunks() {
    let source = HeightGrid::from_fn(32, 32, |x, y| ((x * y) % 256) as f32 / 255.0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("height.png");
    export_grid_png_u8(&source, &path).unwrap();

    let grid = import_grid_png(&path).unwrap();
    assert_eq!(grid, source);

    let mut terrain = Terrain::from_grid(grid, 8, 1.0).unwrap();
    terrain.rebuild(Region::full(terrain.grid()));
    assert_eq!(terrain.chunks().len(), 16);
}

#[test]
fn config_file_drives_terrain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terrain.toml");
    config(48, 16, 100).save(&path).unwrap();

    let loaded = TerrainConfig::load(&path).unwrap();
    let mut terrain = Terrain::new(&loaded).unwrap();
    terrain.regenerate().unwrap();
    assert_eq!(terrain.chunks().len(), 9);
}
