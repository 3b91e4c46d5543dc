//! The terrain object: grid, settings and chunks.

use std::collections::BTreeMap;

use tracing::{info, instrument};

use super::grid::HeightGrid;
use super::heightmap::generate_heightmap;
use crate::config::TerrainConfig;
use crate::erosion::{erode, ErosionBrush, ErosionSettings, ErosionStats};
use crate::error::TerrainError;
use crate::geometry::{Chunk, ChunkIndex, RebuildStats, Region, TerrainChunker};
use crate::noise::NoiseSettings;

/// A procedurally generated terrain and its renderable chunks.
///
/// Settings are plain records; edit them through
/// [`Terrain::noise_settings_mut`] / [`Terrain::erosion_settings_mut`] and call
/// [`Terrain::regenerate`] to rebuild everything from scratch.
#[derive(Debug, Clone)]
pub struct Terrain {
    grid: HeightGrid,
    chunker: TerrainChunker,
    noise: NoiseSettings,
    erosion: ErosionSettings,
    /// Reused across passes while grid size and radius stay the same.
    brush: Option<ErosionBrush>,
}

impl Terrain {
    /// Creates a flat terrain sized by `config`. Call [`Terrain::regenerate`]
    /// to fill it.
    pub fn new(config: &TerrainConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        Ok(Self {
            grid: HeightGrid::new(config.width, config.height)?,
            chunker: TerrainChunker::new(config.chunk_size, config.cell_size)?,
            noise: config.noise.clone(),
            erosion: config.erosion.clone(),
            brush: None,
        })
    }

    /// Wraps an existing grid (e.g. an imported heightmap) with default
    /// settings. No chunks are built until [`Terrain::rebuild`] is called.
    pub fn from_grid(grid: HeightGrid, chunk_size: usize, cell_size: f32) -> Result<Self, TerrainError> {
        Ok(Self {
            grid,
            chunker: TerrainChunker::new(chunk_size, cell_size)?,
            noise: NoiseSettings::default(),
            erosion: ErosionSettings::default(),
            brush: None,
        })
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    /// Direct access for edits. Chunks are stale until the next
    /// [`Terrain::rebuild`].
    pub fn grid_mut(&mut self) -> &mut HeightGrid {
        &mut self.grid
    }

    pub fn chunker(&self) -> &TerrainChunker {
        &self.chunker
    }

    pub fn chunks(&self) -> &BTreeMap<ChunkIndex, Chunk> {
        self.chunker.chunks()
    }

    pub fn chunk(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunker.get(index)
    }

    pub fn noise_settings(&self) -> &NoiseSettings {
        &self.noise
    }

    pub fn noise_settings_mut(&mut self) -> &mut NoiseSettings {
        &mut self.noise
    }

    pub fn erosion_settings(&self) -> &ErosionSettings {
        &self.erosion
    }

    pub fn erosion_settings_mut(&mut self) -> &mut ErosionSettings {
        &mut self.erosion
    }

    /// Regenerates the grid from noise, erodes it and rebuilds every chunk.
    ///
    /// Erosion is skipped when `droplet_count` is zero. On error the terrain
    /// is left exactly as it was.
    #[instrument(skip(self), fields(width = self.grid.width(), height = self.grid.height()))]
    pub fn regenerate(&mut self) -> Result<ErosionStats, TerrainError> {
        let mut grid = generate_heightmap(self.grid.width(), self.grid.height(), &self.noise)?;
        let stats = run_erosion(&mut self.brush, &self.erosion, &mut grid)?;

        self.grid = grid;
        let chunks = self.chunker.rebuild(&self.grid, Region::full(&self.grid));
        let (min, max) = self.grid.height_range();

        info!(
            droplets = stats.droplets,
            chunks = self.chunker.len(),
            added = chunks.added,
            removed = chunks.removed,
            min_height = min,
            max_height = max,
            "terrain regenerated"
        );
        Ok(stats)
    }

    /// Runs one erosion pass over the current grid in place. Chunks are stale
    /// until the next [`Terrain::rebuild`].
    pub fn erode(&mut self) -> Result<ErosionStats, TerrainError> {
        run_erosion(&mut self.brush, &self.erosion, &mut self.grid)
    }

    /// Brings the chunk set in line with `region` (see
    /// [`TerrainChunker::rebuild`]).
    pub fn rebuild(&mut self, region: Region) -> RebuildStats {
        self.chunker.rebuild(&self.grid, region)
    }
}

/// Erodes `grid`, building the brush only when the cached one does not fit.
fn run_erosion(
    cache: &mut Option<ErosionBrush>,
    settings: &ErosionSettings,
    grid: &mut HeightGrid,
) -> Result<ErosionStats, TerrainError> {
    if settings.droplet_count == 0 {
        return Ok(ErosionStats::default());
    }
    settings.validate()?;
    if !grid.is_square() {
        return Err(TerrainError::NonSquareGrid(grid.width(), grid.height()));
    }

    let size = grid.width();
    let radius = settings.erosion_radius;
    let brush = match cache {
        Some(brush) if brush.size() == size && brush.radius() == radius => brush,
        _ => cache.insert(ErosionBrush::build(size, radius)?),
    };
    erode(grid, brush, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(droplets: u32) -> TerrainConfig {
        TerrainConfig {
            width: 64,
            height: 64,
            chunk_size: 16,
            cell_size: 1.0,
            noise: NoiseSettings::with_seed(11),
            erosion: ErosionSettings {
                droplet_count: droplets,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_new_terrain_is_flat_and_unchunked() {
        let terrain = Terrain::new(&small_config(0)).unwrap();
        assert!(terrain.grid().as_slice().iter().all(|&h| h == 0.0));
        assert!(terrain.chunks().is_empty());
    }

    #[test]
    fn test_regenerate_builds_all_chunks() {
        let mut terrain = Terrain::new(&small_config(500)).unwrap();
        let stats = terrain.regenerate().unwrap();

        assert_eq!(stats.droplets, 500);
        assert_eq!(terrain.chunks().len(), 16);
        assert!(terrain.grid().as_slice().iter().any(|&h| h != 0.0));
    }

    #[test]
    fn test_regenerate_is_deterministic() {
        let mut a = Terrain::new(&small_config(300)).unwrap();
        let mut b = Terrain::new(&small_config(300)).unwrap();
        a.regenerate().unwrap();
        b.regenerate().unwrap();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_settings_edit_changes_result() {
        let mut terrain = Terrain::new(&small_config(0)).unwrap();
        terrain.regenerate().unwrap();
        let before = terrain.grid().clone();

        terrain.noise_settings_mut().seed = 12;
        terrain.regenerate().unwrap();
        assert_ne!(terrain.grid(), &before);
    }

    #[test]
    fn test_failed_regenerate_leaves_terrain_untouched() {
        let mut terrain = Terrain::new(&small_config(0)).unwrap();
        terrain.regenerate().unwrap();
        let before = terrain.grid().clone();

        terrain.noise_settings_mut().scale = 0.0;
        assert_eq!(terrain.regenerate(), Err(TerrainError::InvalidScale(0.0)));
        assert_eq!(terrain.grid(), &before);
    }

    #[test]
    fn test_non_square_erosion_rejected() {
        let grid = HeightGrid::new(32, 16).unwrap();
        let mut terrain = Terrain::from_grid(grid, 8, 1.0).unwrap();
        terrain.erosion_settings_mut().droplet_count = 10;
        assert_eq!(terrain.erode(), Err(TerrainError::NonSquareGrid(32, 16)));
        assert_eq!(terrain.grid().width(), 32);
    }

    #[test]
    fn test_edit_then_rebuild_region() {
        let mut terrain = Terrain::new(&small_config(0)).unwrap();
        terrain.regenerate().unwrap();

        terrain.grid_mut().set_height_at(20, 20, 500.0).unwrap();
        let stats = terrain.rebuild(Region::new(16, 16, 32, 32));

        assert_eq!(stats.removed, 15);
        let chunk = terrain.chunk(ChunkIndex::new(1, 1)).unwrap();
        assert_eq!(chunk.world_bounding_box.max.y, 500.0);
    }

    #[test]
    fn test_brush_reused_between_passes() {
        let mut terrain = Terrain::new(&small_config(50)).unwrap();
        terrain.erode().unwrap();
        let entries = terrain.brush.as_ref().map(|b| b.entry_count());
        terrain.erode().unwrap();
        assert_eq!(terrain.brush.as_ref().map(|b| b.entry_count()), entries);
        assert_eq!(terrain.brush.as_ref().map(|b| b.size()), Some(64));
    }
}
