//! Region-driven chunk management.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::chunk::{quad_indices, Chunk, ChunkIndex};
use crate::error::TerrainError;
use crate::terrain::HeightGrid;

/// A half-open rectangle of grid cells `[min_x, max_x) × [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl Region {
    pub fn new(min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The whole grid.
    pub fn full(grid: &HeightGrid) -> Self {
        Self::new(0, 0, grid.width(), grid.height())
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Intersection with a `width × height` grid.
    pub fn clamped(&self, width: usize, height: usize) -> Self {
        Self::new(
            self.min_x.min(width),
            self.min_y.min(height),
            self.max_x.min(width),
            self.max_y.min(height),
        )
    }

    /// Returns true if the chunk's cell range shares at least one cell with
    /// this region.
    pub fn overlaps_chunk(&self, index: ChunkIndex, chunk_size: usize) -> bool {
        let (x0, y0) = index.origin(chunk_size);
        !self.is_empty()
            && x0 < self.max_x
            && x0 + chunk_size > self.min_x
            && y0 < self.max_y
            && y0 + chunk_size > self.min_y
    }

    /// Every chunk index overlapping this region.
    pub fn chunk_indices(&self, chunk_size: usize) -> impl Iterator<Item = ChunkIndex> {
        let (xs, ys) = if self.is_empty() {
            (0..0, 0..0)
        } else {
            (
                self.min_x / chunk_size..self.max_x.div_ceil(chunk_size),
                self.min_y / chunk_size..self.max_y.div_ceil(chunk_size),
            )
        };
        ys.flat_map(move |y| {
            xs.clone()
                .map(move |x| ChunkIndex::new(x as u32, y as u32))
        })
    }
}

/// Counts reported by [`TerrainChunker::rebuild`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Chunks created for indices that had no entry.
    pub added: usize,
    /// Existing chunks regenerated in place.
    pub regenerated: usize,
    /// Chunks dropped because they no longer overlap the region.
    pub removed: usize,
}

/// Slices a [`HeightGrid`] into fixed-size chunks keyed by [`ChunkIndex`].
#[derive(Debug, Clone)]
pub struct TerrainChunker {
    chunk_size: usize,
    cell_size: f32,
    chunks: BTreeMap<ChunkIndex, Chunk>,
    indices: Arc<[u32]>,
}

impl TerrainChunker {
    /// Creates an empty chunker. `cell_size` is the world distance between
    /// adjacent grid cells.
    pub fn new(chunk_size: usize, cell_size: f32) -> Result<Self, TerrainError> {
        if chunk_size == 0 {
            return Err(TerrainError::InvalidChunkSize(chunk_size));
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(TerrainError::InvalidScale(cell_size));
        }
        Ok(Self {
            chunk_size,
            cell_size,
            chunks: BTreeMap::new(),
            indices: quad_indices(chunk_size),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// All live chunks, ordered by index.
    pub fn chunks(&self) -> &BTreeMap<ChunkIndex, Chunk> {
        &self.chunks
    }

    pub fn get(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.get(&index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Triangle list shared by every chunk.
    pub fn indices(&self) -> &Arc<[u32]> {
        &self.indices
    }

    /// Makes the chunk set match `region`.
    ///
    /// Chunks that no longer overlap the region are removed; every chunk that
    /// does overlap is regenerated from `grid`, whether or not it existed
    /// before. The region is clamped to the grid first.
    #[instrument(skip(self, grid), fields(chunk_size = self.chunk_size))]
    pub fn rebuild(&mut self, grid: &HeightGrid, region: Region) -> RebuildStats {
        let region = region.clamped(grid.width(), grid.height());
        let wanted: BTreeSet<ChunkIndex> = region.chunk_indices(self.chunk_size).collect();

        let before = self.chunks.len();
        self.chunks.retain(|index, _| wanted.contains(index));
        let removed = before - self.chunks.len();
        let regenerated = self.chunks.len();

        let chunk_size = self.chunk_size;
        let cell_size = self.cell_size;
        let indices = &self.indices;
        let built: Vec<Chunk> = wanted
            .par_iter()
            .map(|&index| Chunk::build(grid, index, chunk_size, cell_size, Arc::clone(indices)))
            .collect();

        for chunk in built {
            self.chunks.insert(chunk.grid_index, chunk);
        }

        let stats = RebuildStats {
            added: wanted.len() - regenerated,
            regenerated,
            removed,
        };
        debug!(
            added = stats.added,
            regenerated = stats.regenerated,
            removed = stats.removed,
            "chunks rebuilt"
        );
        stats
    }
}
