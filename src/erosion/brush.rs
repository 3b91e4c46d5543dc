//! Precomputed weighted neighborhoods for spreading erosion.
//!
//! Each interior cell owns a contiguous run in a flattened `(index, weight)`
//! table; `starts[cell]..starts[cell + 1]` addresses that run. Cells closer
//! than `radius` to an edge own an empty run.

use crate::error::TerrainError;

/// Weighted neighbor lists for every cell of a square grid.
#[derive(Debug, Clone)]
pub struct ErosionBrush {
    size: usize,
    radius: usize,
    starts: Vec<usize>,
    indices: Vec<u32>,
    weights: Vec<f32>,
}

impl ErosionBrush {
    /// Builds the brush for a `grid_size × grid_size` grid.
    ///
    /// Offsets `(dx, dy)` with `dx² + dy² < radius²` get weight
    /// `1 - sqrt(dx² + dy²) / radius`, normalized per cell to sum to 1.
    pub fn build(grid_size: usize, radius: usize) -> Result<Self, TerrainError> {
        if grid_size == 0 {
            return Err(TerrainError::InvalidDimensions(grid_size, grid_size));
        }
        if radius == 0 {
            return Err(TerrainError::InvalidErosionSettings(
                "erosion_radius must be >= 1".to_string(),
            ));
        }

        // The kernel is the same for every interior cell; only the target
        // indices differ.
        let r = radius as isize;
        let r_sq = (r * r) as f32;
        let mut kernel: Vec<(isize, isize, f32)> = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let dist_sq = (dx * dx + dy * dy) as f32;
                if dist_sq < r_sq {
                    kernel.push((dx, dy, 1.0 - dist_sq.sqrt() / radius as f32));
                }
            }
        }
        let weight_sum: f32 = kernel.iter().map(|&(_, _, w)| w).sum();
        for entry in &mut kernel {
            entry.2 /= weight_sum;
        }

        let cells = grid_size * grid_size;
        let interior = grid_size.saturating_sub(2 * radius);
        let mut starts = Vec::with_capacity(cells + 1);
        let mut indices = Vec::with_capacity(interior * interior * kernel.len());
        let mut weights = Vec::with_capacity(interior * interior * kernel.len());

        for y in 0..grid_size {
            for x in 0..grid_size {
                starts.push(indices.len());
                let is_interior = x >= radius
                    && y >= radius
                    && x + radius < grid_size
                    && y + radius < grid_size;
                if !is_interior {
                    continue;
                }
                for &(dx, dy, w) in &kernel {
                    let nx = (x as isize + dx) as usize;
                    let ny = (y as isize + dy) as usize;
                    indices.push((ny * grid_size + nx) as u32);
                    weights.push(w);
                }
            }
        }
        starts.push(indices.len());

        Ok(Self {
            size: grid_size,
            radius,
            starts,
            indices,
            weights,
        })
    }

    /// Side length of the grid this brush was built for.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Neighbor indices and weights for `cell` (empty near the edges).
    pub fn neighbors(&self, cell: usize) -> (&[u32], &[f32]) {
        let range = self.starts[cell]..self.starts[cell + 1];
        (&self.indices[range.clone()], &self.weights[range])
    }

    /// Iterates `(neighbor_index, weight)` pairs for `cell`.
    pub fn iter(&self, cell: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let (indices, weights) = self.neighbors(cell);
        indices.iter().zip(weights).map(|(&i, &w)| (i as usize, w))
    }

    /// Returns true if `cell` has a non-empty neighbor list.
    pub fn has_entry(&self, cell: usize) -> bool {
        self.starts[cell + 1] > self.starts[cell]
    }

    /// Total number of `(index, weight)` entries across all cells.
    pub fn entry_count(&self) -> usize {
        self.indices.len()
    }
}
