//! Heightmap generation using fractal noise.

use rayon::prelude::*;
use tracing::{debug, instrument};

use super::grid::HeightGrid;
use crate::error::TerrainError;
use crate::noise::{accumulate_octaves, NoiseSettings};

/// Generates a `width × height` heightmap from fractal noise.
///
/// The raw octave sum is scanned for its true min/max and every cell is
/// linearly remapped to `[0, settings.terrain_height]`. A field with no
/// variation (e.g. zero octaves) maps to all zeros.
///
/// The result depends only on the dimensions and settings.
#[instrument(skip(settings), fields(seed = settings.seed, octaves = settings.octaves))]
pub fn generate_heightmap(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
) -> Result<HeightGrid, TerrainError> {
    let mut heights = accumulate_octaves(width, height, settings)?;

    let (min, max) = heights
        .par_iter()
        .fold(
            || (f32::MAX, f32::MIN),
            |(lo, hi), &h| (lo.min(h), hi.max(h)),
        )
        .reduce(|| (f32::MAX, f32::MIN), |a, b| (a.0.min(b.0), a.1.max(b.1)));

    let range = max - min;
    let terrain_height = settings.terrain_height;

    if range > 0.0 {
        heights.par_iter_mut().for_each(|h| {
            *h = ((*h - min) / range * terrain_height).clamp(0.0, terrain_height);
        });
    } else {
        heights.fill(0.0);
    }

    debug!(width, height, raw_min = min, raw_max = max, "heightmap generated");

    HeightGrid::from_vec(width, height, heights)
}

/// Linearly remaps every cell from `[cur_min, cur_max]` to `[new_min, new_max]`.
///
/// Calling it again with the ranges swapped restores the original values up
/// to floating-point rounding. If any remapped value would not be finite the
/// grid is left untouched.
pub fn rescale(
    grid: &mut HeightGrid,
    cur_min: f32,
    cur_max: f32,
    new_min: f32,
    new_max: f32,
) -> Result<(), TerrainError> {
    let cur_range = cur_max - cur_min;
    if cur_range == 0.0 || !cur_range.is_finite() || !(new_max - new_min).is_finite() {
        return Err(TerrainError::InvalidRescaleRange(cur_min, cur_max));
    }
    let new_range = new_max - new_min;

    let remapped: Vec<f32> = grid
        .as_slice()
        .par_iter()
        .map(|&h| new_min + (h - cur_min) / cur_range * new_range)
        .collect();
    if let Some(i) = remapped.iter().position(|h| !h.is_finite()) {
        return Err(TerrainError::NonFiniteHeight {
            x: i % grid.width(),
            y: i / grid.width(),
            value: remapped[i],
        });
    }

    grid.heights_mut().copy_from_slice(&remapped);
    Ok(())
}

/// Forces every cell within `outline_size` cells of any edge to `outline_height`.
pub fn outline(grid: &mut HeightGrid, outline_height: f32, outline_size: usize) -> Result<(), TerrainError> {
    if !outline_height.is_finite() {
        return Err(TerrainError::NonFiniteHeight {
            x: 0,
            y: 0,
            value: outline_height,
        });
    }
    let width = grid.width();
    let height = grid.height();

    grid.heights_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let edge_row = y < outline_size || y + outline_size >= height;
            for (x, h) in row.iter_mut().enumerate() {
                if edge_row || x < outline_size || x + outline_size >= width {
                    *h = outline_height;
                }
            }
        });
    Ok(())
}
