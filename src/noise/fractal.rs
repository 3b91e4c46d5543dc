//! Multi-octave fractal Brownian motion (fBm) noise over a 2D grid.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

use crate::error::TerrainError;

/// Seed offset between consecutive octaves.
const OCTAVE_SEED_STRIDE: i32 = 31337;

/// Peak magnitude of simdnoise's raw 2D gradient output. Dividing by it maps
/// a sample onto `[-1, 1]`.
const GRADIENT_2D_PEAK: f32 = 0.0222;

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Horizontal scale in cells; larger values stretch features out.
    pub scale: f32,
    /// Number of noise octaves (0 yields a flat field).
    pub octaves: u32,
    /// Amplitude decay per octave (0-1 expected).
    pub persistence: f32,
    /// Frequency of the first octave.
    pub initial_frequency: f32,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
    /// Generated heights are remapped to `[0, terrain_height]`.
    pub terrain_height: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 64.0,
            octaves: 6,
            persistence: 0.5,
            initial_frequency: 1.0,
            lacunarity: 2.0,
            seed: 42,
            terrain_height: 32.0,
        }
    }
}

impl NoiseSettings {
    /// Creates settings with the given seed and default shape parameters.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Broad, low hills.
    pub fn rolling_hills(seed: i32) -> Self {
        Self {
            scale: 128.0,
            octaves: 4,
            persistence: 0.4,
            initial_frequency: 1.0,
            lacunarity: 2.0,
            seed,
            terrain_height: 16.0,
        }
    }

    /// Rugged high-detail ranges; the usual input for heavy erosion.
    pub fn mountains(seed: i32) -> Self {
        Self {
            scale: 96.0,
            octaves: 8,
            persistence: 0.55,
            initial_frequency: 1.5,
            lacunarity: 2.1,
            seed,
            terrain_height: 64.0,
        }
    }

    /// Checks the preconditions of [`accumulate_octaves`].
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(TerrainError::InvalidScale(self.scale));
        }
        if !(self.initial_frequency.is_finite() && self.initial_frequency > 0.0) {
            return Err(TerrainError::InvalidNoiseSettings(format!(
                "initial_frequency must be > 0, got {}",
                self.initial_frequency
            )));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            return Err(TerrainError::InvalidNoiseSettings(format!(
                "lacunarity must be > 0, got {}",
                self.lacunarity
            )));
        }
        if !self.persistence.is_finite() {
            return Err(TerrainError::InvalidNoiseSettings(format!(
                "persistence must be finite, got {}",
                self.persistence
            )));
        }
        if !(self.terrain_height.is_finite() && self.terrain_height >= 0.0) {
            return Err(TerrainError::InvalidNoiseSettings(format!(
                "terrain_height must be >= 0, got {}",
                self.terrain_height
            )));
        }
        Ok(())
    }

    /// Seed used for the given octave.
    pub fn octave_seed(&self, octave: u32) -> i32 {
        self.seed
            .wrapping_add((octave as i32).wrapping_mul(OCTAVE_SEED_STRIDE))
    }
}

/// Sums `settings.octaves` layers of gradient noise over a `width × height`
/// grid and returns the raw row-major accumulator (not yet normalized).
///
/// Cell `(x, y)` of each octave is sampled at
/// `(x / scale * frequency, y / scale * frequency)`, mapped onto `[-1, 1]`
/// by the fixed gradient peak and weighted by the octave's amplitude.
pub fn accumulate_octaves(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
) -> Result<Vec<f32>, TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::InvalidDimensions(width, height));
    }
    settings.validate()?;

    let mut accumulator = vec![0.0f32; width * height];
    let mut amplitude = 1.0f32;
    let mut frequency = settings.initial_frequency;

    for octave in 0..settings.octaves {
        let (samples, _, _) = NoiseBuilder::gradient_2d_offset(0.0, width, 0.0, height)
            .with_freq(frequency / settings.scale)
            .with_seed(settings.octave_seed(octave))
            .generate();

        accumulator
            .par_iter_mut()
            .zip(samples.par_iter())
            .for_each(|(acc, &n)| {
                *acc += (n / GRADIENT_2D_PEAK).clamp(-1.0, 1.0) * amplitude;
            });

        amplitude *= settings.persistence;
        frequency *= settings.lacunarity;
    }

    Ok(accumulator)
}
