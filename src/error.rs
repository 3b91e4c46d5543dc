//! Precondition errors shared by the generation, erosion and chunking passes.

use thiserror::Error;

/// Invalid input detected before any grid mutation takes place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Invalid grid dimensions: {0}x{1} (both must be > 0)")]
    InvalidDimensions(usize, usize),
    #[error("Invalid noise scale: {0} (must be > 0 and finite)")]
    InvalidScale(f32),
    #[error("Invalid noise settings: {0}")]
    InvalidNoiseSettings(String),
    #[error("Erosion requires a square grid, got {0}x{1}")]
    NonSquareGrid(usize, usize),
    #[error("Grid of size {size} is too small for erosion (minimum {min})")]
    GridTooSmall { size: usize, min: usize },
    #[error("Erosion brush was built for size {brush}, grid has size {grid}")]
    BrushMismatch { brush: usize, grid: usize },
    #[error("Invalid erosion settings: {0}")]
    InvalidErosionSettings(String),
    #[error("Invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),
    #[error("Invalid rescale range: current [{0}, {1}] must not be empty")]
    InvalidRescaleRange(f32, f32),
    #[error("Height data length {got} does not match {width}x{height}")]
    LengthMismatch { got: usize, width: usize, height: usize },
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
    #[error("Non-finite height {value} at ({x}, {y})")]
    NonFiniteHeight { x: usize, y: usize, value: f32 },
}
