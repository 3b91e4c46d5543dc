//! Heightmap import and export.
//!
//! 16-bit PNG for general use, 8-bit PNG for the `pixel / 255` round trip,
//! and RAW formats for game engine imports.

mod png;
mod raw;

use thiserror::Error;

use crate::error::TerrainError;

pub use png::{export_grid_png, export_grid_png_u8, import_grid_png, PngExportOptions};
pub use raw::{expected_file_size, export_grid_raw, import_grid_raw, RawFormat};

/// Errors that can occur while reading or writing heightmap files.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("Data length {got} does not match expected {expected} bytes")]
    DataLength { got: u64, expected: u64 },
    #[error("Invalid height data: {0}")]
    Grid(#[from] TerrainError),
}
