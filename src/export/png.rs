//! PNG heightmap export and import.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use super::ExportError;
use crate::terrain::HeightGrid;

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Height mapped to black.
    pub min_height: f32,
    /// Height mapped to white.
    pub max_height: f32,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options spanning the grid's own height range.
    ///
    /// A flat grid gets a unit-wide range so export still succeeds.
    pub fn auto_range(grid: &HeightGrid) -> Self {
        let (min, max) = grid.height_range();
        let max = if max > min { max } else { min + 1.0 };
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

fn create_encoder(path: &Path, options: &PngExportOptions) -> Result<PngEncoder<BufWriter<File>>, ExportError> {
    let file = File::create(path)?;
    Ok(PngEncoder::new_with_quality(
        BufWriter::new(file),
        options.compression,
        options.filter,
    ))
}

/// Exports a grid as a 16-bit grayscale PNG, normalized to the options'
/// height range. Heights outside the range saturate.
pub fn export_grid_png(
    grid: &HeightGrid,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), ExportError> {
    let min = options.min_height;
    let max = options.max_height;
    if min >= max {
        return Err(ExportError::InvalidHeightRange(min, max));
    }

    let range = max - min;
    let pixels: Vec<u16> = grid
        .as_slice()
        .iter()
        .map(|&h| (((h - min) / range).clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();

    // The encoder takes native-endian samples and swaps them itself.
    let bytes: &[u8] = bytemuck::cast_slice(&pixels);

    create_encoder(path, options)?.write_image(
        bytes,
        grid.width() as u32,
        grid.height() as u32,
        ExtendedColorType::L16,
    )?;
    debug!(path = %path.display(), "exported 16-bit heightmap");
    Ok(())
}

/// Exports a grid whose heights lie in `[0, 1]` as an 8-bit grayscale PNG.
///
/// This is the inverse of [`import_grid_png`] up to 8-bit quantization.
pub fn export_grid_png_u8(grid: &HeightGrid, path: &Path) -> Result<(), ExportError> {
    let pixels: Vec<u8> = grid
        .as_slice()
        .iter()
        .map(|&h| (h.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    create_encoder(path, &PngExportOptions::default())?.write_image(
        &pixels,
        grid.width() as u32,
        grid.height() as u32,
        ExtendedColorType::L8,
    )?;
    Ok(())
}

/// Loads any supported image as a heightmap.
///
/// The image is converted to 8-bit luma and each cell becomes
/// `pixel / 255`, so heights land in `[0, 1]`.
pub fn import_grid_png(path: &Path) -> Result<HeightGrid, ExportError> {
    let luma = image::open(path)?.to_luma8();
    let (width, height) = luma.dimensions();
    let heights = luma.as_raw().iter().map(|&p| p as f32 / 255.0).collect();
    let grid = HeightGrid::from_vec(width as usize, height as usize, heights)?;
    debug!(path = %path.display(), width, height, "imported heightmap");
    Ok(grid)
}
