//! RAW format export for game engine compatibility.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ExportError;
use crate::terrain::HeightGrid;

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian. Heights are written unnormalized.
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(&self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Exports a grid as headerless row-major samples.
///
/// R16 formats normalize `[min_height, max_height]` to `[0, 65535]`; the
/// range is ignored for `R32Float`.
pub fn export_grid_raw(
    grid: &HeightGrid,
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), ExportError> {
    if format != RawFormat::R32Float && min_height >= max_height {
        return Err(ExportError::InvalidHeightRange(min_height, max_height));
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let range = max_height - min_height;
    let quantize = |h: f32| (((h - min_height) / range).clamp(0.0, 1.0) * 65535.0) as u16;

    match format {
        RawFormat::R16LittleEndian => {
            for &height in grid.as_slice() {
                writer.write_all(&quantize(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in grid.as_slice() {
                writer.write_all(&quantize(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &height in grid.as_slice() {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Reads a headerless RAW heightmap of known dimensions.
///
/// R16 samples are mapped back onto `[min_height, max_height]`.
pub fn import_grid_raw(
    path: &Path,
    width: usize,
    height: usize,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<HeightGrid, ExportError> {
    let data = fs::read(path)?;
    let expected = expected_file_size(width, height, format);
    if data.len() as u64 != expected {
        return Err(ExportError::DataLength {
            got: data.len() as u64,
            expected,
        });
    }

    let range = max_height - min_height;
    let heights = match format {
        RawFormat::R16LittleEndian => data
            .chunks_exact(2)
            .map(|b| min_height + u16::from_le_bytes([b[0], b[1]]) as f32 / 65535.0 * range)
            .collect(),
        RawFormat::R16BigEndian => data
            .chunks_exact(2)
            .map(|b| min_height + u16::from_be_bytes([b[0], b[1]]) as f32 / 65535.0 * range)
            .collect(),
        RawFormat::R32Float => data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    };
    Ok(HeightGrid::from_vec(width, height, heights)?)
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(width: usize, height: usize, format: RawFormat) -> u64 {
    width as u64 * height as u64 * format.bytes_per_sample()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp(width: usize, height: usize) -> HeightGrid {
        let n = (width * height) as f32;
        HeightGrid::from_fn(width, height, |x, y| (y * width + x) as f32 / n * 2.0 - 1.0).unwrap()
    }

    #[test]
    fn test_export_grid_raw_r16() {
        let grid = ramp(64, 32);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_grid_raw(&grid, &path, RawFormat::R16LittleEndian, -1.0, 1.0).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), expected_file_size(64, 32, RawFormat::R16LittleEndian));
    }

    #[test]
    fn test_raw_content_correctness() {
        let grid = HeightGrid::from_vec(2, 2, vec![-1.0, 0.0, 0.5, 1.0]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_grid_raw(&grid, &path, RawFormat::R16BigEndian, -1.0, 1.0).unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(u16::from_be_bytes([data[0], data[1]]), 0);
        let mid = u16::from_be_bytes([data[2], data[3]]);
        assert!((mid as i32 - 32767).abs() < 2);
        assert_eq!(u16::from_be_bytes([data[6], data[7]]), 65535);
    }

    #[test]
    fn test_r32_preserves_heights() {
        let grid = HeightGrid::from_fn(8, 4, |x, y| x as f32 * 3.5 - y as f32 * 100.0).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.raw");

        export_grid_raw(&grid, &path, RawFormat::R32Float, 0.0, 0.0).unwrap();
        let back = import_grid_raw(&path, 8, 4, RawFormat::R32Float, 0.0, 0.0).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_import_wrong_length() {
        let grid = ramp(4, 4);
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.raw");
        export_grid_raw(&grid, &path, RawFormat::R16LittleEndian, -1.0, 1.0).unwrap();

        let result = import_grid_raw(&path, 8, 8, RawFormat::R16LittleEndian, -1.0, 1.0);
        assert!(matches!(
            result,
            Err(ExportError::DataLength { got: 32, expected: 128 })
        ));
    }

    #[test]
    fn test_invalid_range_for_r16() {
        let grid = ramp(4, 4);
        let dir = tempdir().unwrap();
        let result = export_grid_raw(&grid, &dir.path().join("x.raw"), RawFormat::R16LittleEndian, 1.0, 1.0);
        assert!(matches!(result, Err(ExportError::InvalidHeightRange(..))));
    }

    #[test]
    fn test_expected_file_size() {
        assert_eq!(expected_file_size(256, 256, RawFormat::R16LittleEndian), 256 * 256 * 2);
        assert_eq!(expected_file_size(256, 128, RawFormat::R32Float), 256 * 128 * 4);
    }
}
