//! Terrain configuration loaded from and saved to TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::erosion::{ErosionSettings, MIN_EROSION_GRID_SIZE};
use crate::error::TerrainError;
use crate::noise::NoiseSettings;

/// Errors that can occur while loading or saving a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] TerrainError),
}

/// Everything needed for a full generate + erode + chunk cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Chunk side length in cells.
    pub chunk_size: usize,
    /// World distance between adjacent cells.
    pub cell_size: f32,
    pub noise: NoiseSettings,
    pub erosion: ErosionSettings,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            chunk_size: 32,
            cell_size: 1.0,
            noise: NoiseSettings::default(),
            erosion: ErosionSettings::default(),
        }
    }
}

impl TerrainConfig {
    /// Reports every precondition violation a regeneration would hit.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::InvalidDimensions(self.width, self.height));
        }
        if self.chunk_size == 0 {
            return Err(TerrainError::InvalidChunkSize(self.chunk_size));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(TerrainError::InvalidScale(self.cell_size));
        }
        self.noise.validate()?;
        self.erosion.validate()?;
        if self.erosion.droplet_count > 0 {
            if self.width != self.height {
                return Err(TerrainError::NonSquareGrid(self.width, self.height));
            }
            if self.width < MIN_EROSION_GRID_SIZE {
                return Err(TerrainError::GridTooSmall {
                    size: self.width,
                    min: MIN_EROSION_GRID_SIZE,
                });
            }
        }
        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
