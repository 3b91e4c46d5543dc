//! Procedural terrain generation with droplet hydraulic erosion.
//!
//! A [`HeightGrid`] is filled from fractal noise, carved by sequential
//! erosion droplets and sliced into renderable chunks with vertices,
//! normals, shared indices and bounding boxes.

pub mod config;
pub mod erosion;
pub mod error;
pub mod export;
pub mod geometry;
pub mod noise;
pub mod terrain;

pub use config::{ConfigError, TerrainConfig};
pub use erosion::{erode, ErosionBrush, ErosionSettings, ErosionStats};
pub use error::TerrainError;
pub use geometry::{Aabb, Chunk, ChunkIndex, RebuildStats, Region, TerrainChunker, Vertex};
pub use noise::NoiseSettings;
pub use terrain::{generate_heightmap, outline, rescale, HeightGrid, Terrain};
