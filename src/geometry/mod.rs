//! Chunk geometry module.
//!
//! Partitions a height grid into fixed-size chunks with per-vertex normals,
//! a shared triangle list and world-space bounding boxes.

mod chunk;
mod chunker;

pub use chunk::{quad_indices, Aabb, Chunk, ChunkIndex, Vertex};
pub use chunker::{RebuildStats, Region, TerrainChunker};
