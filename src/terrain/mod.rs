//! Terrain generation module.
//!
//! Provides the [`HeightGrid`] storage type, noise-driven heightmap
//! generation and the [`Terrain`] object tying generation, erosion and
//! chunking together.

mod grid;
mod heightmap;
mod world;

pub use grid::HeightGrid;
pub use heightmap::{generate_heightmap, outline, rescale};
pub use world::Terrain;
