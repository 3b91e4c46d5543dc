//! Hydraulic erosion.
//!
//! A precomputed [`ErosionBrush`] spreads each droplet's erosion over its
//! neighborhood; [`erode`] runs the droplets sequentially over a square
//! [`HeightGrid`](crate::terrain::HeightGrid).

mod brush;
mod config;
mod hydraulic;

pub use brush::ErosionBrush;
pub use config::ErosionSettings;
pub use hydraulic::{erode, validate_erosion, ErosionStats, MIN_EROSION_GRID_SIZE};
