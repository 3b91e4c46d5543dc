//! Erosion configuration.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Parameters for droplet-based hydraulic erosion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionSettings {
    /// Radius (in cells) of the brush that spreads erosion around a droplet.
    pub erosion_radius: usize,
    /// How much a droplet keeps its previous direction (0-1).
    pub inertia: f32,
    /// Multiplier on how much sediment a droplet can carry.
    pub sediment_capacity_factor: f32,
    /// Floor on sediment capacity so droplets on flat ground still erode.
    pub min_sediment_capacity: f32,
    /// Fraction of free capacity eroded per step (0-1).
    pub erode_speed: f32,
    /// Fraction of excess sediment deposited per step (0-1).
    pub deposit_speed: f32,
    /// Fraction of water lost per step (0-1).
    pub evaporate_speed: f32,
    pub gravity: f32,
    pub initial_water_volume: f32,
    pub initial_speed: f32,
    /// Maximum number of steps a single droplet is simulated for.
    pub max_droplet_lifetime: u32,
    /// Number of droplets simulated per pass.
    pub droplet_count: u32,
    /// Seed for droplet spawn positions.
    pub seed: u64,
    /// Optional `(min, max)` clamp applied to every cell a droplet edits.
    /// `None` leaves heights unbounded.
    pub height_limit: Option<(f32, f32)>,
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            erosion_radius: 3,
            inertia: 0.05,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: 0.01,
            erode_speed: 0.3,
            deposit_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            initial_water_volume: 1.0,
            initial_speed: 1.0,
            max_droplet_lifetime: 30,
            droplet_count: 50_000,
            seed: 1,
            height_limit: None,
        }
    }
}

impl ErosionSettings {
    /// A short, light pass useful for previews.
    pub fn light(seed: u64) -> Self {
        Self {
            droplet_count: 10_000,
            seed,
            ..Default::default()
        }
    }

    /// Long-lived droplets with a wide brush for pronounced valleys.
    pub fn heavy(seed: u64) -> Self {
        Self {
            erosion_radius: 4,
            max_droplet_lifetime: 64,
            droplet_count: 200_000,
            seed,
            ..Default::default()
        }
    }

    /// Checks ranges that the simulator relies on.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.erosion_radius == 0 {
            return Err(invalid("erosion_radius must be >= 1".to_string()));
        }
        let unit = [
            ("inertia", self.inertia),
            ("erode_speed", self.erode_speed),
            ("deposit_speed", self.deposit_speed),
            ("evaporate_speed", self.evaporate_speed),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }
        let non_negative = [
            ("sediment_capacity_factor", self.sediment_capacity_factor),
            ("min_sediment_capacity", self.min_sediment_capacity),
            ("gravity", self.gravity),
            ("initial_water_volume", self.initial_water_volume),
            ("initial_speed", self.initial_speed),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{} must be finite and >= 0, got {}", name, value)));
            }
        }
        if let Some((lo, hi)) = self.height_limit {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(invalid(format!("height_limit ({}, {}) is not a valid range", lo, hi)));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> TerrainError {
    TerrainError::InvalidErosionSettings(message)
}
