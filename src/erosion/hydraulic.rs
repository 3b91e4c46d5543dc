//! Droplet-based hydraulic erosion.
//!
//! Droplets are simulated one after another over the same grid, so each one
//! sees the terrain left behind by its predecessors. Every step moves a
//! droplet one cell downhill; it erodes through the brush while it has spare
//! capacity and deposits bilinearly at its previous position when it is
//! overloaded or climbing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use super::brush::ErosionBrush;
use super::config::ErosionSettings;
use crate::error::TerrainError;
use crate::terrain::HeightGrid;

/// Smallest grid that leaves room to spawn inside a one-cell border.
pub const MIN_EROSION_GRID_SIZE: usize = 4;

/// Totals collected over one erosion pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErosionStats {
    /// Droplets simulated.
    pub droplets: u32,
    /// Steps taken across all droplets.
    pub steps: u64,
    /// Droplets that left the grid before reaching their lifetime.
    pub terminated_early: u32,
    /// Erosion steps skipped because the cell had no brush entry.
    pub skipped_erosion_steps: u64,
    /// Material removed from the grid.
    pub total_eroded: f64,
    /// Material added to the grid.
    pub total_deposited: f64,
}

/// Simulation-local droplet state.
#[derive(Debug, Clone, Copy)]
struct Droplet {
    position: Vec2,
    direction: Vec2,
    speed: f32,
    water: f32,
    sediment: f32,
}

impl Droplet {
    fn new(position: Vec2, settings: &ErosionSettings) -> Self {
        Self {
            position,
            direction: Vec2::ZERO,
            speed: settings.initial_speed,
            water: settings.initial_water_volume,
            sediment: 0.0,
        }
    }
}

/// Checks every precondition of [`erode`] without touching the grid.
pub fn validate_erosion(
    grid: &HeightGrid,
    brush: &ErosionBrush,
    settings: &ErosionSettings,
) -> Result<(), TerrainError> {
    settings.validate()?;
    if !grid.is_square() {
        return Err(TerrainError::NonSquareGrid(grid.width(), grid.height()));
    }
    if grid.width() < MIN_EROSION_GRID_SIZE {
        return Err(TerrainError::GridTooSmall {
            size: grid.width(),
            min: MIN_EROSION_GRID_SIZE,
        });
    }
    if brush.size() != grid.width() {
        return Err(TerrainError::BrushMismatch {
            brush: brush.size(),
            grid: grid.width(),
        });
    }
    Ok(())
}

/// Runs `settings.droplet_count` droplets over `grid`, mutating it in place.
///
/// The grid must be square and `brush` must have been built for its size.
/// All preconditions are checked before the first droplet runs.
#[instrument(skip(grid, brush, settings), fields(droplets = settings.droplet_count, seed = settings.seed))]
pub fn erode(
    grid: &mut HeightGrid,
    brush: &ErosionBrush,
    settings: &ErosionSettings,
) -> Result<ErosionStats, TerrainError> {
    validate_erosion(grid, brush, settings)?;

    let size = grid.width();
    let limit = (size - 1) as f32;
    let spawn_max = (size - 2) as f32;
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let mut stats = ErosionStats::default();

    for _ in 0..settings.droplet_count {
        let start = Vec2::new(
            rng.random_range(1.0..spawn_max),
            rng.random_range(1.0..spawn_max),
        );
        let mut droplet = Droplet::new(start, settings);
        stats.droplets += 1;

        for _ in 0..settings.max_droplet_lifetime {
            let node = droplet.position.floor();
            let offset = droplet.position - node;
            let cell = node.y as usize * size + node.x as usize;

            let (height, gradient) = grid.height_and_gradient(droplet.position.x, droplet.position.y);

            droplet.direction =
                droplet.direction * settings.inertia - gradient * (1.0 - settings.inertia);
            droplet.direction = droplet.direction.try_normalize().unwrap_or(Vec2::X);

            droplet.position += droplet.direction;
            stats.steps += 1;

            let p = droplet.position;
            if !p.is_finite() || p.x < 0.0 || p.x >= limit || p.y < 0.0 || p.y >= limit {
                stats.terminated_early += 1;
                break;
            }

            let new_height = grid.get_height_lerp(p.x, p.y);
            let delta_height = new_height - height;

            let capacity = (-delta_height
                * droplet.speed
                * droplet.water
                * settings.sediment_capacity_factor)
                .max(settings.min_sediment_capacity);

            if droplet.sediment > capacity || delta_height > 0.0 {
                let deposit = if delta_height > 0.0 {
                    delta_height.min(droplet.sediment)
                } else {
                    (droplet.sediment - capacity) * settings.deposit_speed
                };
                droplet.sediment -= deposit;
                deposit_bilinear(grid.heights_mut(), size, cell, offset, deposit, settings.height_limit);
                stats.total_deposited += deposit as f64;
            } else if brush.has_entry(cell) {
                let erode_amount = ((capacity - droplet.sediment) * settings.erode_speed).min(-delta_height);
                let heights = grid.heights_mut();
                for (index, weight) in brush.iter(cell) {
                    let old = heights[index];
                    let weighted = erode_amount * weight;
                    let lowered = old - weighted.min(old).max(0.0);
                    heights[index] = apply_limit(lowered, settings.height_limit);
                    // A clamp back up returns material to the cell.
                    let removed = (old - heights[index]).max(0.0);
                    droplet.sediment += removed;
                    stats.total_eroded += removed as f64;
                }
            } else {
                trace!(cell, "no brush entry, erosion skipped");
                stats.skipped_erosion_steps += 1;
            }

            droplet.speed = (droplet.speed * droplet.speed + delta_height * settings.gravity)
                .max(0.0)
                .sqrt();
            droplet.water *= 1.0 - settings.evaporate_speed;
        }
    }

    debug!(
        steps = stats.steps,
        terminated_early = stats.terminated_early,
        eroded = stats.total_eroded,
        deposited = stats.total_deposited,
        "erosion pass complete"
    );

    Ok(stats)
}

/// Adds `amount` to the four corners of `cell`, weighted by the droplet's
/// offset inside the cell.
fn deposit_bilinear(
    heights: &mut [f32],
    size: usize,
    cell: usize,
    offset: Vec2,
    amount: f32,
    limit: Option<(f32, f32)>,
) {
    let corners = [
        (cell, (1.0 - offset.x) * (1.0 - offset.y)),
        (cell + 1, offset.x * (1.0 - offset.y)),
        (cell + size, (1.0 - offset.x) * offset.y),
        (cell + size + 1, offset.x * offset.y),
    ];
    for (index, weight) in corners {
        heights[index] = apply_limit(heights[index] + amount * weight, limit);
    }
}

#[inline]
fn apply_limit(value: f32, limit: Option<(f32, f32)>) -> f32 {
    match limit {
        Some((lo, hi)) => value.clamp(lo, hi),
        None => value,
    }
}
