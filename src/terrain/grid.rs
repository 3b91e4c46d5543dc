//! Height storage and sampling.

use glam::{Vec2, Vec3};

use crate::error::TerrainError;

/// A `width × height` field of scalar elevations stored in row-major order.
///
/// Integer reads outside the grid wrap around (modulo the grid dimensions), so
/// every coordinate has a defined, finite height. Cloning performs a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// Creates a zero-filled grid.
    pub fn new(width: usize, height: usize) -> Result<Self, TerrainError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            heights: vec![0.0; width * height],
        })
    }

    /// Wraps existing row-major height data.
    pub fn from_vec(width: usize, height: usize, heights: Vec<f32>) -> Result<Self, TerrainError> {
        check_dimensions(width, height)?;
        if heights.len() != width * height {
            return Err(TerrainError::LengthMismatch {
                got: heights.len(),
                width,
                height,
            });
        }
        if let Some(i) = heights.iter().position(|h| !h.is_finite()) {
            return Err(TerrainError::NonFiniteHeight {
                x: i % width,
                y: i / width,
                value: heights[i],
            });
        }
        Ok(Self {
            width,
            height,
            heights,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self, TerrainError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        check_dimensions(width, height)?;
        let mut heights = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                heights.push(f(x, y));
            }
        }
        Self::from_vec(width, height, heights)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true when `width == height`, as erosion requires.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Returns true if `(x, y)` addresses a stored cell.
    pub fn is_in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Returns the stored height at `(x, y)`, wrapping out-of-range coordinates.
    #[inline]
    pub fn get_height(&self, x: isize, y: isize) -> f32 {
        let xi = x.rem_euclid(self.width as isize) as usize;
        let yi = y.rem_euclid(self.height as isize) as usize;
        self.heights[yi * self.width + xi]
    }

    /// Returns the stored height of an in-bounds cell.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.heights[self.index(x, y)]
    }

    /// Overwrites the height of an in-bounds cell.
    pub fn set_height_at(&mut self, x: usize, y: usize, value: f32) -> Result<(), TerrainError> {
        self.check_cell(x, y)?;
        if !value.is_finite() {
            return Err(TerrainError::NonFiniteHeight { x, y, value });
        }
        let i = self.index(x, y);
        self.heights[i] = value;
        Ok(())
    }

    /// Adds `delta` to an in-bounds cell. The cell is left untouched if the
    /// result would not be finite.
    pub fn add_height_at(&mut self, x: usize, y: usize, delta: f32) -> Result<(), TerrainError> {
        self.check_cell(x, y)?;
        let i = self.index(x, y);
        let value = self.heights[i] + delta;
        if !value.is_finite() {
            return Err(TerrainError::NonFiniteHeight { x, y, value });
        }
        self.heights[i] = value;
        Ok(())
    }

    fn check_cell(&self, x: usize, y: usize) -> Result<(), TerrainError> {
        if x >= self.width || y >= self.height {
            return Err(TerrainError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Bilinearly interpolates the four integer corners around `(x, y)`.
    ///
    /// At integer coordinates the result equals [`HeightGrid::get_height`]
    /// exactly, since the other three corners are weighted by zero.
    pub fn get_height_lerp(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (xi, yi) = (x0 as isize, y0 as isize);

        let h00 = self.get_height(xi, yi);
        let h10 = self.get_height(xi + 1, yi);
        let h01 = self.get_height(xi, yi + 1);
        let h11 = self.get_height(xi + 1, yi + 1);

        h00 * (1.0 - fx) * (1.0 - fy) + h10 * fx * (1.0 - fy) + h01 * (1.0 - fx) * fy + h11 * fx * fy
    }

    /// Bilinear height and gradient at `(x, y)` from the four enclosing corners.
    ///
    /// The gradient points uphill: `x` is the slope along increasing `x`, `y`
    /// along increasing `y`.
    pub fn height_and_gradient(&self, x: f32, y: f32) -> (f32, Vec2) {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (xi, yi) = (x0 as isize, y0 as isize);

        let nw = self.get_height(xi, yi);
        let ne = self.get_height(xi + 1, yi);
        let sw = self.get_height(xi, yi + 1);
        let se = self.get_height(xi + 1, yi + 1);

        let gradient = Vec2::new(
            (ne - nw) * (1.0 - fy) + (se - sw) * fy,
            (sw - nw) * (1.0 - fx) + (se - ne) * fx,
        );
        let height = nw * (1.0 - fx) * (1.0 - fy) + ne * fx * (1.0 - fy) + sw * (1.0 - fx) * fy + se * fx * fy;

        (height, gradient)
    }

    /// Surface normal of cell `(x, y)` from its ±1 cell neighbors.
    ///
    /// Central differences inside the grid; on a border the missing neighbor
    /// is replaced by the cell itself and the difference becomes one-sided.
    /// `cell_size` is the horizontal world distance between adjacent cells.
    pub fn normal_at(&self, x: usize, y: usize, cell_size: f32) -> Vec3 {
        let left = x.saturating_sub(1);
        let right = (x + 1).min(self.width - 1);
        let up = y.saturating_sub(1);
        let down = (y + 1).min(self.height - 1);

        let tangent_x = Vec3::new(
            (right - left) as f32 * cell_size,
            self.get(right, y) - self.get(left, y),
            0.0,
        );
        let tangent_z = Vec3::new(
            0.0,
            self.get(x, down) - self.get(x, up),
            (down - up) as f32 * cell_size,
        );
        tangent_z.cross(tangent_x).try_normalize().unwrap_or(Vec3::Y)
    }

    /// Returns (min, max) over all cells.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Row-major height data.
    pub fn as_slice(&self) -> &[f32] {
        &self.heights
    }

    /// Mutable row-major height data. Callers must keep every value finite.
    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// Iterates all `(x, y)` cell coordinates in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::InvalidDimensions(width, height));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_3x3() -> HeightGrid {
        HeightGrid::from_vec(3, 3, (0..9).map(|v| v as f32).collect()).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = HeightGrid::new(16, 8).unwrap();
        assert_eq!(grid.width(), 16);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.cell_count(), 128);
        assert!(grid.as_slice().iter().all(|&h| h == 0.0));
        assert!(!grid.is_square());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(HeightGrid::new(0, 4), Err(TerrainError::InvalidDimensions(0, 4)));
        assert_eq!(HeightGrid::new(4, 0), Err(TerrainError::InvalidDimensions(4, 0)));
    }

    #[test]
    fn test_from_vec_validation() {
        assert!(matches!(
            HeightGrid::from_vec(2, 2, vec![0.0; 3]),
            Err(TerrainError::LengthMismatch { got: 3, .. })
        ));
        assert!(matches!(
            HeightGrid::from_vec(2, 2, vec![0.0, 1.0, f32::NAN, 0.0]),
            Err(TerrainError::NonFiniteHeight { x: 0, y: 1, .. })
        ));
    }

    #[test]
    fn test_literal_lerp_scenario() {
        let grid = ramp_3x3();
        assert_eq!(grid.get_height(1, 1), 4.0);
        assert_eq!(grid.get_height_lerp(1.0, 1.0), 4.0);
        assert_eq!(grid.get_height_lerp(0.5, 0.5), 2.0);
    }

    #[test]
    fn test_lerp_matches_exact_at_integers() {
        let grid = HeightGrid::from_fn(7, 5, |x, y| ((x * 13 + y * 7) % 11) as f32 * 0.37).unwrap();
        for (x, y) in grid.cells() {
            assert_eq!(
                grid.get_height_lerp(x as f32, y as f32),
                grid.get_height(x as isize, y as isize),
                "lerp differs from exact height at ({}, {})",
                x,
                y
            );
        }
    }

    #[test]
    fn test_out_of_range_wraps() {
        let grid = ramp_3x3();
        assert_eq!(grid.get_height(-1, 0), grid.get_height(2, 0));
        assert_eq!(grid.get_height(3, 1), grid.get_height(0, 1));
        assert_eq!(grid.get_height(1, -1), grid.get_height(1, 2));
        assert!(!grid.is_in_bounds(-1, 0));
        assert!(!grid.is_in_bounds(0, 3));
        assert!(grid.is_in_bounds(2, 2));
    }

    #[test]
    fn test_set_and_add_height() {
        let mut grid = HeightGrid::new(4, 4).unwrap();
        grid.set_height_at(2, 3, 1.5).unwrap();
        grid.add_height_at(2, 3, 0.25).unwrap();
        assert_eq!(grid.get(2, 3), 1.75);

        assert!(grid.set_height_at(0, 0, f32::INFINITY).is_err());
        assert!(grid.add_height_at(2, 3, f32::NAN).is_err());
        assert_eq!(grid.get(2, 3), 1.75, "failed edit must not change the cell");

        assert!(matches!(
            grid.set_height_at(4, 0, 1.0),
            Err(TerrainError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(grid.add_height_at(0, 9, 1.0).is_err());
    }

    #[test]
    fn test_gradient_on_plane() {
        // h = 2x + 3y
        let grid = HeightGrid::from_fn(8, 8, |x, y| 2.0 * x as f32 + 3.0 * y as f32).unwrap();
        let (h, g) = grid.height_and_gradient(2.25, 3.5);
        assert!((h - (2.0 * 2.25 + 3.0 * 3.5)).abs() < 1e-5);
        assert!((g.x - 2.0).abs() < 1e-5);
        assert!((g.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_flat_normal_points_up() {
        let grid = HeightGrid::from_fn(6, 6, |_, _| 3.0).unwrap();
        let n = grid.normal_at(2, 2, 1.0);
        assert!((n - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_sloped_normal_leans_downhill() {
        // Heights rise along +x, so the normal tilts towards -x.
        let grid = HeightGrid::from_fn(6, 6, |x, _| x as f32).unwrap();
        let n = grid.normal_at(2, 2, 1.0);
        assert!(n.x < 0.0 && n.y > 0.0);
        assert!(n.z.abs() < 1e-6);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_border_normal_is_one_sided() {
        // A uniform slope has the same normal everywhere, borders included.
        let grid = HeightGrid::from_fn(6, 5, |x, y| x as f32 * 0.5 + y as f32 * 0.25).unwrap();
        let inner = grid.normal_at(2, 2, 1.0);
        for (x, y) in [(0, 0), (5, 2), (3, 4), (5, 4)] {
            let n = grid.normal_at(x, y, 1.0);
            assert!((n - inner).length() < 1e-6, "normal at ({}, {}) is {:?}, expected {:?}", x, y, n, inner);
        }
    }

    #[test]
    fn test_single_cell_normal_points_up() {
        let grid = HeightGrid::from_vec(1, 1, vec![7.0]).unwrap();
        assert_eq!(grid.normal_at(0, 0, 1.0), Vec3::Y);
    }

    #[test]
    fn test_height_range_and_clone_is_deep() {
        let grid = ramp_3x3();
        assert_eq!(grid.height_range(), (0.0, 8.0));

        let mut copy = grid.clone();
        copy.set_height_at(0, 0, 42.0).unwrap();
        assert_eq!(grid.get(0, 0), 0.0);
        assert_eq!(copy.get(0, 0), 42.0);
    }

    #[test]
    fn test_cells_iterator() {
        let grid = HeightGrid::new(3, 2).unwrap();
        let coords: Vec<_> = grid.cells().collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[1], (1, 0));
        assert_eq!(coords[3], (0, 1));
        assert_eq!(coords[5], (2, 1));
    }
}
