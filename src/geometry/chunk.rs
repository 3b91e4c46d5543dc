//! Chunk geometry: vertices, shared quad indices and bounding boxes.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::terrain::HeightGrid;

/// Position of a chunk in the chunk grid (not in cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkIndex {
    pub x: u32,
    pub y: u32,
}

impl ChunkIndex {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// First grid cell covered by this chunk.
    pub fn origin(&self, chunk_size: usize) -> (usize, usize) {
        (self.x as usize * chunk_size, self.y as usize * chunk_size)
    }
}

/// One terrain vertex, laid out for direct upload to a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// World position; grid `y` maps to world `z`, height to world `y`.
    pub position: Vec3,
    /// Chunk-local texture coordinate in `[0, 1]`.
    pub uv: Vec2,
    pub normal: Vec3,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point. An empty iterator yields an
    /// inverted box (`min > max`).
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(
            Self {
                min: Vec3::splat(f32::MAX),
                max: Vec3::splat(f32::MIN),
            },
            |aabb, p| Self {
                min: aabb.min.min(p),
                max: aabb.max.max(p),
            },
        )
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// A fixed-size tile of terrain geometry.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub grid_index: ChunkIndex,
    /// `(chunk_size + 1)²` vertices in row-major order.
    pub vertices: Vec<Vertex>,
    /// Triangle list shared by every chunk of the same size.
    pub indices: Arc<[u32]>,
    pub world_bounding_box: Aabb,
}

impl Chunk {
    /// Samples the grid for the chunk at `index`.
    ///
    /// Normals read one cell past the chunk edge, so border normals match
    /// those of the neighboring chunk. Sample coordinates are clamped to the
    /// grid: chunks on the far edge repeat the last row and column instead of
    /// reading past it, and normals there use one-sided differences.
    pub fn build(
        grid: &HeightGrid,
        index: ChunkIndex,
        chunk_size: usize,
        cell_size: f32,
        indices: Arc<[u32]>,
    ) -> Self {
        let (origin_x, origin_y) = index.origin(chunk_size);
        let side = chunk_size + 1;
        let max_x = grid.width() - 1;
        let max_y = grid.height() - 1;

        let mut vertices = Vec::with_capacity(side * side);
        for j in 0..side {
            let gy = (origin_y + j).min(max_y);
            for i in 0..side {
                let gx = (origin_x + i).min(max_x);
                vertices.push(Vertex {
                    position: Vec3::new(
                        (origin_x + i) as f32 * cell_size,
                        grid.get_height_lerp(gx as f32, gy as f32),
                        (origin_y + j) as f32 * cell_size,
                    ),
                    uv: Vec2::new(i as f32 / chunk_size as f32, j as f32 / chunk_size as f32),
                    normal: grid.normal_at(gx, gy, cell_size),
                });
            }
        }

        let world_bounding_box = Aabb::from_points(vertices.iter().map(|v| v.position));

        Self {
            grid_index: index,
            vertices,
            indices,
            world_bounding_box,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as raw bytes for a GPU buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices[..])
    }

    /// Index data as raw bytes for a GPU buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices[..])
    }
}

/// Builds the triangle list for a `chunk_size × chunk_size` quad grid.
///
/// Each quad emits two counter-clockwise triangles (normal towards +Y):
///
/// ```text
///   tl──tr
///   │╲  │     Triangle 1: tl, bl, tr
///   │ ╲ │     Triangle 2: tr, bl, br
///   bl──br
/// ```
pub fn quad_indices(chunk_size: usize) -> Arc<[u32]> {
    let side = chunk_size + 1;
    let mut indices = Vec::with_capacity(chunk_size * chunk_size * 6);
    for z in 0..chunk_size {
        for x in 0..chunk_size {
            let tl = (z * side + x) as u32;
            let tr = tl + 1;
            let bl = ((z + 1) * side + x) as u32;
            let br = bl + 1;
            indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
        }
    }
    indices.into()
}
