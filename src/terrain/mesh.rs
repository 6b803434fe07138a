//! Triangulated terrain grid with faceted normals

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::{HeightField, TerrainError};
use crate::math::BoundingBox;

/// Interleaved terrain vertex: position, normal, texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Floats per interleaved vertex
pub const FLOATS_PER_VERTEX: usize = 8;

impl TerrainVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Terrain geometry, built once and never modified.
///
/// Every triangle owns its three vertices so each face keeps its own flat
/// normal. The index buffer is therefore just `0..vertex_count`, grouped in
/// triangles.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    width: u32,
    height: u32,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    bounds: BoundingBox,
}

impl TerrainMesh {
    /// Sample `field` on a `(width + 1) × (height + 1)` grid centred on the origin
    pub fn build(width: u32, height: u32, field: &HeightField) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::ZeroResolution);
        }

        let row = width as usize + 1;
        let mut points = Vec::with_capacity(row * (height as usize + 1));
        for j in 0..=height {
            for i in 0..=width {
                let x = i as f32 - width as f32 / 2.0;
                let z = j as f32 - height as f32 / 2.0;
                let y = field.height_at(i as f32 / width as f32, j as f32 / height as f32);
                points.push(Vec3::new(x, y, z));
            }
        }

        let cells = width as usize * height as usize;
        let mut vertices = Vec::with_capacity(cells * 6);
        for j in 0..height as usize {
            for i in 0..width as usize {
                let p00 = i + j * row;
                let p01 = i + (j + 1) * row;
                let p10 = (i + 1) + j * row;
                let p11 = (i + 1) + (j + 1) * row;

                push_face(&mut vertices, &points, [p00, p01, p10]);
                push_face(&mut vertices, &points, [p10, p01, p11]);
            }
        }

        let indices = (0..vertices.len() as u32).collect();
        // Non-empty: width and height are at least 1
        let bounds = BoundingBox::from_points(points.iter().copied())
            .unwrap_or(BoundingBox::new(Vec3::ZERO, Vec3::ZERO));

        log::debug!(
            "Built terrain mesh {}x{}: {} vertices, y in [{:.1}, {:.1}]",
            width,
            height,
            vertices.len(),
            bounds.min.y,
            bounds.max.y
        );

        Ok(Self {
            width,
            height,
            vertices,
            indices,
            bounds,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Flat attribute buffer, `FLOATS_PER_VERTEX` floats per vertex
    pub fn vertex_data(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Model-space bounds of the sampled grid
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }
}

/// Append one triangle with a shared flat normal; uv is the vertex (x, z)
fn push_face(out: &mut Vec<TerrainVertex>, points: &[Vec3], triangle: [usize; 3]) {
    let [a, b, c] = triangle.map(|idx| points[idx]);
    let normal = (b - a).cross(c - a).normalize_or_zero();
    for p in [a, b, c] {
        out.push(TerrainVertex::new(p.to_array(), normal.to_array(), [p.x, p.z]));
    }
}
