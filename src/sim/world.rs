//! The terrain as seen by gameplay: height queries and placement helpers

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use super::state::SetupError;
use crate::scene::{NodeId, SceneGraph};
use crate::settings::TerrainSettings;
use crate::terrain::{HeightField, TerrainMesh};

/// Terrain scaled into world space.
///
/// The unit grid spans `size` units per axis centred on the origin; the
/// world node scales it by `scale`. Height queries re-evaluate the noise
/// instead of reading the mesh back.
#[derive(Debug, Clone)]
pub struct World {
    pub node: NodeId,
    height_field: HeightField,
    mesh: TerrainMesh,
    size: u32,
    scale: Vec3,
}

impl World {
    /// Generate the terrain and hang its node under the scene root
    pub fn new<R: Rng>(
        settings: &TerrainSettings,
        rng: &mut R,
        graph: &mut SceneGraph,
    ) -> Result<Self, SetupError> {
        let height_field = HeightField::new(&settings.octaves, rng)?;
        let mesh = TerrainMesh::build(settings.size, settings.size, &height_field)?;
        let scale = Vec3::from_array(settings.scale);

        let node = graph.create_node("world");
        if let Some(world_node) = graph.get_mut(node) {
            world_node.scale = scale;
            world_node.recalculate_transform();
        }
        graph.add_child(graph.root(), node)?;

        log::info!(
            "Generated {}x{} terrain with {} octaves",
            settings.size,
            settings.size,
            height_field.octave_count()
        );

        Ok(Self {
            node,
            height_field,
            mesh,
            size: settings.size,
            scale,
        })
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn height_field(&self) -> &HeightField {
        &self.height_field
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// World-space width (x) and depth (z) of the terrain
    pub fn extent(&self) -> (f32, f32) {
        (
            self.size as f32 * self.scale.x,
            self.size as f32 * self.scale.z,
        )
    }

    /// World height at normalized terrain coordinates.
    ///
    /// Returns `f32::INFINITY` outside `[0, 1]²` (including NaN input): there
    /// is no ground there. Callers must check before doing arithmetic with it.
    pub fn height_at_coordinates(&self, u: f32, v: f32) -> f32 {
        if (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v) {
            self.height_field.height_at(u, v) * self.scale.y
        } else {
            f32::INFINITY
        }
    }

    /// World height below world-space (x, z); `f32::INFINITY` off the terrain
    pub fn height_at_world_coordinates(&self, x: f32, z: f32) -> f32 {
        let (u, v) = self.world_to_coordinates(x, z);
        self.height_at_coordinates(u, v)
    }

    pub fn world_to_coordinates(&self, x: f32, z: f32) -> (f32, f32) {
        let (width, depth) = self.extent();
        (0.5 + x / width, 0.5 + z / depth)
    }

    pub fn coordinates_to_world(&self, u: f32, v: f32) -> (f32, f32) {
        let (width, depth) = self.extent();
        ((u - 0.5) * width, (v - 0.5) * depth)
    }

    /// Whether (x, z) lies over the terrain footprint
    pub fn point_lies_inside(&self, x: f32, z: f32) -> bool {
        let (width, depth) = self.extent();
        x.abs() <= width / 2.0 && z.abs() <= depth / 2.0
    }

    /// Random point within `radius_factor` of the centre, `offset` above the ground
    pub fn random_position_above<R: Rng>(&self, rng: &mut R, offset: f32, radius_factor: f32) -> Vec3 {
        let u: f32 = rng.random();
        let v: f32 = rng.random();
        let (width, depth) = self.extent();
        let x = (u - 0.5) * width * radius_factor;
        let z = (v - 0.5) * depth * radius_factor;
        let ground = self.height_at_world_coordinates(x, z);
        // radius_factor <= 1 keeps the point on the terrain; fall back to the centre otherwise
        let ground = if ground.is_finite() {
            ground
        } else {
            self.height_at_coordinates(0.5, 0.5)
        };
        Vec3::new(x, ground + offset, z)
    }

    /// Anchor of checkpoint `index` of `count`, evenly spaced on a ring
    pub fn checkpoint_anchor(
        &self,
        index: usize,
        count: usize,
        radius_factor: f32,
        above_ground: f32,
    ) -> Vec3 {
        let angle = index as f32 / count.max(1) as f32 * TAU;
        let (cx, cz) = (angle.cos(), angle.sin());
        let ground = self.height_at_coordinates(
            cx * radius_factor / 2.0 + 0.5,
            cz * radius_factor / 2.0 + 0.5,
        );
        let (width, depth) = self.extent();
        Vec3::new(
            cx * width * radius_factor * 0.5,
            ground + above_ground * self.scale.y,
            cz * depth * radius_factor * 0.5,
        )
    }
}
