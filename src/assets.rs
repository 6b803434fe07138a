//! Boundary types for externally loaded models
//!
//! Fetching and parsing model files happens outside the simulation. The
//! loader hands back a [`MeshData`]; the renderer turns it into a
//! [`ModelHandle`]; the game only keeps the handle and the bounding box.
//! Until every required model is present the game skips drawing and the
//! in-match update, which is how a load that never resolves is tolerated.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::BoundingBox;
use crate::scene::ModelHandle;
use crate::sim::Player;

/// Parsed mesh as delivered by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
}

impl MeshData {
    /// Build from raw attributes; bounds are taken over all positions
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        texcoords: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        let bounds = BoundingBox::from_points(positions.iter().copied().map(Vec3::from_array))
            .unwrap_or(BoundingBox::new(Vec3::ZERO, Vec3::ZERO));
        Self {
            positions,
            normals,
            texcoords,
            indices,
            bounds,
        }
    }

    /// Axis-aligned cube centred on the origin (8 corners, 12 triangles)
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        let positions = vec![
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
        ];
        let normals = positions
            .iter()
            .map(|p| Vec3::from_array(*p).normalize_or_zero().to_array())
            .collect();
        let texcoords = positions.iter().map(|p| [p[0], p[2]]).collect();
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(positions, normals, texcoords, indices)
    }
}

/// Which model a finished load belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelSlot {
    Ship(Player),
    Checkpoint,
    Skybox,
    Laser,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 5] = [
        ModelSlot::Ship(Player::First),
        ModelSlot::Ship(Player::Second),
        ModelSlot::Checkpoint,
        ModelSlot::Skybox,
        ModelSlot::Laser,
    ];

    /// Where the loader should fetch this model from
    pub fn uri(&self) -> &'static str {
        match self {
            ModelSlot::Ship(Player::First) => "models/spaceship1.obj",
            ModelSlot::Ship(Player::Second) => "models/spaceship2.obj",
            ModelSlot::Checkpoint => "models/checkpoint.obj",
            ModelSlot::Skybox => "models/skybox.obj",
            ModelSlot::Laser => "models/laser.obj",
        }
    }

    /// The match cannot run without this model
    pub fn is_required(&self) -> bool {
        !matches!(self, ModelSlot::Laser)
    }
}

/// A model the renderer has accepted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    pub handle: ModelHandle,
    pub bounds: BoundingBox,
}

impl LoadedModel {
    pub fn new(handle: ModelHandle, mesh: &MeshData) -> Self {
        Self {
            handle,
            bounds: mesh.bounds,
        }
    }
}

/// Models received so far
#[derive(Debug, Clone, Default)]
pub struct LoadedModels {
    ships: [Option<LoadedModel>; 2],
    checkpoint: Option<LoadedModel>,
    skybox: Option<LoadedModel>,
    laser: Option<LoadedModel>,
}

impl LoadedModels {
    pub fn get(&self, slot: ModelSlot) -> Option<&LoadedModel> {
        match slot {
            ModelSlot::Ship(player) => self.ships[player.index()].as_ref(),
            ModelSlot::Checkpoint => self.checkpoint.as_ref(),
            ModelSlot::Skybox => self.skybox.as_ref(),
            ModelSlot::Laser => self.laser.as_ref(),
        }
    }

    pub fn set(&mut self, slot: ModelSlot, model: LoadedModel) {
        let entry = match slot {
            ModelSlot::Ship(player) => &mut self.ships[player.index()],
            ModelSlot::Checkpoint => &mut self.checkpoint,
            ModelSlot::Skybox => &mut self.skybox,
            ModelSlot::Laser => &mut self.laser,
        };
        *entry = Some(model);
    }

    /// Every required slot has resolved
    pub fn required_loaded(&self) -> bool {
        ModelSlot::ALL
            .iter()
            .filter(|slot| slot.is_required())
            .all(|slot| self.get(*slot).is_some())
    }

    pub fn missing(&self) -> Vec<ModelSlot> {
        ModelSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }
}
