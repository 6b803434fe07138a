//! Checkpoints: floating markers that belong to whoever touched them last

use glam::{Mat4, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

use super::state::Player;
use crate::math::BoundingBox;
use crate::scene::{NodeId, SceneGraph};
use crate::settings::CheckpointSettings;

#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub node: NodeId,
    /// Fixed anchor the bob oscillates above
    pub position: Vec3,
    /// Animated position (anchor + bob), refreshed every update
    pub translation: Vec3,
    /// Current spin about the vertical axis
    pub spin: f32,
    pub scale: Vec3,
    /// Last ship to overlap this checkpoint
    pub claimed_by: Option<Player>,
    /// Random phase in [0, 2π) so checkpoints don't bob in unison
    pub delay: f32,
    bob_amplitude: f32,
    bob_period_ms: f64,
    spin_period_ms: f64,
}

impl Checkpoint {
    pub fn new<R: Rng>(
        node: NodeId,
        position: Vec3,
        settings: &CheckpointSettings,
        rng: &mut R,
    ) -> Self {
        Self {
            node,
            position,
            translation: position,
            spin: 0.0,
            scale: Vec3::splat(settings.scale),
            claimed_by: None,
            delay: rng.random_range(0.0..TAU),
            bob_amplitude: settings.bob_amplitude,
            bob_period_ms: settings.bob_period_ms,
            spin_period_ms: settings.spin_period_ms,
        }
    }

    /// Pose at absolute time `clock_ms` (milliseconds since start).
    ///
    /// Phase comes from the clock rather than accumulated frame time, so
    /// the animation is identical at any frame rate.
    pub fn update(&mut self, clock_ms: f64, graph: &mut SceneGraph) {
        let delay = self.delay as f64;
        let bob = (1.0 + (clock_ms / self.bob_period_ms + delay).sin()) as f32 * self.bob_amplitude;
        self.translation = self.position + Vec3::new(0.0, bob, 0.0);
        self.spin = ((clock_ms / self.spin_period_ms + delay) % std::f64::consts::TAU) as f32;

        let transform = Mat4::from_translation(self.translation)
            * Mat4::from_rotation_y(self.spin)
            * Mat4::from_scale(self.scale);
        graph.set_transform(self.node, transform);
    }

    /// World-space box for a model-space box, or `None` while the model is loading
    pub fn bounding_box(&self, model_bounds: Option<&BoundingBox>) -> Option<BoundingBox> {
        model_bounds.map(|b| b.scaled_translated(self.scale, self.translation))
    }
}
