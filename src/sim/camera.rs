//! Cameras and split-screen layout

use glam::{Mat4, Quat, Vec3};

use super::body::KinematicBody;
use super::state::GamePhase;
use crate::consts::*;
use crate::remap;
use crate::scene::{NodeId, SceneGraph};

/// Camera trailing one ship
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    pub node: NodeId,
    /// Smoothed orientation carried between ticks
    pub rotation: Quat,
    pub translation: Vec3,
    /// Drawn without colour while the ship can't be flown
    pub grayscale: bool,
}

impl ChaseCamera {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
            grayscale: false,
        }
    }

    /// Distance behind the ship, growing linearly from min to max speed
    pub fn follow_distance(ship: &KinematicBody) -> f32 {
        let t = &ship.tuning;
        remap(
            ship.speed,
            t.min_speed,
            t.max_speed,
            CAMERA_MIN_DISTANCE,
            CAMERA_MAX_DISTANCE,
        )
    }

    /// Move behind `ship`, easing toward its orientation
    pub fn update(&mut self, ship: &KinematicBody, graph: &mut SceneGraph) {
        let rotation = ship.rotation.lerp(self.rotation, CAMERA_ROTATION_LERP);
        let transform = Mat4::from_translation(ship.translation)
            * Mat4::from_quat(rotation)
            * Mat4::from_rotation_y(std::f32::consts::PI)
            * Mat4::from_translation(Vec3::new(
                0.0,
                CAMERA_UP_OFFSET,
                Self::follow_distance(ship),
            ));
        graph.set_transform(self.node, transform);
        self.rotation = rotation;
        self.translation = ship.translation;
    }

    /// World-to-view matrix
    pub fn view(&self, graph: &SceneGraph) -> Mat4 {
        graph.global_transform(self.node).inverse()
    }
}

/// Camera circling the terrain before and after a match
#[derive(Debug, Clone)]
pub struct IntroCamera {
    pub node: NodeId,
}

impl IntroCamera {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    /// Orbit pose at `clock_ms`, hovering above `centre_height`
    pub fn transform_at(clock_ms: f64, centre_height: f32) -> Mat4 {
        let yaw = (clock_ms / INTRO_CAMERA_YAW_PERIOD_MS % std::f64::consts::TAU) as f32;
        Mat4::from_translation(Vec3::new(0.0, centre_height + INTRO_CAMERA_HEIGHT, 0.0))
            * Mat4::from_rotation_y(yaw)
            * Mat4::from_rotation_x(INTRO_CAMERA_PITCH)
    }

    pub fn update(&self, clock_ms: f64, centre_height: f32, graph: &mut SceneGraph) {
        graph.set_transform(self.node, Self::transform_at(clock_ms, centre_height));
    }

    pub fn view(&self, graph: &SceneGraph) -> Mat4 {
        graph.global_transform(self.node).inverse()
    }
}

/// Screen rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn projection(&self) -> Mat4 {
        projection(self.aspect())
    }
}

/// Perspective projection shared by every camera
pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(CAMERA_FOV_Y, aspect, CAMERA_NEAR, CAMERA_FAR)
}

/// Viewports to render for `phase`: one per player while racing, a single
/// full-screen view otherwise
pub fn viewports(phase: GamePhase, width: u32, height: u32) -> Vec<Viewport> {
    match phase {
        GamePhase::Countdown | GamePhase::Playing => {
            let half = width / 2;
            vec![
                Viewport {
                    x: 0,
                    y: 0,
                    width: half,
                    height,
                },
                Viewport {
                    x: half,
                    y: 0,
                    width: width - half,
                    height,
                },
            ]
        }
        GamePhase::Intro | GamePhase::GameOver => vec![Viewport {
            x: 0,
            y: 0,
            width,
            height,
        }],
    }
}
