//! Small linear algebra helpers on top of glam
//!
//! Everything here is pure: no shared scratch buffers, every function
//! returns a fresh value.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Canonical body axes. Ships fly along +Z.
pub const FORWARD: Vec3 = Vec3::Z;
pub const RIGHT: Vec3 = Vec3::X;
pub const UP: Vec3 = Vec3::Y;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest box containing every point, or `None` for an empty set
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    /// Model-space box scaled per axis then moved to `translation`
    pub fn scaled_translated(&self, scale: Vec3, translation: Vec3) -> Self {
        Self::new(self.min * scale + translation, self.max * scale + translation)
    }

    /// Closed-interval overlap on all three axes (touching counts)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// translation * rotX * rotY * rotZ * scale
pub fn trs_matrix(translation: Vec3, euler_xyz: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_rotation_x(euler_xyz.x)
        * Mat4::from_rotation_y(euler_xyz.y)
        * Mat4::from_rotation_z(euler_xyz.z)
        * Mat4::from_scale(scale)
}

/// Rotation about a (not necessarily normalized) axis.
///
/// A zero-length axis yields the identity rotation.
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle),
        None => Quat::IDENTITY,
    }
}

#[inline]
pub fn is_finite_vec3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
