/*!
Core math aliases and the plain data types exchanged between the geometry
modules and the simulation crate.

This module intentionally contains no algorithms.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[inline]
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Convert to nalgebra `Isometry3` for use with Rapier.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    /// Apply this transform to a point.
    #[inline]
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.rotation * p + self.translation
    }

    /// `self` followed by `child` (child expressed in self's frame).
    #[inline]
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * child.translation,
            rotation: self.rotation * child.rotation,
        }
    }
}

/// Friction/restitution pair applied to a collider.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

/// Linear/angular damping pair applied to a rigid body.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}
