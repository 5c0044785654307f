use crate::{
    constants::YAW_EPS,
    types::{Point3, Vec3},
};
use nalgebra::Vector2;

/// XZ components of a world vector.
#[inline]
pub fn to_planar(v: &Vec3) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

/// Facing yaw for a planar heading, `None` when the heading is too short to trust.
///
/// Zero yaw faces -Z; the body faces back along its heading.
pub fn yaw_from_xz(xz: Vector2<f32>) -> Option<f32> {
    if xz.norm_squared() > YAW_EPS {
        return Some((-xz[0]).atan2(-xz[1]));
    }

    None
}

/// Signed angle (radians) from +X to `dir` around +Y, using only the XZ components.
///
/// The magnitude is the unsigned angle between +X and the planar direction; the sign is the sign
/// of `cross(+X, dir).y`, negative when that is zero. Rotating +X by this yaw about +Y yields
/// the planar direction.
pub fn signed_yaw_from_x(dir: Vec3) -> f32 {
    let planar = Vec3::new(dir.x, 0.0, dir.z);
    let len = planar.norm();
    if len <= f32::EPSILON {
        return 0.0;
    }

    let angle = (planar.x / len).clamp(-1.0, 1.0).acos();
    let cross_y = Vec3::x().cross(&planar).y;
    if cross_y > 0.0 { angle } else { -angle }
}

/// Planar (XZ) distance squared between two world positions (meters^2).
pub fn planar_distance_sq(a: &Point3, b: &Point3) -> f32 {
    let x = b.x - a.x;
    let z = b.z - a.z;
    x * x + z * z
}

/// `t` clamped into `[0, 1]`; NaN maps to 0.
#[inline]
pub fn unit_clamp(t: f32) -> f32 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}
