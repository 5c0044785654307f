pub mod bitmask_flags;
pub mod constants;
pub mod contour;
pub mod error;
pub mod hull;
pub mod layers;
pub mod mesh;
pub mod rapier;
pub mod sph;
pub mod tags;
pub mod types;
pub mod utils;
pub mod walls;

// Re-export Rapier so the sim crate uses the exact same version without depending on it directly.
pub use rapier3d;

pub use constants::{
    BOTTOM_FACE_TOLERANCE, DEFAULT_BREAK_THRESHOLD, DEFAULT_WALL_HEIGHT, DEFAULT_WALL_THICKNESS,
    DROWN_DAMAGE, DROWN_DEPTH, GRAVITY_MPS2, PLAYER_MAX_HEALTH, SEA_LAYER_HALF_HEIGHT,
    SETTLED_WATER_MASK, TICK_DT,
};
pub use contour::{ContourEdge, extract_bottom_contour};
pub use error::GeometryError;
pub use hull::{ConvexShape, build_convex_hull};
pub use layers::{CollisionFilter, CollisionLayer};
pub use mesh::{MeshData, MeshSoup, merge_soups};
pub use rapier::{BodyDef, BodyKind, ColliderShapeDef};
pub use sph::{SphParams, sph_accelerations};
pub use tags::BodyTag;
pub use types::{Damping, Iso, Point3, Quat, SurfaceMaterial, Transform, Vec3};
pub use utils::{planar_distance_sq, signed_yaw_from_x, to_planar, unit_clamp, yaw_from_xz};
pub use walls::{WallPlacement, apply_exclusions, wall_placements};
