use rapier3d::prelude::*;

use crate::{
    hull::ConvexShape,
    layers::CollisionFilter,
    types::{Damping, SurfaceMaterial, Transform, Vec3},
};

/// How a body moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves.
    Fixed,
    /// Driven by forces and contacts.
    Dynamic,
    /// Moved by setting its next position each tick.
    KinematicPosition,
}

/// Collider shapes used by the game.
#[derive(Debug)]
pub enum ColliderShapeDef {
    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Ball { radius: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Convex polyhedron; the hull is consumed when the collider is built.
    Convex(ConvexShape),
}

impl ColliderShapeDef {
    fn into_shared_shape(self) -> SharedShape {
        match self {
            ColliderShapeDef::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderShapeDef::Ball { radius } => SharedShape::ball(radius),
            ColliderShapeDef::CylinderY {
                radius,
                half_height,
            } => SharedShape::cylinder(half_height, radius),
            ColliderShapeDef::Convex(hull) => hull.into_shared_shape(),
        }
    }
}

/// Everything needed to create one rigid body with a single attached collider.
///
/// Conventions
/// - Units are meters and kilograms.
/// - `mass` is the collider mass. `None` leaves Rapier's default density in charge.
/// - The collider sits at the body origin; `pose` places the body.
#[derive(Debug)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub pose: Transform,
    pub shape: ColliderShapeDef,
    pub mass: Option<f32>,
    pub material: SurfaceMaterial,
    pub damping: Damping,
    pub lock_rotations: bool,
    pub filter: CollisionFilter,
    /// Report collision start/stop events for this collider.
    pub collision_events: bool,
}

impl BodyDef {
    pub fn new(kind: BodyKind, pose: Transform, shape: ColliderShapeDef) -> Self {
        Self {
            kind,
            pose,
            shape,
            mass: None,
            material: SurfaceMaterial::default(),
            damping: Damping::default(),
            lock_rotations: false,
            filter: CollisionFilter::all(),
            collision_events: false,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_material(mut self, material: SurfaceMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_damping(mut self, damping: Damping) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_locked_rotations(mut self, lock: bool) -> Self {
        self.lock_rotations = lock;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_collision_events(mut self) -> Self {
        self.collision_events = true;
        self
    }

    /// Split into Rapier builders. `user_data` is stored on both the body and the collider.
    pub fn into_rapier(self, user_data: u128) -> (RigidBody, Collider) {
        let builder = match self.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::KinematicPosition => RigidBodyBuilder::kinematic_position_based(),
        };
        let mut builder = builder
            .pose(self.pose.iso())
            .linear_damping(self.damping.linear)
            .angular_damping(self.damping.angular)
            .user_data(user_data);
        if self.lock_rotations {
            builder = builder.lock_rotations();
        }

        let mut collider = ColliderBuilder::new(self.shape.into_shared_shape())
            .friction(self.material.friction)
            .restitution(self.material.restitution)
            .collision_groups(self.filter.interaction_groups())
            .user_data(user_data);
        if let Some(mass) = self.mass.filter(|m| *m > 0.0) {
            collider = collider.mass(mass);
        }
        if self.collision_events {
            collider = collider.active_events(ActiveEvents::COLLISION_EVENTS);
        }

        (builder.build(), collider.build())
    }
}
