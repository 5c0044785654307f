use shared::{
    BodyDef, BodyKind, BodyTag, ColliderShapeDef, CollisionFilter, CollisionLayer, MeshSoup,
    SurfaceMaterial, Transform, Vec3, WallPlacement, apply_exclusions, wall_placements,
};

use crate::physics::{BodyId, PhysicsContext};

const WALL_MATERIAL: SurfaceMaterial = SurfaceMaterial {
    friction: 1.0,
    restitution: 1.0,
};

/// One invisible boundary wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallCollider {
    placement: WallPlacement,
    body: BodyId,
    enabled: bool,
}

impl WallCollider {
    pub fn spawn(placement: WallPlacement, physics: &mut PhysicsContext) -> Self {
        let def = BodyDef::new(
            BodyKind::Fixed,
            Transform::new(placement.center.coords, placement.rotation),
            ColliderShapeDef::Cuboid {
                half_extents: placement.half_extents,
            },
        )
        .with_material(WALL_MATERIAL)
        .with_filter(CollisionFilter::layer(CollisionLayer::Wall));

        Self {
            placement,
            body: physics.create_body(def, BodyTag::Wall),
            enabled: true,
        }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn placement(&self) -> &WallPlacement {
        &self.placement
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self, physics: &mut PhysicsContext) {
        self.enabled = true;
        physics.set_collision_response(self.body, true);
    }

    pub fn disable(&mut self, physics: &mut PhysicsContext) {
        self.enabled = false;
        physics.set_collision_response(self.body, false);
    }
}

/// Walls along the bottom contour of `soup` (tile-local), minus `excluded`, placed at `offset`.
pub fn spawn_walls(
    soup: &MeshSoup,
    height: f32,
    thickness: f32,
    offset: Vec3,
    excluded: &[usize],
    physics: &mut PhysicsContext,
) -> Vec<WallCollider> {
    let mut placements = wall_placements(soup, height, thickness, offset);
    let total = placements.len();
    let ignored = apply_exclusions(&mut placements, excluded);
    if !ignored.is_empty() {
        log::warn!("ignoring wall exclusions {ignored:?}: tile has {total} walls");
    }

    placements
        .into_iter()
        .map(|placement| WallCollider::spawn(placement, physics))
        .collect()
}
