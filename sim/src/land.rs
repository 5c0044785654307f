//! Land tile: static terrain pieces, boundary walls and the rising sea.
//!
//! Asset convention: every child of the asset root is one terrain piece and gets its own convex
//! collider. Child 0 also defines the tile outline: its flat bottom drives the boundary walls
//! and its footprint sizes the sea-level riser.
//!
//! The riser is two kinematic slabs moving up together over the round:
//! - the surface slab, which only touches water particles and kicks them about;
//! - the killer slab, `DROWN_DEPTH` below, which only touches the player and drowns them.

use rand::Rng;
use shared::{
    BodyDef, BodyKind, BodyTag, ColliderShapeDef, CollisionFilter, CollisionLayer, ConvexShape,
    DROWN_DAMAGE, DROWN_DEPTH, SEA_LAYER_HALF_HEIGHT, SETTLED_WATER_MASK, Transform, Vec3,
    merge_soups,
};

use crate::{
    asset::{AssetHandle, AssetState, SceneNode},
    config::{LandConfig, RiserConfig},
    error::SimError,
    physics::{BodyId, ContactEvent, PhysicsContext},
    scene::{GameEvent, TickContext},
    visual::VisualId,
    wall::{WallCollider, spawn_walls},
};

/// Upward kick given to a drowning player so the contact starts again while they stay down.
const DROWN_LIFT: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeaLevelRiser {
    surface: BodyId,
    killer: BodyId,
    start: f32,
    end: f32,
    level: f32,
}

impl SeaLevelRiser {
    /// Two slabs of `footprint` (x, z full size) centred on `center` at the start level.
    pub fn spawn(config: &RiserConfig, center: Vec3, footprint: (f32, f32), physics: &mut PhysicsContext) -> Self {
        let half_extents = Vec3::new(footprint.0 * 0.5, SEA_LAYER_HALF_HEIGHT, footprint.1 * 0.5);
        let slab = |y: f32, target: CollisionLayer| {
            BodyDef::new(
                BodyKind::KinematicPosition,
                Transform::from_translation(Vec3::new(center.x, y, center.z)),
                ColliderShapeDef::Cuboid { half_extents },
            )
            .with_material(config.material)
            .with_filter(CollisionFilter::layer_against(CollisionLayer::SeaLevel, &[target]))
            .with_collision_events()
        };

        let surface = physics.create_body(slab(config.start, CollisionLayer::WaterParticle), BodyTag::SeaLevel);
        let killer = physics.create_body(
            slab(config.start - DROWN_DEPTH, CollisionLayer::Player),
            BodyTag::SeaLevel,
        );

        Self {
            surface,
            killer,
            start: config.start,
            end: config.end,
            level: config.start,
        }
    }

    /// Sea level after `progress` (0..=1) of the round.
    pub fn level_at(&self, progress: f32) -> f32 {
        self.start + (self.end - self.start) * shared::unit_clamp(progress)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Water depth above the starting level.
    pub fn flood_height(&self) -> f32 {
        self.level - self.start
    }

    pub fn surface(&self) -> BodyId {
        self.surface
    }

    pub fn killer(&self) -> BodyId {
        self.killer
    }

    pub fn owns(&self, body: BodyId) -> bool {
        body == self.surface || body == self.killer
    }

    pub fn rise_to(&mut self, progress: f32, physics: &mut PhysicsContext) {
        self.level = self.level_at(progress);
        for (body, y) in [(self.surface, self.level), (self.killer, self.level - DROWN_DEPTH)] {
            if let Some(mut at) = physics.translation(body) {
                at.y = y;
                physics.set_kinematic_translation(body, at);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandState {
    Loading,
    Loaded,
}

#[derive(Debug)]
pub struct Land {
    config: LandConfig,
    asset: AssetHandle<SceneNode>,
    state: LandState,
    pieces: Vec<BodyId>,
    walls: Vec<WallCollider>,
    riser: Option<SeaLevelRiser>,
    visual: Option<VisualId>,
    stalled: bool,
}

impl Land {
    pub fn new(config: LandConfig, asset: AssetHandle<SceneNode>) -> Self {
        Self {
            config,
            asset,
            state: LandState::Loading,
            pieces: Vec::new(),
            walls: Vec::new(),
            riser: None,
            visual: None,
            stalled: false,
        }
    }

    pub fn state(&self) -> LandState {
        self.state
    }

    pub fn pieces(&self) -> &[BodyId] {
        &self.pieces
    }

    pub fn walls(&self) -> &[WallCollider] {
        &self.walls
    }

    pub fn walls_mut(&mut self) -> &mut [WallCollider] {
        &mut self.walls
    }

    pub fn riser(&self) -> Option<&SeaLevelRiser> {
        self.riser.as_ref()
    }

    pub fn flood_height(&self) -> f32 {
        self.riser.map_or(0.0, |r| r.flood_height())
    }

    pub fn owns(&self, body: BodyId) -> bool {
        self.riser.is_some_and(|r| r.owns(body))
            || self.pieces.contains(&body)
            || self.walls.iter().any(|w| w.body() == body)
    }

    fn position(&self) -> Vec3 {
        Vec3::from(self.config.position)
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        match self.state {
            LandState::Loading => {
                if self.stalled {
                    return;
                }
                match self.asset.poll() {
                    AssetState::Pending => {}
                    AssetState::Failed(reason) => {
                        log::warn!("land: asset `{}` failed to load ({reason})", self.asset.key());
                        self.stalled = true;
                    }
                    AssetState::Ready(root) => {
                        if let Err(err) = self.build(&root, ctx) {
                            log::error!("land: load failed: {err}");
                            self.stalled = true;
                        }
                    }
                }
            }
            LandState::Loaded => {
                let progress = ctx.timer.progress();
                if let Some(riser) = self.riser.as_mut() {
                    riser.rise_to(progress, ctx.physics);
                }
            }
        }
    }

    fn build(&mut self, root: &SceneNode, ctx: &mut TickContext<'_>) -> Result<(), SimError> {
        let empty = || SimError::EmptyAsset {
            key: self.asset.key().to_string(),
        };
        let outline_node = root.children.first().ok_or_else(empty)?;
        let outline_soups = outline_node.collect_soups()?;
        if outline_soups.is_empty() {
            return Err(empty());
        }
        // Tile-local frame: the outline child's own transform applied.
        let outline = merge_soups(&outline_soups).transformed(&outline_node.transform);
        let footprint = outline.extents().ok_or_else(empty)?;

        let origin = Transform::from_translation(self.position());
        for (index, child) in root.children.iter().enumerate() {
            let hull = match child
                .collect_soups()
                .and_then(|soups| ConvexShape::from_soup(&merge_soups(&soups)))
            {
                Ok(hull) => hull,
                Err(err) => {
                    log::error!("land: skipping piece {index} ({}): {err}", child.name);
                    continue;
                }
            };
            let def = BodyDef::new(
                BodyKind::Fixed,
                origin.then(&child.transform),
                ColliderShapeDef::Convex(hull),
            )
            .with_material(self.config.material)
            .with_locked_rotations(true)
            .with_filter(self.config.filter);
            self.pieces.push(ctx.physics.create_body(def, BodyTag::Land));
        }

        self.walls = spawn_walls(
            &outline,
            self.config.wall_height,
            self.config.wall_thickness,
            self.position(),
            &self.config.excluded_walls,
            ctx.physics,
        );
        self.riser = Some(SeaLevelRiser::spawn(
            &self.config.riser,
            self.position(),
            (footprint.x, footprint.z),
            ctx.physics,
        ));

        let visual = ctx.visuals.attach(root, Some(ctx.root));
        ctx.visuals.set_transform(visual, origin);
        self.visual = Some(visual);

        self.state = LandState::Loaded;
        log::info!(
            "land: loaded {} pieces, {} walls",
            self.pieces.len(),
            self.walls.len()
        );
        Ok(())
    }

    /// React to something touching the sea.
    pub fn handle_contact(&mut self, contact: &ContactEvent, ctx: &mut TickContext<'_>) {
        let Some(riser) = self.riser else {
            return;
        };
        let Some(other) = [riser.surface, riser.killer]
            .into_iter()
            .find_map(|sea| contact.other(sea))
        else {
            return;
        };

        match ctx.physics.registry().lookup(other) {
            Some(BodyTag::Player) => {
                log::info!("land: player {other} drowned");
                ctx.events.push(GameEvent::PlayerDrowned {
                    damage: DROWN_DAMAGE,
                });
                let push = Vec3::new(
                    ctx.rng.random_range(0..=100) as f32,
                    DROWN_LIFT,
                    ctx.rng.random_range(0..=100) as f32,
                );
                ctx.physics.add_force(other, push);
            }
            Some(BodyTag::WaterParticle) => {
                let push = Vec3::new(
                    ctx.rng.random_range(0..=100) as f32,
                    ctx.rng.random_range(150..=250) as f32,
                    ctx.rng.random_range(0..=100) as f32,
                );
                ctx.physics.add_force(other, push);
                if let Some(filter) = ctx.physics.collision_filter(other) {
                    if filter.mask_is_all() {
                        ctx.physics
                            .set_collision_filter(other, filter.with_mask(SETTLED_WATER_MASK));
                    }
                }
            }
            _ => {}
        }
    }
}
