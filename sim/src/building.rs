//! Destructible buildings.
//!
//! # Lifecycle
//! `Loading -> Intact -> Fractured`, one way only.
//!
//! - `Loading`: waiting for the asset handle. A failed or never-resolving asset keeps the
//!   building here; nothing is created in the world.
//! - `Intact`: one body whose shape is the convex hull of the asset's first child. Every other
//!   child is remembered as a [`FragmentDescriptor`].
//! - `Fractured`: the intact body is gone and each descriptor became its own dynamic body.
//!
//! Exactly one of the intact body or the fragment bodies exists once loaded. A building with
//! nothing to break into (the box fallback, an asset with only the main piece, or fragments
//! whose hulls all fail) stays `Intact`.
//!
//! # Asset convention
//! The asset root's children are the pieces. Child 0 is the whole building; children 1.. are
//! the pre-cut fragments, each authored in place relative to the root.
//!
//! # Breaking
//! A contact on the intact body with impact force (closing speed along the normal times the
//! other body's mass) strictly above the profile threshold sets a latch. The next update tears
//! the intact body down and spawns the fragments, sized by volume:
//!
//! `mass_i = volume_i / ((main_volume + sum(volume)) / 2) * main_mass + additional_mass`

use shared::{
    BodyDef, BodyKind, BodyTag, ColliderShapeDef, CollisionFilter, ConvexShape, Damping, MeshSoup,
    SurfaceMaterial, Transform, Vec3, merge_soups,
};

use crate::{
    asset::{AssetHandle, AssetState, SceneNode},
    config::BuildingProfile,
    error::SimError,
    physics::{BodyId, ContactEvent},
    scene::TickContext,
    visual::VisualId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildingState {
    Loading,
    Intact,
    Fractured,
}

/// Everything needed to spawn one fragment later. Built once at load, consumed once at fracture.
#[derive(Debug)]
pub struct FragmentDescriptor {
    pub node: SceneNode,
    pub soups: Vec<MeshSoup>,
    pub placement: Transform,
    pub material: SurfaceMaterial,
    pub damping: Damping,
    pub lock_rotations: bool,
    pub filter: CollisionFilter,
    pub additional_mass: f32,
}

/// A fragment that exists in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub body: BodyId,
    pub visual: VisualId,
    pub mass: f32,
    pub volume: f32,
}

#[derive(Debug)]
pub struct Building {
    name: String,
    profile: BuildingProfile,
    position: Vec3,
    asset: Option<AssetHandle<SceneNode>>,
    state: BuildingState,
    intact_body: Option<BodyId>,
    intact_visual: Option<VisualId>,
    descriptors: Vec<FragmentDescriptor>,
    fragments: Vec<Fragment>,
    main_mass: f32,
    main_volume: f32,
    total_fragment_volume: f32,
    fracture_pending: bool,
    /// Loading gave up (asset failed or was unusable); stay in `Loading`.
    stalled: bool,
}

impl Building {
    /// A building waiting for `asset`, or a plain box when `asset` is `None`.
    pub fn new(
        name: impl Into<String>,
        profile: BuildingProfile,
        position: Vec3,
        asset: Option<AssetHandle<SceneNode>>,
    ) -> Self {
        Self {
            name: name.into(),
            main_mass: profile.mass,
            profile,
            position,
            asset,
            state: BuildingState::Loading,
            intact_body: None,
            intact_visual: None,
            descriptors: Vec::new(),
            fragments: Vec::new(),
            main_volume: 0.0,
            total_fragment_volume: 0.0,
            fracture_pending: false,
            stalled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> BuildingState {
        self.state
    }

    pub fn profile(&self) -> &BuildingProfile {
        &self.profile
    }

    pub fn intact_body(&self) -> Option<BodyId> {
        self.intact_body
    }

    pub fn intact_visual(&self) -> Option<VisualId> {
        self.intact_visual
    }

    pub fn descriptors(&self) -> &[FragmentDescriptor] {
        &self.descriptors
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn main_mass(&self) -> f32 {
        self.main_mass
    }

    pub fn main_volume(&self) -> f32 {
        self.main_volume
    }

    pub fn total_fragment_volume(&self) -> f32 {
        self.total_fragment_volume
    }

    pub fn is_fracture_pending(&self) -> bool {
        self.fracture_pending
    }

    pub fn owns(&self, body: BodyId) -> bool {
        self.intact_body == Some(body) || self.fragments.iter().any(|f| f.body == body)
    }

    /// Latch a fracture if `contact` hit the intact body hard enough.
    pub fn handle_contact(&mut self, contact: &ContactEvent) {
        if self.state != BuildingState::Intact
            || self.fracture_pending
            || self.descriptors.is_empty()
        {
            return;
        }
        let Some(body) = self.intact_body else {
            return;
        };
        let Some(force) = contact.impact_force_on(body) else {
            return;
        };

        log::debug!(
            "{}: impact {force:.2} (threshold {:.2})",
            self.name,
            self.profile.break_threshold
        );
        if force > self.profile.break_threshold {
            self.fracture_pending = true;
        }
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        match self.state {
            BuildingState::Loading => {
                if let Err(err) = self.try_load(ctx) {
                    log::error!("{}: load failed: {err}", self.name);
                    self.stalled = true;
                }
            }
            BuildingState::Intact if self.fracture_pending => self.fracture(ctx),
            BuildingState::Intact => {
                if let (Some(body), Some(visual)) = (self.intact_body, self.intact_visual) {
                    if let Some(pose) = ctx.physics.pose(body) {
                        ctx.visuals.set_transform(visual, pose);
                    }
                }
            }
            BuildingState::Fractured => {
                for fragment in &self.fragments {
                    if let Some(pose) = ctx.physics.pose(fragment.body) {
                        ctx.visuals.set_transform(fragment.visual, pose);
                    }
                }
            }
        }
    }

    /// Advance out of `Loading` if the asset is ready. `Ok(false)` means still waiting.
    pub fn try_load(&mut self, ctx: &mut TickContext<'_>) -> Result<bool, SimError> {
        if self.stalled || self.state != BuildingState::Loading {
            return Ok(false);
        }
        let Some(handle) = self.asset.clone() else {
            self.build_box(ctx);
            return Ok(true);
        };

        match handle.poll() {
            AssetState::Pending => Ok(false),
            AssetState::Failed(reason) => {
                log::warn!(
                    "{}: asset `{}` failed to load ({reason}); staying unloaded",
                    self.name,
                    handle.key()
                );
                self.stalled = true;
                Ok(false)
            }
            AssetState::Ready(root) => {
                self.build_from_asset(&root, handle.key(), ctx)?;
                Ok(true)
            }
        }
    }

    fn body_kind(&self) -> BodyKind {
        if self.profile.anchored || self.profile.mass <= 0.0 {
            BodyKind::Fixed
        } else {
            BodyKind::Dynamic
        }
    }

    /// Only breakable bodies report contacts.
    fn intact_def(&self, pose: Transform, shape: ColliderShapeDef, breakable: bool) -> BodyDef {
        let mut def = BodyDef::new(self.body_kind(), pose, shape)
            .with_material(self.profile.material)
            .with_damping(self.profile.damping)
            .with_locked_rotations(self.profile.fixed_rotation)
            .with_filter(self.profile.filter);
        if breakable {
            def = def.with_collision_events();
        }
        if self.profile.mass > 0.0 {
            def = def.with_mass(self.profile.mass);
        }
        def
    }

    fn build_box(&mut self, ctx: &mut TickContext<'_>) {
        let half_extents = self.profile.half_extents();
        let pose = Transform::from_translation(self.position);
        let def = self.intact_def(pose, ColliderShapeDef::Cuboid { half_extents }, false);
        let body = ctx.physics.create_body(def, BodyTag::Building);

        let node = SceneNode::new(self.name.clone()).with_transform(pose);
        let visual = ctx.visuals.attach(&node, Some(ctx.root));

        self.main_volume = 8.0 * half_extents.x * half_extents.y * half_extents.z;
        self.intact_body = Some(body);
        self.intact_visual = Some(visual);
        self.state = BuildingState::Intact;
        log::info!("{}: intact (box)", self.name);
    }

    fn build_from_asset(
        &mut self,
        root: &SceneNode,
        key: &str,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), SimError> {
        let empty = || SimError::EmptyAsset {
            key: key.to_string(),
        };
        let (main, pieces) = root.children.split_first().ok_or_else(empty)?;

        let main_soups = main.collect_soups()?;
        if main_soups.is_empty() {
            return Err(empty());
        }
        let hull = ConvexShape::from_soup(&merge_soups(&main_soups))?;
        let main_volume = hull.volume();

        // Descriptors first: a bad fragment mesh fails the load before anything is created.
        let descriptors = pieces
            .iter()
            .map(|node| self.describe_fragment(node))
            .collect::<Result<Vec<_>, _>>()?;

        let origin = Transform::from_translation(self.position);
        let pose = origin.then(&main.transform);
        let def = self.intact_def(pose, ColliderShapeDef::Convex(hull), !descriptors.is_empty());
        let body = ctx.physics.create_body(def, BodyTag::Building);

        let visual = ctx.visuals.attach(main, Some(ctx.root));
        ctx.visuals.set_transform(visual, pose);

        self.main_volume = main_volume;
        self.descriptors = descriptors;
        self.intact_body = Some(body);
        self.intact_visual = Some(visual);
        self.state = BuildingState::Intact;
        log::info!(
            "{}: intact, volume {:.3}, {} fragments",
            self.name,
            self.main_volume,
            self.descriptors.len()
        );
        Ok(())
    }

    fn describe_fragment(&self, node: &SceneNode) -> Result<FragmentDescriptor, SimError> {
        let origin = Transform::from_translation(self.position);
        Ok(FragmentDescriptor {
            soups: node.collect_soups()?,
            node: node.clone(),
            placement: origin.then(&node.transform),
            material: self.profile.material,
            damping: self.profile.damping,
            lock_rotations: self.profile.fixed_rotation,
            filter: self.profile.filter,
            additional_mass: self.profile.fragment_additional_mass,
        })
    }

    /// Replace the intact body with the fragments. Runs once.
    fn fracture(&mut self, ctx: &mut TickContext<'_>) {
        self.fracture_pending = false;

        // Every hull and volume first; the average needs the final total.
        let mut hulls = Vec::with_capacity(self.descriptors.len());
        for (index, descriptor) in std::mem::take(&mut self.descriptors).into_iter().enumerate() {
            match ConvexShape::from_soup(&merge_soups(&descriptor.soups)) {
                Ok(hull) => hulls.push((descriptor, hull)),
                Err(err) => {
                    log::error!("{}: skipping fragment {index} ({}): {err}", self.name, descriptor.node.name);
                }
            }
        }
        if hulls.is_empty() {
            log::warn!("{}: no usable fragments; staying intact", self.name);
            return;
        }

        if let Some(body) = self.intact_body.take() {
            ctx.physics.remove_body(body);
        }
        if let Some(visual) = self.intact_visual.take() {
            ctx.visuals.detach(visual);
        }
        self.state = BuildingState::Fractured;

        self.total_fragment_volume = hulls.iter().map(|(_, hull)| hull.volume()).sum();
        let average = (self.main_volume + self.total_fragment_volume) / 2.0;

        for (descriptor, hull) in hulls {
            let volume = hull.volume();
            let mass = fragment_mass(volume, average, self.main_mass, descriptor.additional_mass);
            let kind = if mass > 0.0 {
                BodyKind::Dynamic
            } else {
                BodyKind::Fixed
            };

            let mut def = BodyDef::new(kind, descriptor.placement, ColliderShapeDef::Convex(hull))
                .with_material(descriptor.material)
                .with_damping(descriptor.damping)
                .with_locked_rotations(descriptor.lock_rotations)
                .with_filter(descriptor.filter);
            if mass > 0.0 {
                def = def.with_mass(mass);
            }
            let body = ctx.physics.create_body(def, BodyTag::Fragment);

            let visual = ctx.visuals.attach(&descriptor.node, Some(ctx.root));
            ctx.visuals.set_transform(visual, descriptor.placement);

            self.fragments.push(Fragment {
                body,
                visual,
                mass,
                volume,
            });
        }

        log::info!("{}: fractured into {} pieces", self.name, self.fragments.len());
    }
}

/// Volume-weighted share of the intact mass.
pub fn fragment_mass(volume: f32, average_volume: f32, main_mass: f32, additional_mass: f32) -> f32 {
    if average_volume <= 0.0 {
        return additional_mass;
    }
    volume / average_volume * main_mass + additional_mass
}
