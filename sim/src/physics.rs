//! Rapier world wrapper owned by the scene.
//!
//! Responsibilities
//! - Create and remove bodies from [`BodyDef`]s, handing out stable [`BodyId`]s.
//! - Tag every body in the [`CollisionFilterRegistry`].
//! - Step the world and return the contacts that started during the step, in a deterministic
//!   order.
//!
//! Body ids
//! - Monotonic `u64`s, never reused. The id is stored in the Rapier `user_data` of the body and
//!   of its collider, so event handlers can map handles back to ids without a lookup table.
//!
//! Contacts
//! - Rapier reports collision starts during the narrow phase, before the solver runs. The
//!   collector snapshots both bodies' velocities and masses at that moment, so impact
//!   strength reflects the approach speed rather than the post-bounce speed.
//! - Mass is reported as `0` for bodies that are not dynamic.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Mutex, PoisonError},
};

use shared::{
    BodyDef, BodyTag, CollisionFilter, Transform, Vec3,
    rapier3d::prelude::{
        BroadPhaseBvh, CCDSolver, ColliderHandle, ColliderSet, CollisionEvent, ContactPair,
        EventHandler, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
        NarrowPhase, PhysicsPipeline, Real, RigidBody, RigidBodyHandle, RigidBodySet,
    },
};

use crate::registry::CollisionFilterRegistry;

/// Stable identity of a body. Ordering is creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One contact that started during a step, as seen just before it was resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactEvent {
    pub a: BodyId,
    pub b: BodyId,
    /// Unit contact normal pointing from `a` towards `b`.
    pub normal: Vec3,
    /// `velocity(a) - velocity(b)`.
    pub relative_velocity: Vec3,
    /// Mass of `a`; `0` unless dynamic.
    pub mass_a: f32,
    /// Mass of `b`; `0` unless dynamic.
    pub mass_b: f32,
}

impl ContactEvent {
    #[inline]
    pub fn involves(&self, body: BodyId) -> bool {
        self.a == body || self.b == body
    }

    /// The body on the other side of the contact from `body`.
    pub fn other(&self, body: BodyId) -> Option<BodyId> {
        if self.a == body {
            Some(self.b)
        } else if self.b == body {
            Some(self.a)
        } else {
            None
        }
    }

    /// Closing speed along the normal.
    #[inline]
    pub fn impact_speed(&self) -> f32 {
        self.relative_velocity.dot(&self.normal).abs()
    }

    /// Impact force felt by `body`: closing speed along the normal times the other body's mass.
    pub fn impact_force_on(&self, body: BodyId) -> Option<f32> {
        let other_mass = if self.a == body {
            self.mass_b
        } else if self.b == body {
            self.mass_a
        } else {
            return None;
        };
        Some(self.impact_speed() * other_mass)
    }

    /// Same contact with `a` the older body.
    fn ordered(self) -> Self {
        if self.a <= self.b {
            return self;
        }
        Self {
            a: self.b,
            b: self.a,
            normal: -self.normal,
            relative_velocity: -self.relative_velocity,
            mass_a: self.mass_b,
            mass_b: self.mass_a,
        }
    }
}

/// Rapier event handler that queues contact starts.
///
/// Rapier requires handlers to be `Send + Sync`; the queue is only touched from the stepping
/// thread.
#[derive(Default)]
struct ContactCollector {
    queue: Mutex<Vec<ContactEvent>>,
}

impl ContactCollector {
    fn drain(&self) -> Vec<ContactEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        if !event.started() || event.sensor() {
            return;
        }
        let Some(contact) = snapshot_contact(
            bodies,
            colliders,
            event.collider1(),
            event.collider2(),
            contact_pair,
        ) else {
            return;
        };

        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(contact);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

fn dynamic_mass(body: &RigidBody) -> f32 {
    if body.is_dynamic() { body.mass() } else { 0.0 }
}

fn snapshot_contact(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    c1: ColliderHandle,
    c2: ColliderHandle,
    pair: Option<&ContactPair>,
) -> Option<ContactEvent> {
    let rb1 = bodies.get(colliders.get(c1)?.parent()?)?;
    let rb2 = bodies.get(colliders.get(c2)?.parent()?)?;

    // Manifold normals point from the pair's first collider to its second.
    let manifold_normal = pair.and_then(|pair| {
        let manifold = pair.manifolds.iter().find(|m| !m.points.is_empty())?;
        let n = manifold.data.normal;
        Some(if pair.collider1 == c1 { n } else { -n })
    });
    let normal = manifold_normal
        .filter(|n| n.norm_squared() > f32::EPSILON)
        .or_else(|| (rb2.translation() - rb1.translation()).try_normalize(f32::EPSILON))
        .unwrap_or_else(Vec3::y);

    Some(
        ContactEvent {
            a: BodyId(rb1.user_data as u64),
            b: BodyId(rb2.user_data as u64),
            normal,
            relative_velocity: rb1.linvel() - rb2.linvel(),
            mass_a: dynamic_mass(rb1),
            mass_b: dynamic_mass(rb2),
        }
        .ordered(),
    )
}

/// The rigid-body world, its id table and its tag registry.
pub struct PhysicsContext {
    gravity: Vec3,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    collector: ContactCollector,
    handles: BTreeMap<BodyId, (RigidBodyHandle, ColliderHandle)>,
    /// Bodies with user forces to clear after the next step.
    forced: Vec<RigidBodyHandle>,
    next_id: u64,
    registry: CollisionFilterRegistry,
}

impl PhysicsContext {
    /// `gravity` is a magnitude applied along -Y; `dt` is the fixed step in seconds.
    pub fn new(gravity: f32, dt: f32) -> Self {
        Self {
            gravity: Vec3::new(0.0, -gravity, 0.0),
            integration_parameters: IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            collector: ContactCollector::default(),
            handles: BTreeMap::new(),
            forced: Vec::new(),
            next_id: 1,
            registry: CollisionFilterRegistry::new(),
        }
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Change the step length. Non-positive or non-finite values are ignored.
    pub fn set_dt(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.integration_parameters.dt = dt;
        }
    }

    pub fn registry(&self) -> &CollisionFilterRegistry {
        &self.registry
    }

    /// Create a body with its collider and tag it.
    pub fn create_body(&mut self, def: BodyDef, tag: BodyTag) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let (body, collider) = def.into_rapier(u128::from(id.0));
        let rb = self.bodies.insert(body);
        let co = self.colliders.insert_with_parent(collider, rb, &mut self.bodies);
        self.handles.insert(id, (rb, co));
        self.registry.register(id, tag);

        log::debug!("created {tag} body {id}");
        id
    }

    /// Remove a body and its collider. Returns `false` if it was already gone.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let Some((rb, _)) = self.handles.remove(&id) else {
            return false;
        };
        self.bodies.remove(
            rb,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.forced.retain(|h| *h != rb);
        log::debug!("removed body {id}");
        true
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn body_count(&self) -> usize {
        self.handles.len()
    }

    /// Live bodies carrying `tag`, oldest first.
    pub fn bodies_tagged(&self, tag: BodyTag) -> Vec<BodyId> {
        self.handles
            .keys()
            .copied()
            .filter(|id| self.registry.is(*id, tag))
            .collect()
    }

    /// Advance the world one step and return the contacts that started, sorted by
    /// `(older body, newer body)`.
    pub fn step(&mut self) -> Vec<ContactEvent> {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            &(),
            &self.collector,
        );

        // Forces apply for one step only.
        for handle in self.forced.drain(..) {
            if let Some(rb) = self.bodies.get_mut(handle) {
                rb.reset_forces(false);
            }
        }

        let mut events = self.collector.drain();
        events.sort_by_key(|e| (e.a, e.b));
        events
    }

    fn body(&self, id: BodyId) -> Option<&RigidBody> {
        let (rb, _) = self.handles.get(&id)?;
        self.bodies.get(*rb)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let (rb, _) = self.handles.get(&id)?;
        self.bodies.get_mut(*rb)
    }

    pub fn pose(&self, id: BodyId) -> Option<Transform> {
        self.body(id)
            .map(|rb| Transform::new(*rb.translation(), *rb.rotation()))
    }

    pub fn translation(&self, id: BodyId) -> Option<Vec3> {
        self.body(id).map(|rb| *rb.translation())
    }

    pub fn linvel(&self, id: BodyId) -> Option<Vec3> {
        self.body(id).map(|rb| *rb.linvel())
    }

    pub fn set_linvel(&mut self, id: BodyId, velocity: Vec3) {
        if let Some(rb) = self.body_mut(id) {
            rb.set_linvel(velocity, true);
        }
    }

    /// Mass of a dynamic body; `0` for fixed and kinematic bodies.
    pub fn mass(&self, id: BodyId) -> Option<f32> {
        self.body(id).map(dynamic_mass)
    }

    pub fn is_dynamic(&self, id: BodyId) -> bool {
        self.body(id).is_some_and(RigidBody::is_dynamic)
    }

    pub fn is_fixed(&self, id: BodyId) -> bool {
        self.body(id).is_some_and(RigidBody::is_fixed)
    }

    /// Push on a body's center of mass for the next step.
    pub fn add_force(&mut self, id: BodyId, force: Vec3) {
        let Some((rb, _)) = self.handles.get(&id).copied() else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(rb) {
            body.add_force(force, true);
            self.forced.push(rb);
        }
    }

    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec3) {
        if let Some(rb) = self.body_mut(id) {
            rb.apply_impulse(impulse, true);
        }
    }

    /// Where a kinematic body should be at the end of the next step.
    pub fn set_kinematic_translation(&mut self, id: BodyId, translation: Vec3) {
        if let Some(rb) = self.body_mut(id) {
            rb.set_next_kinematic_translation(translation);
        }
    }

    /// Turn a body's contact response on or off. The body stays in the world either way.
    pub fn set_collision_response(&mut self, id: BodyId, enabled: bool) {
        let Some((_, co)) = self.handles.get(&id).copied() else {
            return;
        };
        if let Some(collider) = self.colliders.get_mut(co) {
            collider.set_sensor(!enabled);
        }
    }

    pub fn collision_response(&self, id: BodyId) -> Option<bool> {
        let (_, co) = self.handles.get(&id)?;
        self.colliders.get(*co).map(|c| !c.is_sensor())
    }

    pub fn collision_filter(&self, id: BodyId) -> Option<CollisionFilter> {
        let (_, co) = self.handles.get(&id)?;
        let groups = self.colliders.get(*co)?.collision_groups();
        Some(CollisionFilter {
            group: groups.memberships.bits(),
            mask: groups.filter.bits(),
        })
    }

    pub fn set_collision_filter(&mut self, id: BodyId, filter: CollisionFilter) {
        let Some((_, co)) = self.handles.get(&id).copied() else {
            return;
        };
        if let Some(collider) = self.colliders.get_mut(co) {
            collider.set_collision_groups(filter.interaction_groups());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BodyKind, ColliderShapeDef, CollisionLayer, TICK_DT};

    fn ground(ctx: &mut PhysicsContext) -> BodyId {
        ctx.create_body(
            BodyDef::new(
                BodyKind::Fixed,
                Transform::identity(),
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(10.0, 0.5, 10.0),
                },
            )
            .with_collision_events(),
            BodyTag::Land,
        )
    }

    fn ball(ctx: &mut PhysicsContext, y: f32, mass: f32) -> BodyId {
        ctx.create_body(
            BodyDef::new(
                BodyKind::Dynamic,
                Transform::from_translation(Vec3::new(0.0, y, 0.0)),
                ColliderShapeDef::Ball { radius: 0.5 },
            )
            .with_mass(mass),
            BodyTag::WaterParticle,
        )
    }

    fn step_until_contact(ctx: &mut PhysicsContext, max_steps: usize) -> Vec<ContactEvent> {
        for _ in 0..max_steps {
            let events = ctx.step();
            if !events.is_empty() {
                return events;
            }
        }
        Vec::new()
    }

    #[test]
    fn ids_are_monotonic_and_registered() {
        let mut ctx = PhysicsContext::new(9.81, TICK_DT);
        let a = ground(&mut ctx);
        let b = ball(&mut ctx, 3.0, 1.0);

        assert!(a < b);
        assert_eq!(ctx.registry().lookup(a), Some(BodyTag::Land));
        assert_eq!(ctx.registry().lookup(b), Some(BodyTag::WaterParticle));
        assert_eq!(ctx.bodies_tagged(BodyTag::Land), vec![a]);

        assert!(ctx.remove_body(b));
        assert!(!ctx.remove_body(b));
        assert!(!ctx.contains(b));
        // Tags outlive their bodies.
        assert_eq!(ctx.registry().lookup(b), Some(BodyTag::WaterParticle));

        let c = ball(&mut ctx, 3.0, 1.0);
        assert!(c > b);
    }

    #[test]
    fn falling_ball_reports_one_ordered_contact() {
        let mut ctx = PhysicsContext::new(9.81, TICK_DT);
        let floor = ground(&mut ctx);
        let falling = ball(&mut ctx, 2.0, 3.0);

        let events = step_until_contact(&mut ctx, 240);
        assert_eq!(events.len(), 1);
        let e = events[0];

        assert_eq!((e.a, e.b), (floor, falling));
        assert_eq!(e.mass_a, 0.0);
        assert!((e.mass_b - 3.0).abs() < 1.0e-3);
        // Normal points from the floor up into the ball; the ball approaches downward.
        assert!(e.normal.y > 0.9, "{:?}", e.normal);
        assert!(e.relative_velocity.y > 0.0);

        let force = e.impact_force_on(floor).unwrap();
        assert!((force - e.impact_speed() * 3.0).abs() < 1.0e-4);
        assert_eq!(e.impact_force_on(falling), Some(0.0));
    }

    #[test]
    fn forces_last_one_step() {
        let mut ctx = PhysicsContext::new(0.0, TICK_DT);
        let b = ball(&mut ctx, 0.0, 1.0);

        ctx.add_force(b, Vec3::new(60.0, 0.0, 0.0));
        ctx.step();
        let v1 = ctx.linvel(b).unwrap().x;
        ctx.step();
        let v2 = ctx.linvel(b).unwrap().x;

        assert!(v1 > 0.5, "{v1}");
        assert!((v2 - v1).abs() < 1.0e-4, "{v1} {v2}");
    }

    #[test]
    fn collision_response_and_filter_round_trip() {
        let mut ctx = PhysicsContext::new(9.81, TICK_DT);
        let b = ball(&mut ctx, 0.0, 1.0);

        assert_eq!(ctx.collision_response(b), Some(true));
        ctx.set_collision_response(b, false);
        assert_eq!(ctx.collision_response(b), Some(false));
        assert!(ctx.contains(b));

        let filter = CollisionFilter::layer_against(CollisionLayer::SeaLevel, &[CollisionLayer::Player]);
        ctx.set_collision_filter(b, filter);
        assert_eq!(ctx.collision_filter(b), Some(filter));
    }

    #[test]
    fn contact_event_reorders_by_creation() {
        let e = ContactEvent {
            a: BodyId(9),
            b: BodyId(4),
            normal: Vec3::x(),
            relative_velocity: Vec3::new(2.0, 0.0, 0.0),
            mass_a: 1.0,
            mass_b: 5.0,
        }
        .ordered();

        assert_eq!((e.a, e.b), (BodyId(4), BodyId(9)));
        assert_eq!(e.normal, -Vec3::x());
        assert_eq!(e.mass_a, 5.0);
        assert_eq!(e.other(BodyId(4)), Some(BodyId(9)));
        assert_eq!(e.other(BodyId(1)), None);
        assert_eq!(e.impact_force_on(BodyId(4)), Some(2.0));
    }
}
