//! Water: a cloud of small dynamic balls nudged by a crude SPH pass each tick.

use rand::Rng;
use shared::{
    BodyDef, BodyKind, BodyTag, ColliderShapeDef, CollisionFilter, Transform, Vec3, sph_accelerations,
};

use crate::{
    asset::SceneNode,
    config::WaterConfig,
    physics::BodyId,
    scene::TickContext,
    visual::VisualId,
};

const PARTICLE_MASS: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub body: BodyId,
    pub visual: VisualId,
}

#[derive(Debug)]
pub struct Water {
    config: WaterConfig,
    particles: Vec<Particle>,
}

impl Water {
    /// Drop `config.count` particles around `config.position`, jittered per axis.
    pub fn spawn(config: WaterConfig, ctx: &mut TickContext<'_>) -> Self {
        let start = Vec3::from(config.position);
        let low = -1.0_f32;
        let high = 15.0 * config.radius - 1.0;

        let mut particles = Vec::with_capacity(config.count);
        for index in 0..config.count {
            let mut jitter = || {
                if high > low {
                    ctx.rng.random_range(low..high)
                } else {
                    low
                }
            };
            let offset = Vec3::new(jitter(), jitter(), jitter());
            let pose = Transform::from_translation(start + offset);

            let def = BodyDef::new(
                BodyKind::Dynamic,
                pose,
                ColliderShapeDef::Ball {
                    radius: config.radius,
                },
            )
            .with_mass(PARTICLE_MASS)
            .with_filter(CollisionFilter::all());
            let body = ctx.physics.create_body(def, BodyTag::WaterParticle);

            let node = SceneNode::new(format!("water_{index}")).with_transform(pose);
            let visual = ctx.visuals.attach(&node, Some(ctx.root));

            particles.push(Particle { body, visual });
        }

        log::info!("water: spawned {} particles", particles.len());
        Self { config, particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn owns(&self, body: BodyId) -> bool {
        self.particles.iter().any(|p| p.body == body)
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        // Particles removed from the world drop out of the pass.
        let live: Vec<(BodyId, Vec3, Vec3)> = self
            .particles
            .iter()
            .filter_map(|p| {
                let position = ctx.physics.translation(p.body)?;
                let velocity = ctx.physics.linvel(p.body)?;
                Some((p.body, position, velocity))
            })
            .collect();

        let positions: Vec<Vec3> = live.iter().map(|(_, x, _)| *x).collect();
        let velocities: Vec<Vec3> = live.iter().map(|(_, _, v)| *v).collect();
        let accelerations = sph_accelerations(&positions, &velocities, &self.config.sph);

        for ((body, _, velocity), acceleration) in live.iter().zip(&accelerations) {
            ctx.physics.set_linvel(*body, velocity + acceleration * ctx.dt);
        }

        for particle in &self.particles {
            if let Some(pose) = ctx.physics.pose(particle.body) {
                ctx.visuals.set_transform(particle.visual, pose);
            }
        }
    }
}
