//! The player: an upright dynamic cylinder pushed around by camera-relative input.

use shared::{
    BodyDef, BodyKind, BodyTag, ColliderShapeDef, CollisionFilter, CollisionLayer, Damping, Quat,
    Transform, Vec3, to_planar, yaw_from_xz,
};

use crate::{
    asset::SceneNode,
    config::PlayerConfig,
    physics::BodyId,
    scene::TickContext,
    visual::VisualId,
};

/// Keys held this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputState {
    /// Sum of the held keys' unit directions for a camera looking along `camera_forward`.
    ///
    /// Forward is the camera heading flattened onto XZ; left is `up x forward`. A camera
    /// looking straight up or down falls back to -Z.
    pub fn direction(&self, camera_forward: Vec3) -> Vec3 {
        let forward = Vec3::new(camera_forward.x, 0.0, camera_forward.z)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vec3::z());
        let left = Vec3::y().cross(&forward);

        let mut dir = Vec3::zeros();
        if self.forward {
            dir += forward;
        }
        if self.back {
            dir -= forward;
        }
        if self.left {
            dir += left;
        }
        if self.right {
            dir -= left;
        }
        dir
    }
}

#[derive(Debug)]
pub struct Player {
    config: PlayerConfig,
    body: BodyId,
    visual: VisualId,
    health: f32,
    input: InputState,
    camera_forward: Vec3,
    jump_held: bool,
    yaw: f32,
}

impl Player {
    pub fn spawn(config: PlayerConfig, ctx: &mut TickContext<'_>) -> Self {
        let pose = Transform::from_translation(Vec3::from(config.position));
        let def = BodyDef::new(
            BodyKind::Dynamic,
            pose,
            ColliderShapeDef::CylinderY {
                radius: config.radius,
                half_height: config.half_height,
            },
        )
        .with_mass(config.mass)
        .with_material(config.material)
        .with_damping(Damping {
            linear: config.linear_damping,
            angular: 0.0,
        })
        .with_locked_rotations(true)
        .with_filter(CollisionFilter::layer(CollisionLayer::Player));
        let body = ctx.physics.create_body(def, BodyTag::Player);

        let visual = ctx
            .visuals
            .attach(&SceneNode::new("player").with_transform(pose), Some(ctx.root));

        Self {
            health: config.max_health,
            config,
            body,
            visual,
            input: InputState::default(),
            camera_forward: -Vec3::z(),
            jump_held: false,
            yaw: 0.0,
        }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn visual(&self) -> VisualId {
        self.visual
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.config.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Facing yaw of the visual (radians about +Y; zero faces -Z).
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Take damage; health never drops below zero.
    pub fn lose_health(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        log::debug!("player health {:.0}/{:.0}", self.health, self.config.max_health);
    }

    /// Input to apply on the next update.
    pub fn set_input(&mut self, input: InputState, camera_forward: Vec3) {
        self.input = input;
        self.camera_forward = camera_forward;
    }

    pub fn owns(&self, body: BodyId) -> bool {
        self.body == body
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        let mass = ctx.physics.mass(self.body).unwrap_or(self.config.mass);

        // Each held key pushes with the full move force, so diagonals are faster.
        let dir = self.input.direction(self.camera_forward);
        if dir.norm_squared() > 0.0 {
            ctx.physics
                .add_force(self.body, dir * self.config.move_speed * mass);
        }

        // One impulse per press.
        if self.input.jump && !self.jump_held {
            ctx.physics
                .apply_impulse(self.body, Vec3::y() * self.config.jump_impulse * mass);
        }
        self.jump_held = self.input.jump;

        let Some(translation) = ctx.physics.translation(self.body) else {
            return;
        };
        if let Some(velocity) = ctx.physics.linvel(self.body) {
            if let Some(yaw) = yaw_from_xz(to_planar(&velocity)) {
                self.yaw = yaw;
            }
        }
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), self.yaw);
        ctx.visuals
            .set_transform(self.visual, Transform::new(translation, rotation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_relative_directions() {
        let camera = Vec3::new(0.0, -0.5, -2.0);
        let forward = InputState {
            forward: true,
            ..InputState::default()
        };
        let left = InputState {
            left: true,
            ..InputState::default()
        };

        assert!((forward.direction(camera) - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-6);
        // up x (-Z) = -X
        assert!((left.direction(camera) - Vec3::new(-1.0, 0.0, 0.0)).norm() < 1.0e-6);
    }

    #[test]
    fn opposite_keys_cancel() {
        let input = InputState {
            forward: true,
            back: true,
            left: true,
            right: true,
            jump: false,
        };
        assert_eq!(input.direction(Vec3::x()), Vec3::zeros());
    }

    #[test]
    fn vertical_camera_falls_back_to_minus_z() {
        let input = InputState {
            forward: true,
            ..InputState::default()
        };
        assert_eq!(input.direction(Vec3::y()), -Vec3::z());
    }
}
