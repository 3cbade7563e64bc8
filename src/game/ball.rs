//! Balls: spawned resting on a platform, swiped toward the level, pulled
//! toward the black hole

use glam::{Quat, Vec3, Vec4};
use hecs::Entity;

use crate::core::BallConfig;
use crate::ecs::{PhysicsBody, Transform, World, entity_to_user_data};
use crate::physics::{BodyOptions, ColliderOptions, CollisionKind, Physics, RigidBodyHandle};

/// Player color, doubling as the player's identity on the winning screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BallColor {
    #[default]
    Unknown,
    Red,
    Yellow,
    Green,
    Blue,
}

impl BallColor {
    /// Stable numeric id
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Red => 1,
            Self::Yellow => 2,
            Self::Green => 3,
            Self::Blue => 4,
        }
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Self {
        match id {
            1 => Self::Red,
            2 => Self::Yellow,
            3 => Self::Green,
            4 => Self::Blue,
            _ => Self::Unknown,
        }
    }

    /// Diffuse color
    #[must_use]
    pub fn rgba(self) -> Vec4 {
        let [r, g, b] = match self {
            Self::Unknown => [255, 255, 255],
            Self::Red => [255, 64, 64],
            Self::Yellow => [255, 255, 64],
            Self::Green => [64, 255, 64],
            Self::Blue => [64, 64, 255],
        };
        Vec4::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
        }
    }
}

/// Ball component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Index of the platform that spawned the ball
    pub platform: usize,
    pub color: BallColor,
    /// Resting on its platform, not yet swiped
    pub held: bool,
}

/// Spawn a resting ball at `position`
pub fn spawn_ball(
    world: &mut World,
    physics: &mut Physics,
    config: &BallConfig,
    position: Vec3,
    platform: usize,
    color: BallColor,
) -> Entity {
    let body = physics.create_dynamic_body(
        position,
        Quat::IDENTITY,
        BodyOptions::default()
            .with_linear_damping(config.held_damping)
            .with_can_sleep(false)
            .with_ccd(true),
    );
    let entity = world.spawn((
        Ball {
            platform,
            color,
            held: true,
        },
        Transform::from_position(position).with_scale(config.radius),
        PhysicsBody(body),
    ));
    physics.add_ball_collider(
        body,
        config.radius,
        ColliderOptions::new(CollisionKind::Ball)
            .with_mass(config.mass)
            .with_restitution(config.restitution)
            .with_user_data(entity_to_user_data(entity)),
    );
    log::debug!("Spawned {} ball for platform {platform}", color.name());
    entity
}

/// Pull a ball toward the black hole at the origin. Forces are reset first,
/// so call once before each substep.
pub fn apply_gravity(physics: &mut Physics, body: RigidBodyHandle) {
    if let Some(position) = physics.position(body) {
        physics.reset_forces(body);
        physics.add_force(body, -position);
    }
}

/// Remove a ball and its body
pub fn destroy_ball(world: &mut World, physics: &mut Physics, entity: Entity) {
    let body = world.get::<PhysicsBody>(entity).map(|b| b.0).ok();
    if let Some(body) = body {
        physics.remove_body(body);
    }
    if world.despawn(entity).is_err() {
        log::warn!("Tried to destroy a ball that no longer exists");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_ids_are_stable() {
        for color in [
            BallColor::Unknown,
            BallColor::Red,
            BallColor::Yellow,
            BallColor::Green,
            BallColor::Blue,
        ] {
            assert_eq!(BallColor::from_id(color.id()), color);
        }
        assert_eq!(BallColor::Blue.id(), 4);
        assert_eq!(BallColor::from_id(77), BallColor::Unknown);
    }

    #[test]
    fn test_held_ball_rests_and_released_ball_falls() {
        let mut world = World::new();
        let mut physics = Physics::new();
        let config = BallConfig::default();
        let start = Vec3::new(16.0, 8.5, 71.0);
        let entity = spawn_ball(&mut world, &mut physics, &config, start, 0, BallColor::Yellow);
        let body = world.get::<PhysicsBody>(entity).unwrap().0;

        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }
        assert!((physics.position(body).unwrap() - start).length() < 1e-4);

        physics.set_linear_damping(body, 0.0);
        for _ in 0..60 {
            apply_gravity(&mut physics, body);
            physics.step(1.0 / 60.0);
        }
        assert!(physics.position(body).unwrap().length() < start.length());

        destroy_ball(&mut world, &mut physics, entity);
        assert!(!world.contains(entity));
        assert!(physics.position(body).is_none());
    }
}
