//! The black hole: a solid half-space below `z = 0` that swallows balls

use glam::{Mat2, Quat, Vec2, Vec3};
use hecs::Entity;

use crate::ecs::{PhysicsBody, Transform, World, entity_to_user_data};
use crate::physics::{ColliderHandle, ColliderOptions, CollisionKind, Physics};

/// Marker component for the black hole entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackHoleTag;

#[derive(Debug)]
pub struct BlackHole {
    entity: Entity,
    collider: ColliderHandle,
    /// Spiral angle in radians
    spin: f32,
}

impl BlackHole {
    /// Size of the visible pane
    pub const PANE_SIZE: Vec2 = Vec2::new(85.0, 80.0);
    /// Spiral speed in radians per millisecond
    const SPIN_RATE: f32 = 0.0005;

    pub fn new(world: &mut World, physics: &mut Physics) -> Self {
        let body = physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        let entity = world.spawn((
            BlackHoleTag,
            Transform::from_position(Vec3::ZERO),
            PhysicsBody(body),
        ));
        let collider = physics.add_halfspace_collider(
            body,
            Vec3::Z,
            ColliderOptions::new(CollisionKind::BlackHole)
                .with_user_data(entity_to_user_data(entity)),
        );
        Self {
            entity,
            collider,
            spin: 0.0,
        }
    }

    /// Advance the spiral
    pub fn rotate(&mut self, dt_ms: f32) {
        self.spin += dt_ms * Self::SPIN_RATE;
    }

    #[must_use]
    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// 2D rotation applied to the spiral texture coordinates
    #[must_use]
    pub fn rotation_matrix(&self) -> Mat2 {
        Mat2::from_angle(self.spin)
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[must_use]
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_rate() {
        let mut world = World::new();
        let mut physics = Physics::new();
        let mut hole = BlackHole::new(&mut world, &mut physics);

        hole.rotate(1000.0);
        hole.rotate(1000.0);
        assert!((hole.spin() - 1.0).abs() < 1e-6);

        let m = hole.rotation_matrix();
        assert!((m * Vec2::X - Vec2::new(1.0f32.cos(), 1.0f32.sin())).length() < 1e-6);
        assert_eq!(physics.collider_kind(hole.collider()), Some(CollisionKind::BlackHole));
        assert!(world.contains(hole.entity()));
    }
}
