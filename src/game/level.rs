//! The level: one rotating compound body made of bloks
//!
//! Each blok is a cuboid collider on the level body. Bloks lose hit points
//! when balls strike them and are detached once they run out.

use glam::{Quat, Vec3, Vec4};
use hecs::Entity;
use rustc_hash::FxHashMap;

use crate::assets::LevelLayout;
use crate::core::LevelConfig;
use crate::ecs::{PhysicsBody, Transform, World, entity_to_user_data};
use crate::physics::{
    BodyOptions, ColliderHandle, ColliderOptions, CollisionKind, Physics, RigidBodyHandle,
};

/// Per-blok durability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockData {
    /// Center in level-local space
    pub center: Vec3,
    pub half_extent: f32,
    pub rotation: Quat,
    pub hit_points: i32,
    /// Session time of the last counted hit
    pub last_hit_ms: Option<f64>,
}

/// Outcome of a ball striking the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitInfo {
    /// The hit counted against a blok
    pub block_hit: bool,
    /// The blok ran out of hit points and was removed
    pub block_destroyed: bool,
}

/// Marker component for the level entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTag;

pub struct Level {
    entity: Entity,
    body: RigidBodyHandle,
    blocks: FxHashMap<ColliderHandle, BlockData>,
    hit_cooldown_ms: f64,
    glow: Vec4,
    light_position: Vec3,
}

impl Level {
    /// Build the level body at `position` from a layout
    pub fn new(
        world: &mut World,
        physics: &mut Physics,
        layout: &LevelLayout,
        position: Vec3,
        config: &LevelConfig,
    ) -> Self {
        let body = physics.create_dynamic_body(
            position,
            Quat::IDENTITY,
            BodyOptions::default()
                .with_angular_damping(config.angular_damping)
                .with_locked_translations()
                .with_can_sleep(false),
        );
        let entity = world.spawn((LevelTag, Transform::from_position(position), PhysicsBody(body)));
        let user_data = entity_to_user_data(entity);

        let mut blocks = FxHashMap::default();
        for block in layout.scaled_blocks() {
            let collider = physics.add_cuboid_collider(
                body,
                Vec3::splat(block.half_extent),
                block.center,
                block.rotation,
                ColliderOptions::new(CollisionKind::Blok)
                    .with_mass(config.block_mass)
                    .with_restitution(config.block_restitution)
                    .with_user_data(user_data),
            );
            let hit_points = if block.center.length() < config.center_radius {
                config.center_hit_points
            } else {
                config.outer_hit_points
            };
            blocks.insert(
                collider,
                BlockData {
                    center: block.center,
                    half_extent: block.half_extent,
                    rotation: block.rotation,
                    hit_points,
                    last_hit_ms: None,
                },
            );
        }
        log::info!("Level '{}' built with {} bloks", layout.name, blocks.len());

        Self {
            entity,
            body,
            blocks,
            hit_cooldown_ms: config.hit_cooldown_ms,
            glow: Vec4::ZERO,
            light_position: Vec3::new(20.0, 20.0, -25.0),
        }
    }

    /// Apply a ball hit at a world-space point.
    ///
    /// The blok whose center is nearest to the point (in level-local space)
    /// takes the hit. A blok counts at most one hit per cooldown window.
    pub fn handle_ball_hit(
        &mut self,
        physics: &mut Physics,
        world_hit: Vec3,
        hit_time_ms: f64,
    ) -> HitInfo {
        let Some(local) = physics.world_to_local(self.body, world_hit) else {
            return HitInfo::default();
        };

        let Some((&collider, block)) = self.blocks.iter_mut().min_by(|(_, a), (_, b)| {
            a.center
                .distance_squared(local)
                .total_cmp(&b.center.distance_squared(local))
        }) else {
            return HitInfo::default();
        };

        let mut info = HitInfo::default();
        let counts = block
            .last_hit_ms
            .is_none_or(|last| hit_time_ms - last > self.hit_cooldown_ms);
        if counts {
            block.last_hit_ms = Some(hit_time_ms);
            block.hit_points -= 1;
            info.block_hit = true;
        }

        if block.hit_points <= 0 {
            self.blocks.remove(&collider);
            physics.remove_collider(collider);
            info.block_destroyed = true;
        }
        info
    }

    #[must_use]
    pub fn is_all_bloks_destroyed(&self) -> bool {
        self.blocks.is_empty()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Remaining bloks with their colliders
    pub fn blocks(&self) -> impl Iterator<Item = (ColliderHandle, &BlockData)> {
        self.blocks.iter().map(|(&h, b)| (h, b))
    }

    /// Whether a collider is one of this level's bloks
    #[must_use]
    pub fn owns(&self, collider: ColliderHandle) -> bool {
        self.blocks.contains_key(&collider)
    }

    /// Grid glow on the bloks, driven by the flash power
    pub fn set_glow(&mut self, value: f32) {
        self.glow = Vec4::new(value, value * 0.78, value * 0.125, value);
    }

    #[must_use]
    pub fn glow(&self) -> Vec4 {
        self.glow
    }

    pub fn set_light_position(&mut self, position: Vec3) {
        self.light_position = position;
    }

    #[must_use]
    pub fn light_position(&self) -> Vec3 {
        self.light_position
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[must_use]
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    /// Remove the body and entity
    pub fn destroy(self, world: &mut World, physics: &mut Physics) {
        physics.remove_body(self.body);
        if world.despawn(self.entity).is_err() {
            log::warn!("Level entity already gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::BlockDef;

    const Z: f32 = 70.0;

    fn two_block_layout() -> LevelLayout {
        let mut layout = LevelLayout::new("test");
        layout.scale = 1.0;
        // One center blok and one outer blok
        for x in [0.0, 6.0] {
            layout.blocks.push(BlockDef {
                center: Vec3::new(x, 0.0, 0.0),
                half_extent: 0.9,
                rotation: Quat::IDENTITY,
            });
        }
        layout
    }

    fn build() -> (Level, World, Physics) {
        let mut world = World::new();
        let mut physics = Physics::new();
        let level = Level::new(
            &mut world,
            &mut physics,
            &two_block_layout(),
            Vec3::new(0.0, 0.0, Z),
            &LevelConfig::default(),
        );
        (level, world, physics)
    }

    #[test]
    fn test_hit_points_by_distance() {
        let (level, ..) = build();
        let mut points: Vec<_> = level.blocks().map(|(_, b)| b.hit_points).collect();
        points.sort_unstable();
        assert_eq!(points, vec![2, 3]);
    }

    #[test]
    fn test_default_cluster_mixes_center_and_outer_bloks() {
        let mut world = World::new();
        let mut physics = Physics::new();
        let config = LevelConfig::default();
        let level = Level::new(
            &mut world,
            &mut physics,
            &LevelLayout::default(),
            Vec3::new(0.0, 0.0, Z),
            &config,
        );

        let center = level
            .blocks()
            .filter(|(_, b)| b.hit_points == config.center_hit_points)
            .count();
        let outer = level
            .blocks()
            .filter(|(_, b)| b.hit_points == config.outer_hit_points)
            .count();
        assert!(center > 0);
        assert!(outer > 0);
        assert_eq!(center + outer, level.block_count());
    }

    #[test]
    fn test_cooldown_limits_hits() {
        let (mut level, _world, mut physics) = build();
        let outer = Vec3::new(6.9, 0.0, Z);

        let first = level.handle_ball_hit(&mut physics, outer, 1000.0);
        assert_eq!(first, HitInfo { block_hit: true, block_destroyed: false });

        // Within 300ms: ignored
        let second = level.handle_ball_hit(&mut physics, outer, 1300.0);
        assert_eq!(second, HitInfo::default());

        let third = level.handle_ball_hit(&mut physics, outer, 1301.0);
        assert_eq!(third, HitInfo { block_hit: true, block_destroyed: true });
        assert_eq!(level.block_count(), 1);
    }

    #[test]
    fn test_center_blok_needs_three_hits_and_level_clears() {
        let (mut level, world, mut physics) = build();
        let center = Vec3::new(0.5, 0.0, Z);
        let outer = Vec3::new(6.0, 0.5, Z);

        assert!(!level.handle_ball_hit(&mut physics, center, 0.0).block_destroyed);
        assert!(!level.handle_ball_hit(&mut physics, center, 400.0).block_destroyed);
        assert!(level.handle_ball_hit(&mut physics, center, 800.0).block_destroyed);

        level.handle_ball_hit(&mut physics, outer, 0.0);
        assert!(!level.is_all_bloks_destroyed());
        level.handle_ball_hit(&mut physics, outer, 1000.0);
        assert!(level.is_all_bloks_destroyed());
        assert_eq!(physics.collider_count(level.body()), 0);

        // Nothing left to hit
        assert_eq!(
            level.handle_ball_hit(&mut physics, outer, 5000.0),
            HitInfo::default()
        );
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_hit_uses_level_local_space() {
        let (mut level, _world, mut physics) = build();
        // Spin the level half a turn around z so the outer blok sits at x = -6
        physics.set_angular_velocity(level.body(), Vec3::new(0.0, 0.0, std::f32::consts::PI));
        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }
        let angle = physics.rotation(level.body()).unwrap().to_axis_angle().1;
        assert!((angle - std::f32::consts::PI).abs() < 0.2);

        let info = level.handle_ball_hit(&mut physics, Vec3::new(-6.0, 0.0, Z), 0.0);
        assert!(info.block_hit);
        let outer = level.blocks().find(|(_, b)| b.center.x > 3.0).unwrap().1;
        assert_eq!(outer.hit_points, 1);
    }

    #[test]
    fn test_glow() {
        let (mut level, mut world, mut physics) = build();
        level.set_glow(1.0);
        assert_eq!(level.glow(), Vec4::new(1.0, 0.78, 0.125, 1.0));

        level.destroy(&mut world, &mut physics);
        assert!(world.is_empty());
    }
}
