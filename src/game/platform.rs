//! Player platforms: spawn balls and turn swipes into impulses

use glam::Vec3;
use hecs::Entity;

use super::ball::{Ball, BallColor, spawn_ball};
use super::score::ScoreDisplay;
use crate::core::{BallConfig, PlatformConfig};
use crate::ecs::{PhysicsBody, World};
use crate::input::PointerId;
use crate::physics::Physics;

/// Impulse for a swipe from `press` to `release`, both on the platform plane
///
/// The ball follows the swipe across the screen. A small lift keeps every
/// throw heading toward the level.
#[must_use]
pub fn swipe_impulse(press: Vec3, release: Vec3, config: &PlatformConfig) -> Vec3 {
    let direction = (press - release + Vec3::new(0.0, 0.0, config.swipe_lift))
        .clamp_length_max(config.swipe_max_length);
    Vec3::new(-direction.x, -direction.y, direction.z) * config.swipe_impulse_scale
}

/// One player's corner pad
#[derive(Debug, Clone)]
pub struct Platform {
    index: usize,
    position: Vec3,
    ball_spawn: Vec3,
    color: BallColor,
    config: PlatformConfig,
    /// Resting ball, forgotten once swiped
    ball: Option<Entity>,
    /// Milliseconds since the last spawn
    spawn_timer_ms: f32,
    pressed: bool,
    pointer: Option<PointerId>,
    press_position: Vec3,
    score: u32,
}

impl Platform {
    pub fn new(index: usize, position: Vec3, color: BallColor, config: PlatformConfig) -> Self {
        let mut platform = Self {
            index,
            position,
            ball_spawn: position + Vec3::Z,
            color,
            config,
            ball: None,
            spawn_timer_ms: 0.0,
            pressed: false,
            pointer: None,
            press_position: Vec3::ZERO,
            score: 0,
        };
        platform.reset_ball_creation_time();
        platform
    }

    /// Spawn a ball once the interval has passed since the last one. The
    /// timer does not run while a ball is resting.
    pub fn spawn_ball_if_required(
        &mut self,
        dt_ms: f32,
        world: &mut World,
        physics: &mut Physics,
        ball_config: &BallConfig,
    ) -> Option<Entity> {
        if self.ball.is_some() {
            return None;
        }
        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms <= self.config.spawn_interval_ms {
            return None;
        }
        self.spawn_timer_ms = 0.0;
        let entity = spawn_ball(
            world,
            physics,
            ball_config,
            self.ball_spawn,
            self.index,
            self.color,
        );
        self.ball = Some(entity);
        Some(entity)
    }

    /// Make the next `spawn_ball_if_required` spawn immediately
    pub fn reset_ball_creation_time(&mut self) {
        self.spawn_timer_ms = self.config.spawn_interval_ms + 1.0;
    }

    /// Forget the resting ball (it was destroyed elsewhere)
    pub fn remove_ball(&mut self) {
        self.ball = None;
        self.pressed = false;
        self.pointer = None;
    }

    /// Whether a point on the platform plane is close enough to grab the ball
    #[must_use]
    pub fn hit_test(&self, pos: Vec3) -> bool {
        self.ball_spawn.distance(pos) < self.config.hit_radius
    }

    /// Start a swipe. Needs a resting ball under the pointer.
    pub fn handle_press(&mut self, pos: Vec3, pointer: PointerId) -> bool {
        if self.ball.is_none() || !self.hit_test(pos) {
            return false;
        }
        self.pointer = Some(pointer);
        self.pressed = true;
        self.press_position = pos;
        true
    }

    /// Finish a swipe started by the same pointer and launch the ball.
    ///
    /// Returns the applied impulse.
    pub fn handle_release(
        &mut self,
        pos: Vec3,
        pointer: PointerId,
        world: &mut World,
        physics: &mut Physics,
    ) -> Option<Vec3> {
        let ball = self.ball?;
        if !self.pressed || self.pointer != Some(pointer) {
            return None;
        }
        self.pressed = false;
        self.pointer = None;
        self.ball = None;

        let impulse = swipe_impulse(self.press_position, pos, &self.config);
        if let Ok(mut component) = world.get_mut::<Ball>(ball) {
            component.held = false;
        }
        if let Ok(body) = world.get::<PhysicsBody>(ball).map(|b| b.0) {
            physics.set_linear_damping(body, 0.0);
            physics.apply_impulse(body, impulse);
        }
        Some(impulse)
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    #[must_use]
    pub fn score_display(&self) -> ScoreDisplay {
        ScoreDisplay::from_score(self.score)
    }

    /// Where the score digits sit: offset toward the screen center
    #[must_use]
    pub fn score_anchor(&self) -> Vec3 {
        let toward_center = Vec3::new(
            -self.position.x.signum() * 1.5,
            -self.position.y.signum() * 1.5,
            0.0,
        );
        self.position + toward_center
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn ball_spawn_position(&self) -> Vec3 {
        self.ball_spawn
    }

    #[must_use]
    pub fn color(&self) -> BallColor {
        self.color
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn resting_ball(&self) -> Option<Entity> {
        self.ball
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Platform, World, Physics, BallConfig) {
        let platform = Platform::new(
            0,
            Vec3::new(16.0, 8.5, 70.0),
            BallColor::Yellow,
            PlatformConfig::default(),
        );
        (platform, World::new(), Physics::new(), BallConfig::default())
    }

    #[test]
    fn test_first_spawn_is_immediate_then_waits() {
        let (mut platform, mut world, mut physics, ball) = setup();

        let first = platform.spawn_ball_if_required(16.0, &mut world, &mut physics, &ball);
        assert!(first.is_some());
        assert_eq!(platform.resting_ball(), first);

        // Never while one rests
        assert!(
            platform
                .spawn_ball_if_required(5000.0, &mut world, &mut physics, &ball)
                .is_none()
        );

        let spawn = platform.ball_spawn_position();
        assert!(platform.handle_press(spawn, PointerId::Mouse));
        assert!(
            platform
                .handle_release(spawn, PointerId::Mouse, &mut world, &mut physics)
                .is_some()
        );
        assert!(platform.resting_ball().is_none());

        assert!(
            platform
                .spawn_ball_if_required(1999.0, &mut world, &mut physics, &ball)
                .is_none()
        );
        assert!(
            platform
                .spawn_ball_if_required(2.0, &mut world, &mut physics, &ball)
                .is_some()
        );
    }

    #[test]
    fn test_press_needs_ball_and_hit() {
        let (mut platform, mut world, mut physics, ball) = setup();
        let spawn = platform.ball_spawn_position();
        assert!(!platform.handle_press(spawn, PointerId::Mouse));

        platform.spawn_ball_if_required(0.0, &mut world, &mut physics, &ball);
        assert!(!platform.hit_test(spawn + Vec3::new(7.0, 0.0, 0.0)));
        assert!(!platform.handle_press(spawn + Vec3::new(0.0, 7.5, 0.0), PointerId::Mouse));
        assert!(platform.handle_press(spawn + Vec3::new(0.0, 6.5, 0.0), PointerId::Touch(3)));
    }

    #[test]
    fn test_release_needs_same_pointer() {
        let (mut platform, mut world, mut physics, ball) = setup();
        let entity = platform
            .spawn_ball_if_required(0.0, &mut world, &mut physics, &ball)
            .unwrap();
        let spawn = platform.ball_spawn_position();

        assert!(platform.handle_press(spawn, PointerId::Touch(1)));
        assert!(
            platform
                .handle_release(spawn, PointerId::Touch(2), &mut world, &mut physics)
                .is_none()
        );
        assert!(platform.is_pressed());

        let impulse = platform
            .handle_release(spawn, PointerId::Touch(1), &mut world, &mut physics)
            .unwrap();
        assert_eq!(impulse, Vec3::new(0.0, 0.0, 21.0));
        assert!(!world.get::<Ball>(entity).unwrap().held);
    }

    #[test]
    fn test_swipe_is_clamped() {
        let config = PlatformConfig::default();
        let press = Vec3::new(0.0, 0.0, 71.0);

        let short = swipe_impulse(press, press + Vec3::new(2.0, -1.0, 0.0), &config);
        assert_eq!(short, Vec3::new(14.0, -7.0, 21.0));

        let long = swipe_impulse(press, press + Vec3::new(100.0, 0.0, 0.0), &config);
        assert!((long.length() - 25.0 * 7.0).abs() < 1e-3);
        assert!(long.x > 0.0 && long.z > 0.0);
    }

    #[test]
    fn test_scores() {
        let (mut platform, ..) = setup();
        assert_eq!(platform.score_display().text(), "  0");
        platform.add_score(1);
        platform.add_score(11);
        assert_eq!(platform.score(), 12);
        assert_eq!(platform.score_display().text(), " 12");
        platform.reset_score();
        assert_eq!(platform.score(), 0);
        assert_eq!(platform.score_anchor(), Vec3::new(14.5, 7.0, 70.0));
    }
}
