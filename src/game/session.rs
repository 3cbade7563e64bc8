//! One game in progress: physics, level, balls, platforms and particles
//!
//! The session knows nothing about windows, menus or audio. It consumes
//! pointer events already in window pixels, reports what happened through
//! the [`EventQueue`], and exposes read-only state for rendering.

use glam::{Vec2, Vec3, Vec4};
use hecs::Entity;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::ball::{Ball, BallColor, apply_gravity, destroy_ball};
use super::black_hole::BlackHole;
use super::level::Level;
use super::particles::{ParticleKind, ParticleSystem, Spray};
use super::pause_button::{PauseButton, PauseInput};
use super::platform::Platform;
use super::score::{ScoreEntry, ScoreModel};
use crate::assets::LevelLayout;
use crate::core::{EventQueue, GameConfig, GameEvent};
use crate::ecs::{PhysicsBody, Transform, World, entity_from_user_data};
use crate::input::{PointerEvent, PointerId, PointerPhase};
use crate::physics::{ColliderHandle, CollisionKind, ContactPoint, Physics};
use crate::renderer::Camera;

/// Corner order matches [`GameConfig::platform_positions`]
const PLATFORM_COLORS: [BallColor; 4] = [
    BallColor::Yellow,
    BallColor::Red,
    BallColor::Blue,
    BallColor::Green,
];

/// Where the light sits before the first hit
const INITIAL_LIGHT_POSITION: Vec3 = Vec3::new(20.0, 20.0, -25.0);

pub struct GameSession {
    config: GameConfig,
    layout: LevelLayout,
    world: World,
    physics: Physics,
    camera: Camera,
    level: Option<Level>,
    black_hole: BlackHole,
    platforms: Vec<Platform>,
    pause_button: PauseButton,
    explosions: ParticleSystem,
    lights: ParticleSystem,
    light_position: Vec3,
    light_target: Vec3,
    flash_power: f32,
    /// Simulated time, advanced one substep at a time
    clock_ms: f64,
    /// Frame time not yet consumed by substeps
    accumulator_ms: f32,
    /// Last computed `(speed, power)` for the wind sound
    wind: Vec2,
}

impl GameSession {
    /// Create a session with no level loaded
    pub fn new(config: GameConfig, layout: LevelLayout) -> Self {
        let mut world = World::new();
        let mut physics = Physics::new();
        let black_hole = BlackHole::new(&mut world, &mut physics);

        let platforms = config
            .platform_positions()
            .into_iter()
            .zip(PLATFORM_COLORS)
            .enumerate()
            .map(|(index, (position, color))| {
                Platform::new(index, position, color, config.platform.clone())
            })
            .collect();

        let pause_button = PauseButton::new(
            config.camera.pause_button.extend(config.platform.z),
            config.camera.pause_button_radius,
        );

        let camera = Camera::look_at(config.camera.eye, Vec3::ZERO, Vec3::Y).with_frustum(
            config.camera.fov_y,
            config.camera.near,
            config.camera.far,
        );

        let seed = config.particles.seed;
        let explosions =
            ParticleSystem::new(ParticleKind::Explosion, config.particles.explosion_pool, seed);
        let lights = ParticleSystem::new(
            ParticleKind::Light,
            config.particles.light_pool,
            seed.map(|s| s.wrapping_add(1)),
        );

        Self {
            config,
            layout,
            world,
            physics,
            camera,
            level: None,
            black_hole,
            platforms,
            pause_button,
            explosions,
            lights,
            light_position: INITIAL_LIGHT_POSITION,
            light_target: INITIAL_LIGHT_POSITION,
            flash_power: 0.0,
            clock_ms: 0.0,
            accumulator_ms: 0.0,
            wind: Vec2::ZERO,
        }
    }

    /// Start a new game: fresh level, no balls, zero scores
    pub fn load_level(&mut self) {
        if let Some(level) = self.level.take() {
            level.destroy(&mut self.world, &mut self.physics);
        }
        let position = Vec3::new(0.0, 0.0, self.config.platform.z);
        self.level = Some(Level::new(
            &mut self.world,
            &mut self.physics,
            &self.layout,
            position,
            &self.config.level,
        ));

        let balls: Vec<Entity> = self.world.query::<&Ball>().iter().map(|(e, _)| e).collect();
        for entity in balls {
            destroy_ball(&mut self.world, &mut self.physics, entity);
        }

        for platform in &mut self.platforms {
            platform.reset_score();
            platform.reset_ball_creation_time();
            platform.remove_ball();
        }

        // Points carried from the previous game must not land in this one
        self.explosions.reset_all();
        self.accumulator_ms = 0.0;
        log::info!("New game started");
    }

    /// Advance the game by one frame.
    ///
    /// Returns the final scores when the game ended during this frame.
    pub fn update(&mut self, dt_ms: f32, events: &mut EventQueue) -> Option<ScoreModel> {
        for platform in &mut self.platforms {
            if platform
                .spawn_ball_if_required(dt_ms, &mut self.world, &mut self.physics, &self.config.ball)
                .is_some()
            {
                events.push(GameEvent::BallSpawned {
                    platform: platform.index(),
                });
            }
        }

        self.light_position += (self.light_target - self.light_position) * dt_ms * 0.002;
        self.flash_power -= self.flash_power * dt_ms * 0.004;

        self.black_hole.rotate(dt_ms);

        let dt = dt_ms * 0.001;
        for index in self.explosions.update(dt) {
            if let Some(platform) = self.platforms.get_mut(index) {
                platform.add_score(1);
                events.push(GameEvent::PointScored {
                    platform: index,
                    score: platform.score(),
                });
            }
        }
        self.lights.update(dt);

        self.step_physics(dt_ms, events);
        self.sync_transforms();

        if let Some(level) = self.level.as_mut() {
            level.set_glow(self.flash_power);
            level.set_light_position(self.light_position);
        }

        self.wind = self.compute_wind();
        self.check_end_of_game(events)
    }

    /// Run fixed substeps for the frame's time, at most `max_substeps`.
    /// Time beyond that is dropped so a long stall cannot snowball.
    fn step_physics(&mut self, dt_ms: f32, events: &mut EventQueue) {
        let substep_ms = self.config.substep_ms();
        let max_substeps = self.config.physics.max_substeps;
        self.accumulator_ms += dt_ms;

        let mut steps = 0;
        while self.accumulator_ms >= substep_ms {
            if steps == max_substeps {
                self.accumulator_ms %= substep_ms;
                break;
            }
            self.apply_ball_gravity();
            self.physics.step(substep_ms * 0.001);
            self.clock_ms += f64::from(substep_ms);
            self.simulate_sub_step(events);
            self.accumulator_ms -= substep_ms;
            steps += 1;
        }
    }

    fn apply_ball_gravity(&mut self) {
        let released: SmallVec<[_; 8]> = self
            .world
            .query::<(&Ball, &PhysicsBody)>()
            .iter()
            .filter(|(_, (ball, _))| !ball.held)
            .map(|(_, (_, body))| body.0)
            .collect();
        for body in released {
            apply_gravity(&mut self.physics, body);
        }
    }

    /// Resolve the contacts of the last substep.
    ///
    /// Ball against blok chips the blok and sprays particles. Ball against
    /// the black hole destroys the ball once all contacts are processed, so
    /// a ball touching in several points goes away exactly once.
    pub fn simulate_sub_step(&mut self, events: &mut EventQueue) {
        let mut lost: FxHashSet<Entity> = FxHashSet::default();

        for contact in self.physics.contacts() {
            let kind_a = self.physics.collider_kind(contact.collider_a);
            let kind_b = self.physics.collider_kind(contact.collider_b);

            match (kind_a, kind_b) {
                (Some(CollisionKind::Ball), Some(CollisionKind::Blok)) => {
                    self.ball_hit_blok(contact.collider_a, contact.collider_b, &contact, true, events);
                }
                (Some(CollisionKind::Blok), Some(CollisionKind::Ball)) => {
                    self.ball_hit_blok(contact.collider_b, contact.collider_a, &contact, false, events);
                }
                (Some(CollisionKind::Ball), Some(CollisionKind::BlackHole)) => {
                    lost.extend(self.ball_entity(contact.collider_a));
                }
                (Some(CollisionKind::BlackHole), Some(CollisionKind::Ball)) => {
                    lost.extend(self.ball_entity(contact.collider_b));
                }
                _ => {}
            }
        }

        for entity in lost {
            self.remove_ball(entity, events);
        }
    }

    fn ball_entity(&self, collider: ColliderHandle) -> Option<Entity> {
        self.physics
            .collider_user_data(collider)
            .and_then(entity_from_user_data)
    }

    /// `ball_is_a` tells which side of the contact the ball is on; the
    /// spray direction always points from the blok toward the ball.
    fn ball_hit_blok(
        &mut self,
        ball_collider: ColliderHandle,
        blok_collider: ColliderHandle,
        contact: &ContactPoint,
        ball_is_a: bool,
        events: &mut EventQueue,
    ) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        if !level.owns(blok_collider) {
            return;
        }
        let Some(ball) = self
            .physics
            .collider_user_data(ball_collider)
            .and_then(entity_from_user_data)
            .and_then(|e| self.world.get::<Ball>(e).ok().map(|b| *b))
        else {
            return;
        };

        let info = level.handle_ball_hit(&mut self.physics, contact.point, self.clock_ms);
        if !info.block_hit {
            return;
        }

        let pos = contact.point;
        let normal = if ball_is_a { -contact.normal } else { contact.normal };
        let color = ball.color.rgba();
        self.light_target = Vec3::new(pos.x * 3.0, pos.y * 3.0, -45.0);
        self.flash_power = 0.3;

        if let Some(platform) = self.platforms.get(ball.platform) {
            // Aim a little in front of the platform
            let aim = platform.position() - Vec3::new(0.0, 0.0, 10.0);
            self.explosions.spray(&Spray {
                count: 1,
                position: pos,
                direction: normal * 7.0,
                position_random: 0.1,
                direction_random: 7.0,
                aim,
                aim_power: 3.0,
                color,
                owner: Some(ball.platform),
            });
        }

        if info.block_destroyed {
            self.lights.spray(&Spray {
                count: 4,
                position: pos,
                direction: Vec3::new(0.0, 0.0, 16.0),
                position_random: 0.1,
                direction_random: 16.0,
                aim: Vec3::new(0.0, 0.0, self.config.platform.z / 2.0),
                aim_power: 10.0,
                color,
                owner: None,
            });
            self.flash_power = 1.0;
        }

        events.push(GameEvent::BlockHit {
            point: pos,
            platform: ball.platform,
            destroyed: info.block_destroyed,
        });
    }

    fn remove_ball(&mut self, entity: Entity, events: &mut EventQueue) {
        let Some(platform) = self.world.get::<Ball>(entity).ok().map(|b| b.platform) else {
            return;
        };
        if let Some(owner) = self.platforms.get_mut(platform) {
            if owner.resting_ball() == Some(entity) {
                owner.remove_ball();
            }
        }
        destroy_ball(&mut self.world, &mut self.physics, entity);
        events.push(GameEvent::BallLost { platform });
    }

    fn sync_transforms(&mut self) {
        for (_, (transform, body)) in self.world.query_mut::<(&mut Transform, &PhysicsBody)>() {
            if let Some(position) = self.physics.position(body.0) {
                transform.position = position;
            }
            if let Some(rotation) = self.physics.rotation(body.0) {
                transform.rotation = rotation;
            }
        }
    }

    /// Wind sound parameters from how fast and how "straight" the level spins
    fn compute_wind(&self) -> Vec2 {
        let Some(level) = self.level.as_ref() else {
            return Vec2::ZERO;
        };
        let (Some(angular), Some(rotation)) = (
            self.physics.angular_velocity(level.body()),
            self.physics.rotation(level.body()),
        ) else {
            return Vec2::ZERO;
        };

        let speed = angular.abs().element_sum();
        let (axis, _) = rotation.to_axis_angle();
        let a = axis.normalize_or_zero().abs();
        // High when the level spins around one of the main axes
        let value = a.x * (1.0 - a.y) * (1.0 - a.z)
            + a.y * (1.0 - a.x) * (1.0 - a.z)
            + a.z * (1.0 - a.y) * (1.0 - a.x);

        Vec2::new(speed / 8.0 + value / 8.0, value)
    }

    /// End the game once every blok is gone and every point delivered.
    ///
    /// Drops the level and returns the final scores, highest first.
    pub fn check_end_of_game(&mut self, events: &mut EventQueue) -> Option<ScoreModel> {
        let level = self.level.as_ref()?;
        if !level.is_all_bloks_destroyed() || self.explosions.any_active() {
            return None;
        }

        let mut scores = ScoreModel::default();
        scores.set_scores(self.platforms.iter().map(|p| ScoreEntry {
            score: p.score(),
            color: p.color(),
        }));

        if let Some(level) = self.level.take() {
            level.destroy(&mut self.world, &mut self.physics);
        }
        self.wind = Vec2::ZERO;
        events.push(GameEvent::LevelCleared);
        log::info!("Level cleared");
        Some(scores)
    }

    /// Route a pointer event to the pause button and platforms.
    ///
    /// Mouse presses on the pause button stop there. Releases and every other
    /// press reach all platforms. Returns true when the pause button was
    /// clicked.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        viewport: Vec2,
        events: &mut EventQueue,
    ) -> bool {
        let mut paused = false;

        if event.id == PointerId::Mouse {
            let plane_z = self.pause_button.position().z;
            let pos = self.map_2d_point_to_z_plane(event.position, viewport, plane_z);
            match event.phase {
                PointerPhase::Pressed => {
                    if self.pause_button.handle_press(pos) == PauseInput::Pressed {
                        return false;
                    }
                }
                PointerPhase::Released => {
                    paused = self.pause_button.handle_release(pos) == PauseInput::Clicked;
                }
            }
        }

        for platform in &mut self.platforms {
            let plane_z = platform.ball_spawn_position().z;
            let pos = self
                .camera
                .map_2d_point_to_z_plane(event.position, viewport, plane_z);
            match event.phase {
                PointerPhase::Pressed => {
                    platform.handle_press(pos, event.id);
                }
                PointerPhase::Released => {
                    if let Some(impulse) =
                        platform.handle_release(pos, event.id, &mut self.world, &mut self.physics)
                    {
                        events.push(GameEvent::BallLaunched {
                            platform: platform.index(),
                            impulse,
                        });
                    }
                }
            }
        }
        paused
    }

    /// World point under a window pixel on the plane `z = plane_z`
    #[must_use]
    pub fn map_2d_point_to_z_plane(&self, screen: Vec2, viewport: Vec2, plane_z: f32) -> Vec3 {
        self.camera.map_2d_point_to_z_plane(screen, viewport, plane_z)
    }

    /// Keep the projection in step with the window
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Balls with their transform and color, for drawing
    pub fn balls(&self) -> Vec<(Transform, Vec4)> {
        self.world
            .query::<(&Ball, &Transform)>()
            .iter()
            .map(|(_, (ball, transform))| (*transform, ball.color.rgba()))
            .collect()
    }

    /// Transform of the level body
    #[must_use]
    pub fn level_transform(&self) -> Option<Transform> {
        let level = self.level.as_ref()?;
        self.world.get::<Transform>(level.entity()).ok().map(|t| *t)
    }

    #[must_use]
    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    #[must_use]
    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    #[must_use]
    pub fn black_hole(&self) -> &BlackHole {
        &self.black_hole
    }

    #[must_use]
    pub fn pause_button(&self) -> &PauseButton {
        &self.pause_button
    }

    #[must_use]
    pub fn explosions(&self) -> &ParticleSystem {
        &self.explosions
    }

    #[must_use]
    pub fn lights(&self) -> &ParticleSystem {
        &self.lights
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn light_position(&self) -> Vec3 {
        self.light_position
    }

    #[must_use]
    pub fn flash_power(&self) -> f32 {
        self.flash_power
    }

    /// `(speed, power)` for [`crate::audio::AudioManager::apply_wind_effect`]
    #[must_use]
    pub fn wind(&self) -> Vec2 {
        self.wind
    }

    #[must_use]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
