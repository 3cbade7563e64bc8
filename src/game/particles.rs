//! Pooled particle systems for blok explosions and light flares
//!
//! Explosion particles fly to the platform of the player who hit the blok and
//! carry one point there. Light particles are short lived flares sprayed when
//! a blok is destroyed.

use glam::{Quat, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Squared distance at which a particle counts as having reached its aim
const TARGET_REACH_SQR_DISTANCE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Faceted cube tinted with the hitting ball's color
    Explosion,
    /// Flat glowing pane
    Light,
}

impl ParticleKind {
    /// Edge length of the rendered shape
    #[must_use]
    pub fn size(self) -> f32 {
        match self {
            Self::Explosion => 0.6,
            Self::Light => 4.0,
        }
    }

    fn initial_lifetime(self, rng: &mut StdRng) -> f32 {
        match self {
            // Lives until it reaches its aim
            Self::Explosion => 10000.0,
            Self::Light => 0.5 + f32::from(rng.r#gen::<u8>()) / 512.0,
        }
    }

    fn friction(self) -> f32 {
        match self {
            Self::Explosion => 0.55,
            Self::Light => 0.0,
        }
    }

    fn rotation_max(self) -> f32 {
        2.0
    }
}

/// Emission parameters for [`ParticleSystem::spray`]
#[derive(Debug, Clone, Copy)]
pub struct Spray {
    pub count: usize,
    pub position: Vec3,
    pub direction: Vec3,
    /// Radius of the random offset added to the position
    pub position_random: f32,
    /// Radius of the random offset added to the direction
    pub direction_random: f32,
    pub aim: Vec3,
    /// Pull toward `aim`; zero disables aiming
    pub aim_power: f32,
    pub color: Vec4,
    /// Platform that receives a point when the particle reaches its aim
    pub owner: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec3,
    pub direction: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    /// Degrees per second
    pub rotation_rate: Vec3,
    pub friction: f32,
    pub mass: f32,
    /// Seconds left; the particle is inactive at zero or below
    pub lifetime: f32,
    pub aim: Vec3,
    pub aim_power: f32,
    pub owner: Option<usize>,
    pub color: Vec4,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::ZERO,
            rotation: Vec3::ZERO,
            rotation_rate: Vec3::ZERO,
            friction: 0.0,
            mass: 1.0,
            lifetime: 0.0,
            aim: Vec3::ZERO,
            aim_power: 0.0,
            owner: None,
            color: Vec4::ONE,
        }
    }
}

impl Particle {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifetime > 0.0
    }

    /// Rendered scale, shrinking over the last half second of life
    #[must_use]
    pub fn scale(&self) -> f32 {
        (self.lifetime * 2.0).min(1.0)
    }

    /// Orientation built from the X, Y then Z rotations
    #[must_use]
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_x(self.rotation.x.to_radians())
            * Quat::from_rotation_y(self.rotation.y.to_radians())
            * Quat::from_rotation_z(self.rotation.z.to_radians())
    }

    /// Deactivate and drop any carried point
    pub fn reset(&mut self) {
        self.lifetime = 0.0;
        self.owner = None;
    }

    /// Integrate one step. Returns true when the aim was reached this step.
    fn integrate(&mut self, dt: f32) -> bool {
        self.lifetime -= dt;

        let step = self.direction * dt;
        self.position += step;
        self.direction -= step * self.friction;
        self.rotation += self.rotation_rate * dt;

        if self.aim_power <= 0.0 {
            return false;
        }
        let to_aim = self.aim - self.position;
        let sqr_distance = to_aim.length_squared();
        let power = self.aim_power * 2.0 / (sqr_distance * 0.01 + 1.0);
        self.direction += to_aim * (power * dt);
        sqr_distance < TARGET_REACH_SQR_DISTANCE
    }
}

/// Fixed pool of particles of one kind
#[derive(Debug)]
pub struct ParticleSystem {
    kind: ParticleKind,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    /// Create a pool of `capacity` inactive particles
    pub fn new(kind: ParticleKind, capacity: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            kind,
            particles: vec![Particle::default(); capacity],
            rng,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    /// Activate up to `spray.count` particles from the pool
    pub fn spray(&mut self, spray: &Spray) {
        for _ in 0..spray.count {
            let Some(index) = self.particles.iter().position(|p| !p.is_active()) else {
                log::warn!(
                    "Discarding {:?} spray: no free particles in the pool",
                    self.kind
                );
                return;
            };

            let offset = self.random_unit();
            let lifetime = self.kind.initial_lifetime(&mut self.rng);
            let (rotation, rotation_rate) = self.random_rotation(self.kind.rotation_max());

            let particle = &mut self.particles[index];
            particle.position = spray.position + offset * spray.position_random;
            particle.direction = spray.direction + offset * spray.direction_random;
            particle.lifetime = lifetime;
            particle.mass = 1.0;
            particle.friction = self.kind.friction();
            particle.rotation = rotation;
            particle.rotation_rate = rotation_rate;
            particle.aim = spray.aim;
            particle.aim_power = spray.aim_power;
            particle.owner = spray.owner;
            particle.color = spray.color;
        }
    }

    /// Advance every active particle by `dt` seconds.
    ///
    /// Returns the platforms that received a point during this update, one
    /// entry per delivered point.
    pub fn update(&mut self, dt: f32) -> Vec<usize> {
        let mut scored = Vec::new();
        for particle in self.particles.iter_mut().filter(|p| p.is_active()) {
            if !particle.integrate(dt) || self.kind != ParticleKind::Explosion {
                continue;
            }
            if let Some(owner) = particle.owner.take() {
                scored.push(owner);
            }
            if particle.lifetime > 2.0 {
                particle.lifetime = 1.0;
            }
        }
        scored
    }

    #[must_use]
    pub fn any_active(&self) -> bool {
        self.particles.iter().any(Particle::is_active)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_active()).count()
    }

    pub fn reset_all(&mut self) {
        self.particles.iter_mut().for_each(Particle::reset);
    }

    pub fn active(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_active())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    fn random_unit(&mut self) -> Vec3 {
        let mut component = || f32::from(self.rng.r#gen::<u8>()) - 128.0;
        Vec3::new(component(), component(), component()).normalize_or_zero()
    }

    fn random_rotation(&mut self, max_speed: f32) -> (Vec3, Vec3) {
        let mut angle = || f32::from(self.rng.r#gen::<u8>()) / 128.0 * std::f32::consts::PI;
        let rotation = Vec3::new(angle(), angle(), angle());
        let mut rate = || max_speed * (f32::from(self.rng.r#gen::<u8>()) - 128.0) * max_speed;
        let rotation_rate = Vec3::new(rate(), rate(), rate());
        (rotation, rotation_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explosion_at(position: Vec3, aim: Vec3, owner: Option<usize>) -> Spray {
        Spray {
            count: 1,
            position,
            direction: Vec3::ZERO,
            position_random: 0.0,
            direction_random: 0.0,
            aim,
            aim_power: 3.0,
            color: Vec4::ONE,
            owner,
        }
    }

    #[test]
    fn test_pool_exhaustion_discards() {
        let mut system = ParticleSystem::new(ParticleKind::Explosion, 3, Some(1));
        let mut spray = explosion_at(Vec3::ZERO, Vec3::ZERO, None);
        spray.count = 5;
        system.spray(&spray);
        assert_eq!(system.active_count(), 3);
    }

    #[test]
    fn test_explosion_awards_exactly_one_point() {
        let mut system = ParticleSystem::new(ParticleKind::Explosion, 4, Some(7));
        let target = Vec3::new(16.0, 8.5, 60.0);
        system.spray(&explosion_at(target + Vec3::X, target, Some(2)));

        let first = system.update(0.016);
        assert_eq!(first, vec![2]);
        // Fading out now
        let particle = system.active().next().unwrap();
        assert!(particle.lifetime <= 1.0);
        assert!(particle.owner.is_none());

        let mut later = Vec::new();
        while system.any_active() {
            later.extend(system.update(0.1));
        }
        assert!(later.is_empty());
    }

    #[test]
    fn test_far_particle_is_pulled_toward_aim() {
        let mut system = ParticleSystem::new(ParticleKind::Explosion, 1, Some(3));
        system.spray(&explosion_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 50.0), Some(0)));
        assert!(system.update(0.016).is_empty());

        let particle = system.active().next().unwrap();
        assert!(particle.direction.z > 0.0);
        assert_eq!(particle.owner, Some(0));
    }

    #[test]
    fn test_light_lifetime_and_scale() {
        let mut system = ParticleSystem::new(ParticleKind::Light, 10, Some(11));
        system.spray(&Spray {
            count: 4,
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, 16.0),
            position_random: 0.1,
            direction_random: 16.0,
            aim: Vec3::new(0.0, 0.0, 35.0),
            aim_power: 10.0,
            color: Vec4::ONE,
            owner: None,
        });

        for particle in system.active() {
            assert!((0.5..1.0).contains(&particle.lifetime));
            assert_eq!(particle.scale(), 1.0);
            assert!(particle.position.length() <= 0.1 + 1e-5);
        }
        assert_eq!(system.active_count(), 4);

        system.update(1.0);
        assert!(!system.any_active());
    }

    #[test]
    fn test_reset_all_drops_carried_points() {
        let mut system = ParticleSystem::new(ParticleKind::Explosion, 2, Some(5));
        system.spray(&explosion_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 50.0), Some(1)));
        system.reset_all();
        assert!(!system.any_active());
        assert!(system.particles.iter().all(|p| p.owner.is_none()));
    }
}
