//! Game tuning loaded from RON or JSON
//!
//! Every field has a default, so a config file only needs to name the values
//! it overrides.

use std::fmt;
use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading the file
    IoError(String),
    /// File contents could not be parsed
    ParseError(String),
    /// File extension is neither `ron` nor `json`
    UnsupportedFormat(String),
    /// Parsed, but a value is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported config format: {ext}"),
            Self::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Player platform placement and swipe handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Depth of the play plane that platforms, level and pause button sit on
    pub z: f32,
    /// Platforms are mirrored into each corner at `(±x, ±y)`
    pub offset: Vec2,
    /// Press must land within this distance of the ball spawn point
    pub hit_radius: f32,
    /// Minimum time between a swipe and the next spawned ball
    pub spawn_interval_ms: f32,
    /// Added to the swipe vector so balls always lift toward the level
    pub swipe_lift: f32,
    /// Longest swipe vector accepted
    pub swipe_max_length: f32,
    /// Swipe vector to impulse multiplier
    pub swipe_impulse_scale: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            z: 70.0,
            offset: Vec2::new(16.0, 8.5),
            hit_radius: 7.0,
            spawn_interval_ms: 2000.0,
            swipe_lift: 3.0,
            swipe_max_length: 25.0,
            swipe_impulse_scale: 7.0,
        }
    }
}

/// Ball body parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    /// Linear damping while the ball rests on its platform
    pub held_damping: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 0.6,
            mass: 5.0,
            restitution: 0.9,
            held_damping: 1000.0,
        }
    }
}

/// Level body and blok durability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub block_mass: f32,
    pub block_restitution: f32,
    pub angular_damping: f32,
    /// Bloks closer than this to the level origin are center bloks
    pub center_radius: f32,
    pub center_hit_points: i32,
    pub outer_hit_points: i32,
    /// Hits on the same blok within this window count once
    pub hit_cooldown_ms: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            block_mass: 1.0,
            block_restitution: 0.5,
            angular_damping: 0.05,
            center_radius: 4.0,
            center_hit_points: 3,
            outer_hit_points: 2,
            hit_cooldown_ms: 300.0,
        }
    }
}

/// Fixed step simulation rate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub hz: f32,
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            hz: 60.0,
            max_substeps: 7,
        }
    }
}

/// Particle pool sizes and effect strengths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub explosion_pool: usize,
    pub light_pool: usize,
    /// Seed for spray randomness; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            explosion_pool: 100,
            light_pool: 100,
            seed: None,
        }
    }
}

/// Camera and the pause button that lives in its view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Pause button center on the platform plane
    pub pause_button: Vec2,
    pub pause_button_radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 120.0),
            fov_y: 2.0 * (1.0f32 / 5.0).atan(),
            near: 5.0,
            far: 1000.0,
            pause_button: Vec2::new(0.0, -8.5),
            pause_button_radius: 2.0,
        }
    }
}

/// All gameplay tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub platform: PlatformConfig,
    pub ball: BallConfig,
    pub level: LevelConfig,
    pub physics: PhysicsConfig,
    pub particles: ParticleConfig,
    pub camera: CameraConfig,
}

impl GameConfig {
    /// Load from a `.ron` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// or fails to parse
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "ron" => Self::from_ron(&contents),
            "json" => Self::from_json(&contents),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parse from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or a value is out of range
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or a value is out of range
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the simulation divides by or allocates from
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hz = self.physics.hz;
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ConfigError::Invalid(format!("physics.hz must be positive, got {hz}")));
        }
        if self.physics.max_substeps == 0 {
            return Err(ConfigError::Invalid("physics.max_substeps must be at least 1".into()));
        }
        if self.particles.explosion_pool == 0 {
            return Err(ConfigError::Invalid("particles.explosion_pool must be at least 1".into()));
        }
        if self.particles.light_pool == 0 {
            return Err(ConfigError::Invalid("particles.light_pool must be at least 1".into()));
        }
        Ok(())
    }

    /// Platform centers in corner order: Yellow, Red, Blue, Green
    #[must_use]
    pub fn platform_positions(&self) -> [Vec3; 4] {
        let Vec2 { x, y } = self.platform.offset;
        let z = self.platform.z;
        [
            Vec3::new(x, y, z),
            Vec3::new(-x, y, z),
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
        ]
    }

    /// Length of one physics substep in milliseconds
    #[must_use]
    pub fn substep_ms(&self) -> f32 {
        1000.0 / self.physics.hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.platform.z, 70.0);
        assert_eq!(config.level.center_hit_points, 3);
        assert_eq!(config.physics.max_substeps, 7);
        assert!((config.substep_ms() - 16.666_666).abs() < 1e-3);
        assert_eq!(config.platform_positions()[2], Vec3::new(-16.0, -8.5, 70.0));
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = GameConfig::from_ron("(ball: (mass: 8.0), physics: (hz: 120.0))").unwrap();
        assert_eq!(config.ball.mass, 8.0);
        assert_eq!(config.ball.radius, 0.6);
        assert_eq!(config.physics.hz, 120.0);
        assert_eq!(config.physics.max_substeps, 7);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            GameConfig::from_json(r#"{ "level": { "hit_cooldown_ms": 500.0 } }"#).unwrap();
        assert_eq!(config.level.hit_cooldown_ms, 500.0);
        assert_eq!(config.level.outer_hit_points, 2);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(matches!(
            GameConfig::from_ron("(physics: (hz: 0.0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_ron("(physics: (hz: -30.0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_ron("(particles: (light_pool: 0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "particles": { "explosion_pool": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "physics": { "max_substeps": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(
            GameConfig::from_json("{ nope"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            GameConfig::load("/definitely/not/here.ron"),
            Err(ConfigError::IoError(_))
        ));
    }
}
