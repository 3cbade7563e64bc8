//! Core engine module
//!
//! Contains the main Engine struct, frame timing, game tuning and events

mod config;
mod debug;
mod engine;
mod events;
mod time;

pub use config::{
    BallConfig, CameraConfig, ConfigError, GameConfig, LevelConfig, ParticleConfig,
    PhysicsConfig, PlatformConfig,
};
pub use debug::{DebugInfo, FrameStats};
pub use engine::{Engine, EngineConfig, EngineContext, Game};
pub use events::{EventQueue, GameEvent};
pub use time::Time;
