//! Black Hole Bloks, a four-player 3D breakout game
//!
//! Players swipe balls from their corner platforms into a spinning cluster of
//! bloks floating above a black hole. The crate provides:
//! - A winit/wgpu frame loop and renderer
//! - Rigid-body simulation with rapier3d
//! - The gameplay session (level, balls, platforms, particles, scoring)
//! - Menus drawn with a tiny pixel font
//! - Level layouts in RON/JSON, with an offline glTF importer

pub mod assets;
pub mod audio;
pub mod core;
pub mod ecs;
pub mod game;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod ui;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;
pub use wgpu;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::LevelLayout;
    pub use crate::core::{
        DebugInfo, Engine, EngineConfig, EngineContext, EventQueue, FrameStats, Game, GameConfig,
        GameEvent,
    };
    pub use crate::game::{BallColor, BloksGame, GameSession};
    pub use crate::input::{Input, PointerEvent, PointerId, PointerPhase};
    pub use crate::physics::{ColliderHandle, Physics, RigidBodyHandle};
    pub use crate::renderer::{Camera, Light, Material, Renderer, SceneView};
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
