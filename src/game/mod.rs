//! Gameplay
//!
//! [`GameSession`] owns the simulation and knows nothing about windows;
//! [`BloksGame`] wires it to the engine, menus and audio.

mod app;
mod ball;
mod black_hole;
mod level;
mod particles;
mod pause_button;
mod platform;
mod score;
mod session;

pub use app::BloksGame;
pub use ball::{Ball, BallColor};
pub use black_hole::{BlackHole, BlackHoleTag};
pub use level::{BlockData, HitInfo, Level, LevelTag};
pub use particles::{Particle, ParticleKind, ParticleSystem, Spray};
pub use pause_button::{PauseButton, PauseInput};
pub use platform::{Platform, swipe_impulse};
pub use score::{ScoreDisplay, ScoreEntry, ScoreModel};
pub use session::GameSession;
