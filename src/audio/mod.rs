//! Audio system for the hit click and the wind loop
//!
//! Built on top of the rodio audio library. Missing sound files are replaced
//! by synthesized tones and a missing output device leaves the game silent.

mod manager;
mod source;

pub use manager::{AudioManager, wind_parameters};
pub use source::{AudioError, AudioSource, SoundData, play_once};
