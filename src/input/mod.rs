//! Input handling module
//!
//! Tracks keyboard state and turns mouse clicks and touches into pointer
//! events.

mod state;

pub use state::{Input, PointerEvent, PointerId, PointerPhase};
