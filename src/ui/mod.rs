//! Menus and on-screen text
//!
//! Everything here produces flat [`UiQuad`]s in normalized menu space; the
//! renderer draws them in one instanced pass on top of the scene.

pub mod font;
mod menu;
mod rect;

pub use menu::{MenuAction, MenuManager, MenuState, ScoreRow};
pub use rect::{Rect, RectStyle, UiQuad};
