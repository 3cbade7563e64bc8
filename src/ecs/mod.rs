//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod world;

pub use components::{PhysicsBody, Transform};
pub use world::{World, entity_from_user_data, entity_to_user_data};
