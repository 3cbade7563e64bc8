//! Physics simulation module
//!
//! Built on top of rapier3d

mod world;

pub use world::{
    BodyOptions, ColliderHandle, ColliderOptions, CollisionKind, ContactPoint, Physics,
    RayHit, RigidBodyHandle,
};
