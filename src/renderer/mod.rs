//! Rendering module
//!
//! 3D rendering with wgpu. The game hands the renderer a fresh [`SceneView`]
//! of instances every frame.

mod camera;
mod context;
mod instance;
mod material;
mod mesh;

pub use camera::Camera;
pub use context::{BlackHoleView, Light, RenderFrame, Renderer, RendererError, SceneView};
pub use instance::{FlareInstance, InstanceBuffer, MeshInstance, UiInstance};
pub use material::Material;
pub use mesh::{Mesh, Vertex};
