//! Level data
//!
//! - Serializable level layouts (RON/JSON)
//! - A glTF scanner that turns cube meshes into layouts

mod import;
mod layout;

pub use import::{ImportError, block_from_vertices, import_gltf};
pub use layout::{BlockDef, LayoutError, LevelLayout};
