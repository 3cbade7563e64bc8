//! glTF to level layout conversion
//!
//! Every mesh primitive in the file is treated as one cube. The cube is
//! recovered from its vertices:
//! - center: average of the unique vertices
//! - edge length: distance between unique vertices 0 and 1
//! - orientation: edges 0→1 and 0→3

use std::fmt;
use std::path::Path;

use glam::{Mat3, Mat4, Quat, Vec3};

use super::layout::{BlockDef, LevelLayout};

/// Error type for glTF import
#[derive(Debug)]
pub enum ImportError {
    /// The file could not be read or parsed as glTF
    Gltf(String),
    /// A primitive has no position attribute
    MissingPositions(String),
    /// No usable cube was found in the file
    NoBlocks,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gltf(msg) => write!(f, "Failed to load glTF file: {msg}"),
            Self::MissingPositions(mesh) => write!(f, "Missing position data for mesh: {mesh}"),
            Self::NoBlocks => write!(f, "No cube primitives found"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<gltf::Error> for ImportError {
    fn from(e: gltf::Error) -> Self {
        Self::Gltf(e.to_string())
    }
}

/// Read a glTF file and turn its primitives into a layout
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or contains no cubes
pub fn import_gltf(path: impl AsRef<Path>, scale: f32) -> Result<LevelLayout, ImportError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("level")
        .to_string();
    let mut layout = LevelLayout::new(name);
    layout.scale = scale;

    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, Mat4::IDENTITY, &buffers, &mut layout.blocks)?;
        }
    }

    if layout.blocks.is_empty() {
        return Err(ImportError::NoBlocks);
    }

    log::info!(
        "Imported {} bloks from {}",
        layout.blocks.len(),
        path.display()
    );
    Ok(layout)
}

fn process_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    blocks: &mut Vec<BlockDef>,
) -> Result<(), ImportError> {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().unwrap_or("unnamed");
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| ImportError::MissingPositions(mesh_name.to_string()))?
                .map(|p| transform.transform_point3(Vec3::from(p)))
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            match block_from_vertices(&positions, &indices) {
                Some(block) => blocks.push(block),
                None => log::warn!("Skipping primitive of '{mesh_name}': fewer than 4 vertices"),
            }
        }
    }

    for child in node.children() {
        process_node(&child, transform, buffers, blocks)?;
    }
    Ok(())
}

/// Unique vertices in first-referenced order
fn unique_vertices(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut unique: Vec<Vec3> = Vec::new();
    for &i in indices {
        let Some(&v) = positions.get(i as usize) else {
            continue;
        };
        if !unique.contains(&v) {
            unique.push(v);
        }
    }
    unique
}

/// Recover a cube from the vertices of one primitive
pub fn block_from_vertices(positions: &[Vec3], indices: &[u32]) -> Option<BlockDef> {
    let unique = unique_vertices(positions, indices);
    if unique.len() < 4 {
        return None;
    }

    let center = unique.iter().copied().sum::<Vec3>() / unique.len() as f32;
    let edge = unique[1] - unique[0];
    let size = edge.length();

    let x = edge.try_normalize()?;
    let y_raw = unique[3] - unique[0];
    let y = (y_raw - x * y_raw.dot(x)).try_normalize()?;
    let z = x.cross(y);

    Some(BlockDef {
        center,
        half_extent: size / 2.0,
        rotation: Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_corners(center: Vec3, half: f32, rotation: Quat) -> Vec<Vec3> {
        // Ordered so corners 0→1 runs along x and 0→3 along y
        [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ]
        .iter()
        .map(|&c| center + rotation * (c * half))
        .collect()
    }

    #[test]
    fn test_axis_aligned_cube() {
        let corners = cube_corners(Vec3::new(3.0, -2.0, 1.0), 0.5, Quat::IDENTITY);
        // Duplicate references, as a triangle list would have
        let indices = [0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7, 1, 5];
        let block = block_from_vertices(&corners, &indices).unwrap();

        assert!((block.center - Vec3::new(3.0, -2.0, 1.0)).length() < 1e-5);
        assert!((block.half_extent - 0.5).abs() < 1e-5);
        assert!(block.rotation.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_rotated_cube() {
        let rotation = Quat::from_rotation_z(0.4) * Quat::from_rotation_x(0.2);
        let corners = cube_corners(Vec3::ZERO, 1.0, rotation);
        let indices: Vec<u32> = (0..8).collect();
        let block = block_from_vertices(&corners, &indices).unwrap();

        assert!((block.half_extent - 1.0).abs() < 1e-5);
        assert!(block.rotation.angle_between(rotation) < 1e-3);
    }

    #[test]
    fn test_degenerate_primitive() {
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(block_from_vertices(&tri, &[0, 1, 2]).is_none());
        assert!(block_from_vertices(&tri, &[0, 1, 2, 0, 9]).is_none());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            import_gltf("/nope/level.gltf", 1.3),
            Err(ImportError::Gltf(_))
        ));
    }
}
