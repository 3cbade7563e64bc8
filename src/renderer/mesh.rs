//! Static meshes the renderer instances: unit cube, UV sphere and a flat pane

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Spans 0..1 across every cube face, which the lit shader uses for edge glow
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Cube faces as (normal, u axis, v axis), with `u × v == normal`
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
];

/// CPU geometry plus the GPU buffers the renderer fills in on upload
#[derive(Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub(crate) vertex_buffer: Option<wgpu::Buffer>,
    pub(crate) index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn from_data(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            ..Default::default()
        }
    }

    /// Append a quad spanning `center ± u ± v`. Triangles are wound
    /// counter-clockwise as seen from the side `normal` points to.
    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let base = self.vertices.len() as u32;
        let corners = [
            (center - u - v, Vec2::new(0.0, 0.0)),
            (center + u - v, Vec2::new(1.0, 0.0)),
            (center + u + v, Vec2::new(1.0, 1.0)),
            (center - u + v, Vec2::new(0.0, 1.0)),
        ];
        self.vertices
            .extend(corners.map(|(position, uv)| Vertex::new(position, normal, uv)));

        let order = if u.cross(v).dot(normal) >= 0.0 {
            [0, 1, 2, 2, 3, 0]
        } else {
            [0, 2, 1, 2, 0, 3]
        };
        self.indices.extend(order.map(|i| base + i));
    }

    /// Cube of edge length 1 around the origin; instances scale it per blok
    pub fn cube() -> Self {
        let mut mesh = Self::default();
        for (normal, u, v) in CUBE_FACES {
            mesh.push_quad(normal * 0.5, u * 0.5, v * 0.5, normal);
        }
        mesh
    }

    /// Pane in the XY plane facing +Z, with v running top to bottom
    pub fn pane(width: f32, height: f32) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(
            Vec3::ZERO,
            Vec3::X * (width / 2.0),
            Vec3::NEG_Y * (height / 2.0),
            Vec3::Z,
        );
        mesh
    }

    /// Latitude/longitude sphere. The seam column is duplicated so UVs wrap.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        use std::f32::consts::{PI, TAU};

        let columns = segments + 1;
        let vertices = (0..=rings)
            .flat_map(|ring| {
                let v = ring as f32 / rings as f32;
                let (sin_phi, cos_phi) = (v * PI).sin_cos();
                (0..=segments).map(move |segment| {
                    let u = segment as f32 / segments as f32;
                    let (sin_theta, cos_theta) = (u * TAU).sin_cos();
                    let dir = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
                    Vertex::new(dir * radius, dir, Vec2::new(u, v))
                })
            })
            .collect();

        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let top = ring * columns + segment;
                let bottom = top + columns;
                indices.extend_from_slice(&[top, bottom, top + 1, top + 1, bottom, bottom + 1]);
            }
        }

        Self::from_data(vertices, indices)
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &Mesh, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn test_cube_is_unit_sized() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(
            cube.vertices
                .iter()
                .all(|v| v.position.iter().all(|c| c.abs() == 0.5))
        );
        assert!(!cube.is_uploaded());
    }

    #[test]
    fn test_cube_faces_wind_outward() {
        let cube = Mesh::cube();
        for tri in cube.indices.chunks(3) {
            let normal = Vec3::from(cube.vertices[tri[0] as usize].normal);
            assert!(triangle_normal(&cube, tri).dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_cube_uvs_cover_each_face() {
        let cube = Mesh::cube();
        for face in cube.vertices.chunks(4) {
            let uvs: Vec<[f32; 2]> = face.iter().map(|v| v.uv).collect();
            assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        }
    }

    #[test]
    fn test_pane_faces_the_camera() {
        let pane = Mesh::pane(85.0, 80.0);
        assert!(pane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert!(pane.vertices.iter().all(|v| v.position[2] == 0.0));
        assert_eq!(pane.vertices[0].position, [-42.5, 40.0, 0.0]);
        assert_eq!(pane.vertices[2].position, [42.5, -40.0, 0.0]);
        assert_eq!(pane.vertices[2].uv, [1.0, 1.0]);
        for tri in pane.indices.chunks(3) {
            assert!(triangle_normal(&pane, tri).z > 0.0);
        }
    }

    #[test]
    fn test_sphere_normals_are_unit() {
        let sphere = Mesh::sphere(1.0, 16, 8);
        assert_eq!(sphere.vertices.len(), 17 * 9);
        assert_eq!(sphere.indices.len(), 16 * 8 * 6);
        for v in &sphere.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }
}
