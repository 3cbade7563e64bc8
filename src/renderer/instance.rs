//! Per-instance GPU data and the buffers that carry it
//!
//! Every frame the game rebuilds its instance lists from scratch. The
//! buffers keep their allocation between frames and only grow.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use super::material::Material;
use crate::ui::UiQuad;

/// One lit mesh instance
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshInstance {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    /// `[grid, specular, shininess, emissive]`
    params: [f32; 4],
}

impl MeshInstance {
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: material.color.into(),
            params: material.params(),
        }
    }

    #[must_use]
    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
            3 => Float32x4, // model column 0
            4 => Float32x4, // model column 1
            5 => Float32x4, // model column 2
            6 => Float32x4, // model column 3
            7 => Float32x4, // color
            8 => Float32x4, // params
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// One light flare, a glowing pane facing the camera
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FlareInstance {
    position: [f32; 3],
    size: f32,
    color: [f32; 4],
    /// Spin around the view axis in radians
    rotation: f32,
    _padding: [f32; 3],
}

impl FlareInstance {
    pub fn new(position: Vec3, size: f32, rotation: f32, color: Vec4) -> Self {
        Self {
            position: position.into(),
            size,
            color: color.into(),
            rotation,
            _padding: [0.0; 3],
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32,   // size
            2 => Float32x4, // color
            3 => Float32,   // rotation
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// A UI quad in menu space
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UiInstance {
    min: [f32; 2],
    max: [f32; 2],
    color: [f32; 4],
}

impl From<&UiQuad> for UiInstance {
    fn from(quad: &UiQuad) -> Self {
        Self {
            min: quad.min.into(),
            max: quad.max.into(),
            color: quad.color.into(),
        }
    }
}

impl UiInstance {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x2, // min
            1 => Float32x2, // max
            2 => Float32x4, // color
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Growable vertex buffer holding one frame of instances
#[derive(Debug)]
pub struct InstanceBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    len: u32,
}

impl InstanceBuffer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            len: 0,
        }
    }

    /// Replace the contents, recreating the buffer only when it is too small
    pub fn write<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        self.len = data.len() as u32;
        if data.is_empty() {
            return;
        }

        let bytes: &[u8] = bytemuck::cast_slice(data);

        if let Some(buffer) = &self.buffer
            && buffer.size() >= bytes.len() as u64
        {
            queue.write_buffer(buffer, 0, bytes);
            return;
        }

        log::debug!("Growing {} to {} bytes", self.label, bytes.len());
        self.buffer = Some(
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(self.label),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }),
        );
    }

    /// Number of instances written last
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The buffer, if it holds anything to draw
    #[must_use]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        if self.len == 0 { None } else { self.buffer.as_ref() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_instance_strides() {
        assert_eq!(std::mem::size_of::<MeshInstance>(), 96);
        assert_eq!(std::mem::size_of::<FlareInstance>(), 48);
        assert_eq!(std::mem::size_of::<UiInstance>(), 32);
        assert_eq!(MeshInstance::layout().array_stride, 96);
    }

    #[test]
    fn test_mesh_instance_keeps_model_and_material() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let instance = MeshInstance::new(model, &Material::blok());
        assert_eq!(instance.model(), model);
        assert_eq!(instance.params, Material::blok().params());
    }

    #[test]
    fn test_ui_instance_from_quad() {
        let quad = UiQuad::new(Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4), Vec4::ONE);
        let instance = UiInstance::from(&quad);
        assert_eq!(instance.min, [0.1, 0.2]);
        assert_eq!(instance.max, [0.3, 0.4]);
    }

    #[test]
    fn test_empty_buffer_has_nothing_to_draw() {
        let buffer = InstanceBuffer::new("test");
        assert!(buffer.is_empty());
        assert!(buffer.buffer().is_none());
    }
}
