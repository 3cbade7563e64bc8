//! Main renderer implementation

use std::fmt;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat2, Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::Camera;
use super::instance::{FlareInstance, InstanceBuffer, MeshInstance, UiInstance};
use super::mesh::{Mesh, Vertex};

/// Error type for renderer creation
#[derive(Debug)]
pub enum RendererError {
    /// The window could not back a surface
    SurfaceCreation(String),
    /// No GPU adapter can present to the surface
    AdapterNotFound,
    /// The adapter refused to create a device
    DeviceRequest(String),
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceCreation(msg) => write!(f, "Failed to create surface: {msg}"),
            Self::AdapterNotFound => write!(f, "Failed to find GPU adapter"),
            Self::DeviceRequest(msg) => write!(f, "Failed to create device: {msg}"),
        }
    }
}

impl std::error::Error for RendererError {}

/// Uniform buffer for camera data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view_pos: [f32; 3],
    _padding: f32,
}

impl CameraUniform {
    fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0; 3],
            _padding: 0.0,
        }
    }

    fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        self.view_pos = camera.position.into();
    }
}

/// Light uniform data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LightUniform {
    position: [f32; 3],
    _padding1: f32,
    color: [f32; 3],
    _padding2: f32,
    ambient: [f32; 3],
    _padding3: f32,
    glow: [f32; 4],
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.into(),
            _padding1: 0.0,
            color: light.color.into(),
            _padding2: 0.0,
            ambient: light.ambient.into(),
            _padding3: 0.0,
            glow: light.glow.into(),
        }
    }
}

/// Black hole pane parameters
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlackHoleUniform {
    model: [[f32; 4]; 4],
    /// Spiral rotation, columns packed as `(c0.x, c0.y, c1.x, c1.y)`
    spin: [f32; 4],
    tint: [f32; 4],
}

impl From<&BlackHoleView> for BlackHoleUniform {
    fn from(view: &BlackHoleView) -> Self {
        Self {
            model: Mat4::from_scale(view.size.extend(1.0)).to_cols_array_2d(),
            spin: view.spin.to_cols_array(),
            tint: view.tint.into(),
        }
    }
}

/// Point light for the scene, plus the grid glow it drives on the bloks
#[derive(Debug, Clone)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient: Vec3,
    /// Color of the blok edge grid, scaled by the current flash
    pub glow: Vec4,
}

impl Light {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            color: Vec3::ONE,
            ambient: Vec3::splat(0.15),
            glow: Vec4::ZERO,
        }
    }

    #[must_use]
    pub fn with_glow(mut self, glow: Vec4) -> Self {
        self.glow = glow;
        self
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::new(20.0, 20.0, -25.0))
    }
}

/// The spinning spiral under the play field
#[derive(Debug, Clone, Copy)]
pub struct BlackHoleView {
    /// Pane width and height, centered on the origin at z = 0
    pub size: Vec2,
    pub spin: Mat2,
    pub tint: Vec4,
}

/// Everything drawn in one frame
#[derive(Debug, Default)]
pub struct SceneView {
    pub light: Light,
    pub black_hole: Option<BlackHoleView>,
    /// Unit cubes: bloks, debris, pads and the pause button
    pub cubes: Vec<MeshInstance>,
    /// Unit spheres: balls
    pub spheres: Vec<MeshInstance>,
    pub flares: Vec<FlareInstance>,
    /// Drawn last, over everything
    pub ui: Vec<UiInstance>,
}

/// Main renderer
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: (u32, u32),
    lit_pipeline: wgpu::RenderPipeline,
    black_hole_pipeline: wgpu::RenderPipeline,
    flare_pipeline: wgpu::RenderPipeline,
    ui_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    black_hole_buffer: wgpu::Buffer,
    black_hole_bind_group: wgpu::BindGroup,
    cube: Mesh,
    sphere: Mesh,
    pane: Mesh,
    cube_instances: InstanceBuffer,
    sphere_instances: InstanceBuffer,
    flare_instances: InstanceBuffer,
    ui_instances: InstanceBuffer,
    /// Clear color
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer
    ///
    /// # Errors
    ///
    /// Returns an error if no surface, adapter or device can be created
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));

        // Create instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance
            .create_surface(window)
            .map_err(|e| RendererError::SurfaceCreation(e.to_string()))?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Bloks Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RendererError::DeviceRequest(e.to_string()))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RendererError::SurfaceCreation("no surface formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, size.0, size.1);

        // Create camera and light uniform buffers
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::from(&Light::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let global_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Global Bind Group Layout"),
                entries: &[
                    // Camera
                    uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                    // Light
                    uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // Black hole uniform
        let black_hole_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Black Hole Buffer"),
            contents: bytemuck::cast_slice(&[BlackHoleUniform::from(&BlackHoleView {
                size: Vec2::ONE,
                spin: Mat2::IDENTITY,
                tint: Vec4::ONE,
            })]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let black_hole_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Black Hole Bind Group Layout"),
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let black_hole_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Black Hole Bind Group"),
            layout: &black_hole_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: black_hole_buffer.as_entire_binding(),
            }],
        });

        // Lit instanced pipeline
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let lit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[&global_bind_group_layout],
            push_constant_ranges: &[],
        });

        let lit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lit Pipeline"),
            layout: Some(&lit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), MeshInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Black hole pipeline
        let black_hole_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Black Hole Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("black_hole.wgsl").into()),
        });

        let black_hole_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Black Hole Pipeline Layout"),
                bind_group_layouts: &[&global_bind_group_layout, &black_hole_bind_group_layout],
                push_constant_ranges: &[],
            });

        let black_hole_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Black Hole Pipeline"),
            layout: Some(&black_hole_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &black_hole_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &black_hole_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Flare pipeline
        let flare_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flare Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("particle.wgsl").into()),
        });

        let flare_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Flare Pipeline Layout"),
                bind_group_layouts: &[&global_bind_group_layout],
                push_constant_ranges: &[],
            });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        };

        let flare_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Flare Pipeline"),
            layout: Some(&flare_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &flare_shader,
                entry_point: Some("vs_main"),
                buffers: &[FlareInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &flare_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(additive),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // UI pipeline
        let ui_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("UI Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("ui.wgsl").into()),
        });

        let ui_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("UI Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let ui_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("UI Pipeline"),
            layout: Some(&ui_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &ui_shader,
                entry_point: Some("vs_main"),
                buffers: &[UiInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &ui_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(false, wgpu::CompareFunction::Always)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let mut cube = Mesh::cube();
        let mut sphere = Mesh::sphere(1.0, 24, 16);
        let mut pane = Mesh::pane(1.0, 1.0);
        for mesh in [&mut cube, &mut sphere, &mut pane] {
            Self::upload_mesh(&device, mesh);
        }

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            lit_pipeline,
            black_hole_pipeline,
            flare_pipeline,
            ui_pipeline,
            depth_view,
            camera_uniform,
            camera_buffer,
            light_buffer,
            global_bind_group,
            black_hole_buffer,
            black_hole_bind_group,
            cube,
            sphere,
            pane,
            cube_instances: InstanceBuffer::new("Cube Instances"),
            sphere_instances: InstanceBuffer::new("Sphere Instances"),
            flare_instances: InstanceBuffer::new("Flare Instances"),
            ui_instances: InstanceBuffer::new("UI Instances"),
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.02,
                a: 1.0,
            },
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Upload a mesh to GPU
    fn upload_mesh(device: &wgpu::Device, mesh: &mut Mesh) {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        mesh.vertex_buffer = Some(vertex_buffer);
        mesh.index_buffer = Some(index_buffer);
    }

    /// Resize the renderer
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_view(&self.device, width, height);
            log::debug!("Resized to {}x{}", width, height);
        }
    }

    /// Current surface size in pixels
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Update camera uniform
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Draw one frame. Skips the frame if the surface is not ready.
    pub fn render(&mut self, scene: &SceneView) {
        self.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[LightUniform::from(&scene.light)]),
        );
        if let Some(black_hole) = &scene.black_hole {
            self.queue.write_buffer(
                &self.black_hole_buffer,
                0,
                bytemuck::cast_slice(&[BlackHoleUniform::from(black_hole)]),
            );
        }
        self.cube_instances
            .write(&self.device, &self.queue, &scene.cubes);
        self.sphere_instances
            .write(&self.device, &self.queue, &scene.spheres);
        self.flare_instances
            .write(&self.device, &self.queue, &scene.flares);
        self.ui_instances.write(&self.device, &self.queue, &scene.ui);

        let Some(mut frame) = self.begin_frame() else {
            return;
        };
        {
            let mut pass = self.begin_render_pass(&mut frame);

            if scene.black_hole.is_some() {
                self.draw_black_hole(&mut pass);
            }
            self.draw_instanced(&mut pass, &self.cube, &self.cube_instances);
            self.draw_instanced(&mut pass, &self.sphere, &self.sphere_instances);

            if let Some(buffer) = self.flare_instances.buffer() {
                pass.set_pipeline(&self.flare_pipeline);
                pass.set_bind_group(0, &self.global_bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                // Draw 6 vertices per instance (2 triangles)
                pass.draw(0..6, 0..self.flare_instances.len());
            }

            if let Some(buffer) = self.ui_instances.buffer() {
                pass.set_pipeline(&self.ui_pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..6, 0..self.ui_instances.len());
            }
        }
        self.end_frame(frame);
    }

    /// Begin a render frame
    fn begin_frame(&self) -> Option<RenderFrame> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return None;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return None;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        Some(RenderFrame {
            output,
            view,
            encoder,
        })
    }

    /// End a render frame
    fn end_frame(&self, frame: RenderFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.output.present();
    }

    /// Create a render pass
    fn begin_render_pass<'a>(&'a self, frame: &'a mut RenderFrame) -> wgpu::RenderPass<'a> {
        frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            })
    }

    fn draw_black_hole<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        let (Some(vertices), Some(indices)) = (&self.pane.vertex_buffer, &self.pane.index_buffer)
        else {
            return;
        };
        pass.set_pipeline(&self.black_hole_pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);
        pass.set_bind_group(1, &self.black_hole_bind_group, &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.pane.index_count(), 0, 0..1);
    }

    /// Draw every instance of a mesh with the lit pipeline
    fn draw_instanced<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        mesh: &'a Mesh,
        instances: &'a InstanceBuffer,
    ) {
        let (Some(vertices), Some(indices), Some(instance_buffer)) = (
            &mesh.vertex_buffer,
            &mesh.index_buffer,
            instances.buffer(),
        ) else {
            return;
        };

        pass.set_pipeline(&self.lit_pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_vertex_buffer(1, instance_buffer.slice(..));
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..mesh.index_count(), 0, 0..instances.len());
    }

    /// Get the device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get the queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// A render frame in progress
pub struct RenderFrame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layouts_match_wgsl() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightUniform>(), 64);
        assert_eq!(std::mem::size_of::<BlackHoleUniform>(), 96);
    }

    #[test]
    fn test_black_hole_spin_columns() {
        let spin = Mat2::from_angle(0.5);
        let uniform = BlackHoleUniform::from(&BlackHoleView {
            size: Vec2::new(85.0, 80.0),
            spin,
            tint: Vec4::ONE,
        });
        assert_eq!(uniform.spin, [spin.x_axis.x, spin.x_axis.y, spin.y_axis.x, spin.y_axis.y]);
        assert_eq!(uniform.model[0][0], 85.0);
        assert_eq!(uniform.model[1][1], 80.0);
    }

    #[test]
    fn test_light_glow_reaches_uniform() {
        let light = Light::default().with_glow(Vec4::new(1.0, 0.78, 0.125, 1.0));
        let uniform = LightUniform::from(&light);
        assert_eq!(uniform.position, [20.0, 20.0, -25.0]);
        assert_eq!(uniform.glow, [1.0, 0.78, 0.125, 1.0]);
    }
}
