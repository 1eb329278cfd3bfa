use crate::batch::{LightUniform, SceneBatches, collect_batches, scene_lighting};
use crate::gizmo::{LineVertex, helper_lines};
use crate::mesh::{MeshData, Vertex, cube_mesh, quad_mesh, sphere_mesh};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lightbox_render::{Camera, Renderer};
use lightbox_scene::{GeometryKind, SceneGraph};
use std::cell::Cell;
use wgpu::util::DeviceExt;

pub(crate) const MAX_INSTANCES: u32 = 16_384;
const MAX_LINE_VERTICES: u32 = 8_192;
const SPHERE_SEGMENTS: u32 = 24;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light: LightUniform,
}

/// What one frame submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub instances: u32,
    pub draw_calls: u32,
    pub line_vertices: u32,
    /// Instances or line vertices over the buffer limits, not drawn.
    pub dropped: u32,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

fn mesh_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<crate::batch::InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(depth_state()),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// wgpu scene renderer: instanced meshes plus helper lines.
pub struct WgpuRenderer {
    culled_pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube: GpuMesh,
    quad: GpuMesh,
    sphere: GpuMesh,
    instance_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    /// Drop count last reported, so overflow is logged once per change.
    reported_drops: Cell<u32>,
    pub clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                light: LightUniform::zeroed(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let culled_pipeline = mesh_pipeline(
            device,
            &pipeline_layout,
            &mesh_shader,
            surface_format,
            Some(wgpu::Face::Back),
            "mesh_pipeline",
        );
        let double_sided_pipeline = mesh_pipeline(
            device,
            &pipeline_layout,
            &mesh_shader,
            surface_format,
            None,
            "double_sided_mesh_pipeline",
        );

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let cube = GpuMesh::upload(device, "cube", &cube_mesh());
        let quad = GpuMesh::upload(device, "quad", &quad_mesh());
        let sphere = GpuMesh::upload(
            device,
            "sphere",
            &sphere_mesh(SPHERE_SEGMENTS, SPHERE_SEGMENTS),
        );

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: MAX_INSTANCES as u64
                * std::mem::size_of::<crate::batch::InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_buffer"),
            size: MAX_LINE_VERTICES as u64 * std::mem::size_of::<LineVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            culled_pipeline,
            double_sided_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube,
            quad,
            sphere,
            instance_buffer,
            line_buffer,
            depth_texture,
            surface_format,
            reported_drops: Cell::new(0),
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Bind this renderer to one frame's device, queue and color target.
    pub fn target<'a>(
        &'a self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        view: &'a wgpu::TextureView,
    ) -> FrameTarget<'a> {
        FrameTarget {
            renderer: self,
            device,
            queue,
            view,
        }
    }

    fn mesh(&self, kind: GeometryKind) -> &GpuMesh {
        match kind {
            GeometryKind::Box => &self.cube,
            GeometryKind::Plane => &self.quad,
            GeometryKind::Sphere => &self.sphere,
        }
    }

    /// Render one frame of `scene` into `view`.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &SceneGraph,
        camera: &Camera,
    ) -> FrameStats {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                light: scene_lighting(scene),
            }),
        );

        let SceneBatches { instances, batches } = collect_batches(scene);
        let instance_count = (instances.len() as u32).min(MAX_INSTANCES);
        if instance_count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..instance_count as usize]),
            );
        }

        let lines = helper_lines(scene);
        let line_count = (lines.len() as u32).min(MAX_LINE_VERTICES) & !1;
        if line_count > 0 {
            queue.write_buffer(
                &self.line_buffer,
                0,
                bytemuck::cast_slice(&lines[..line_count as usize]),
            );
        }

        let mut stats = FrameStats {
            instances: instance_count,
            line_vertices: line_count,
            dropped: (instances.len() as u32 - instance_count) + (lines.len() as u32 - line_count),
            ..FrameStats::default()
        };
        if stats.dropped != self.reported_drops.replace(stats.dropped) && stats.dropped > 0 {
            tracing::warn!(dropped = stats.dropped, "frame exceeded GPU buffer limits");
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for batch in &batches {
                let end = batch.instances.end.min(instance_count);
                if batch.instances.start >= end {
                    continue;
                }
                let pipeline = if batch.key.double_sided {
                    &self.double_sided_pipeline
                } else {
                    &self.culled_pipeline
                };
                let mesh = self.mesh(batch.key.geometry);
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, batch.instances.start..end);
                stats.draw_calls += 1;
            }

            if line_count > 0 {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..line_count, 0..1);
                stats.draw_calls += 1;
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// A [`WgpuRenderer`] bound to one frame's color target.
pub struct FrameTarget<'a> {
    renderer: &'a WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a wgpu::TextureView,
}

impl Renderer for FrameTarget<'_> {
    type Output = FrameStats;

    fn render(&self, scene: &SceneGraph, camera: &Camera) -> FrameStats {
        self.renderer
            .draw(self.device, self.queue, self.view, scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_compose::{SceneConfig, compose};

    #[test]
    fn largest_allowed_grid_fits_instance_buffer() {
        let config = SceneConfig {
            grid_count: lightbox_compose::MAX_GRID_COUNT,
            ..SceneConfig::default()
        };
        assert!(config.validate().is_ok());
        let scene = compose(&config);
        let batches = collect_batches(&scene.graph);
        assert!(batches.instances.len() as u32 <= MAX_INSTANCES);
    }

    #[test]
    fn helper_lines_fit_line_buffer() {
        let config = SceneConfig {
            enable_light_camera_helper: true,
            ..SceneConfig::default()
        };
        let scene = compose(&config);
        assert!((helper_lines(&scene.graph).len() as u32) <= MAX_LINE_VERTICES);
    }
}
