//! One textured quad per media plane.

use std::borrow::Cow;

use wgpu::util::DeviceExt;

use crate::gallery::PlaneSink;
use crate::media::PlaneFrame;
use crate::render::loader::PreparedPlaneImage;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

// Unit quad centred on the origin, scaled per plane in the vertex stage.
const QUAD: [Vertex; 4] = [
    Vertex {
        pos: [-0.5, -0.5],
        uv: [0.0, 1.0],
    },
    Vertex {
        pos: [0.5, -0.5],
        uv: [1.0, 1.0],
    },
    Vertex {
        pos: [-0.5, 0.5],
        uv: [0.0, 0.0],
    },
    Vertex {
        pos: [0.5, 0.5],
        uv: [1.0, 0.0],
    },
];

const PLACEHOLDER_RGBA: [u8; 4] = [38, 38, 42, 255];

/// Matches `Plane` in `plane.wgsl` (48 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneUniform {
    pub transform: [f32; 4],
    pub viewport: [f32; 4],
    pub image: [f32; 4],
}

impl PlaneUniform {
    /// `natural` overrides the frame's image size once the texture is loaded.
    pub fn from_frame(frame: &PlaneFrame, natural: Option<[u32; 2]>, camera_distance: f64) -> Self {
        let image = match natural.or(frame.image_size) {
            Some([w, h]) if w > 0 && h > 0 => [w as f32, h as f32, 1.0, 0.0],
            _ => [0.0; 4],
        };
        Self {
            transform: [
                frame.position.x as f32,
                frame.position.y as f32,
                frame.scale.x as f32,
                frame.scale.y as f32,
            ],
            viewport: [
                frame.viewport.width as f32,
                frame.viewport.height as f32,
                frame.strength as f32,
                camera_distance as f32,
            ],
            image,
        }
    }
}

struct PlaneSlot {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    // keeps the view's texture alive
    _texture: Option<wgpu::Texture>,
    natural: Option<[u32; 2]>,
    staged: PlaneUniform,
}

pub struct PlaneRenderer {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder: wgpu::TextureView,
    vbuf: wgpu::Buffer,
    slots: Vec<PlaneSlot>,
    visible: Vec<usize>,
    camera_distance: f64,
}

impl PlaneRenderer {
    /// `plane_count` is the number of source elements; frames are matched to
    /// slots by their source index.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        plane_count: usize,
        camera_distance: f64,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane-bind-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plane-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/plane.wgsl"))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plane-pipeline-layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let vlayout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plane-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vlayout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("plane-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let (_, placeholder) = upload_rgba(device, queue, 1, 1, &PLACEHOLDER_RGBA);

        let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane-quad"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut renderer = Self {
            pipeline,
            layout,
            sampler,
            placeholder,
            vbuf,
            slots: Vec::with_capacity(plane_count),
            visible: Vec::with_capacity(plane_count),
            camera_distance,
        };
        for _ in 0..plane_count {
            let uniform = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("plane-uniform"),
                size: std::mem::size_of::<PlaneUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = renderer.bind(device, &renderer.placeholder, &uniform);
            renderer.slots.push(PlaneSlot {
                uniform,
                bind_group,
                _texture: None,
                natural: None,
                staged: PlaneUniform::default(),
            });
        }
        renderer
    }

    fn bind(
        &self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane-bind-group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    }

    /// Swap a plane's placeholder for its decoded image. Unknown indices are ignored.
    pub fn set_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &PreparedPlaneImage,
    ) -> bool {
        if image.index >= self.slots.len() {
            return false;
        }
        let (texture, view) = upload_rgba(device, queue, image.width, image.height, &image.pixels);
        let bind_group = self.bind(device, &view, &self.slots[image.index].uniform);
        let slot = &mut self.slots[image.index];
        slot.bind_group = bind_group;
        slot._texture = Some(texture);
        slot.natural = Some(image.natural);
        true
    }

    /// Upload this frame's uniforms and draw every plane the engine emitted.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear: wgpu::Color,
    ) {
        for &index in &self.visible {
            let slot = &self.slots[index];
            queue.write_buffer(&slot.uniform, 0, bytemuck::bytes_of(&slot.staged));
        }

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plane-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_vertex_buffer(0, self.vbuf.slice(..));
            for &index in &self.visible {
                rpass.set_bind_group(0, &self.slots[index].bind_group, &[]);
                rpass.draw(0..QUAD.len() as u32, 0..1);
            }
        }

        self.visible.clear();
    }
}

impl PlaneSink for PlaneRenderer {
    fn plane(&mut self, frame: &PlaneFrame) {
        let distance = self.camera_distance;
        if let Some(slot) = self.slots.get_mut(frame.index) {
            slot.staged = PlaneUniform::from_frame(frame, slot.natural, distance);
            self.visible.push(frame.index);
        }
    }
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("plane-texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        texture.as_image_copy(),
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
