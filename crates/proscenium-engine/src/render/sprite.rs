use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Viewport;

/// Device handles shared by every sprite operation.
#[derive(Copy, Clone)]
pub struct SpriteDevice<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Colour target format the pipeline is built for.
    pub format: wgpu::TextureFormat,
}

/// Where one frame's sprites are recorded, and the logical space they live in.
pub struct SpritePass<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
    pub viewport: Viewport,
}

/// An uploaded image: texture plus the bind group that samples it.
pub struct GpuImage {
    // Kept alive for the bind group's view.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl GpuImage {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// One sprite to draw this frame, at the image's native size.
#[derive(Copy, Clone)]
pub struct Sprite<'a> {
    pub image: &'a GpuImage,
    pub x: f32,
    pub y: f32,
}

/// Draws textured quads, one instance per sprite, in submission order.
///
/// Consecutive sprites sharing an image are drawn with a single instanced call.
#[derive(Default)]
pub struct SpriteRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    viewport_layout: Option<wgpu::BindGroupLayout>,
    image_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    viewport_bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instances: Vec<SpriteInstance>,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads straight-alpha RGBA8 pixels as a sampled texture.
    pub fn create_image(&mut self, gpu: SpriteDevice<'_>, rgba: &image::RgbaImage) -> GpuImage {
        self.ensure_layouts(gpu);
        let (width, height) = rgba.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("proscenium sprite texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // ensure_layouts populated both fields above.
        let (Some(layout), Some(sampler)) = (self.image_layout.as_ref(), self.sampler.as_ref())
        else {
            unreachable!("sprite layouts are created by ensure_layouts")
        };

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("proscenium sprite image bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        GpuImage {
            _texture: texture,
            bind_group,
            width,
            height,
        }
    }

    /// Records `sprites` into the pass on top of whatever was cleared.
    pub fn render(&mut self, gpu: SpriteDevice<'_>, pass: &mut SpritePass<'_>, sprites: &[Sprite<'_>]) {
        if sprites.is_empty() || !pass.viewport.is_valid() {
            return;
        }

        self.ensure_layouts(gpu);
        self.ensure_pipeline(gpu);
        self.ensure_static_buffers(gpu);
        self.ensure_viewport_binding(gpu);

        self.instances.clear();
        self.instances.extend(sprites.iter().map(|s| {
            let (w, h) = s.image.size();
            SpriteInstance {
                origin: [s.x, s.y],
                size: [w as f32, h as f32],
            }
        }));

        self.write_viewport_uniform(gpu, pass.viewport);
        self.ensure_instance_capacity(gpu, self.instances.len());

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        gpu.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.instances));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(viewport_bg) = self.viewport_bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = pass.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("proscenium sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: pass.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, viewport_bg, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for (start, end) in runs(sprites, |a, b| std::ptr::eq(a.image, b.image)) {
            rpass.set_bind_group(1, &sprites[start].image.bind_group, &[]);
            rpass.draw_indexed(0..6, 0, start as u32..end as u32);
        }
    }

    fn ensure_layouts(&mut self, gpu: SpriteDevice<'_>) {
        if self.image_layout.is_some() && self.viewport_layout.is_some() && self.sampler.is_some() {
            return;
        }

        self.viewport_layout = Some(gpu.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("proscenium sprite viewport bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ViewportUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            },
        ));

        self.image_layout = Some(gpu.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("proscenium sprite image bgl"),
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
                ],
            },
        ));

        self.sampler = Some(gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("proscenium sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));

        // Layouts changed: pipeline and viewport binding must follow.
        self.pipeline = None;
        self.pipeline_format = None;
        self.viewport_bind_group = None;
        self.viewport_ubo = None;
    }

    fn ensure_pipeline(&mut self, gpu: SpriteDevice<'_>) {
        if self.pipeline_format == Some(gpu.format) && self.pipeline.is_some() {
            return;
        }
        let (Some(viewport_layout), Some(image_layout)) =
            (self.viewport_layout.as_ref(), self.image_layout.as_ref())
        else {
            return;
        };

        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("proscenium sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("proscenium sprite pipeline layout"),
            bind_group_layouts: &[viewport_layout, image_layout],
            immediate_size: 0,
        });

        let pipeline = gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("proscenium sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(gpu.format);
        self.pipeline = Some(pipeline);
    }

    fn ensure_viewport_binding(&mut self, gpu: SpriteDevice<'_>) {
        if self.viewport_bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(layout) = self.viewport_layout.as_ref() else { return };

        let ubo = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("proscenium sprite viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("proscenium sprite viewport bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.viewport_ubo = Some(ubo);
        self.viewport_bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, gpu: SpriteDevice<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }
        self.quad_vbo = Some(gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("proscenium sprite quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("proscenium sprite quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn write_viewport_uniform(&self, gpu: SpriteDevice<'_>, viewport: Viewport) {
        let Some(ubo) = self.viewport_ubo.as_ref() else { return };
        let u = ViewportUniform {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        };
        gpu.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    fn ensure_instance_capacity(&mut self, gpu: SpriteDevice<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        self.instance_vbo = Some(gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("proscenium sprite instance vbo"),
            size: (new_cap * std::mem::size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

/// Splits `items` into `[start, end)` runs of neighbours that are `same`.
fn runs<T>(items: &[T], same: impl Fn(&T, &T) -> bool) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=items.len() {
        if i == items.len() || !same(&items[start], &items[i]) {
            out.push((start, i));
            start = i;
        }
    }
    out
}

// ── GPU types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpriteInstance {
    origin: [f32; 2],
    size: [f32; 2],
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2  // size
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_groups_equal_neighbours() {
        let ids = [1, 1, 2, 1, 1, 1];
        assert_eq!(runs(&ids, |a, b| a == b), vec![(0, 2), (2, 3), (3, 6)]);
    }

    #[test]
    fn runs_of_empty_slice_is_empty() {
        let ids: [u8; 0] = [];
        assert!(runs(&ids, |a, b| a == b).is_empty());
    }

    #[test]
    fn instance_layout_matches_shader_locations() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 16);
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
        let locations: Vec<u32> = SpriteInstance::ATTRS.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![1, 2]);
    }
}
