//! wgpu implementation of the backend seam.

use std::num::NonZeroU64;
use std::ops::Range;

use wgpu::util::DeviceExt;

use super::{
    BufferDesc, BufferKind, DrawUniforms, GpuDevice, GpuPass, TextureImage, UNIFORM_SLOTS,
    UNIFORM_SLOT_STRIDE,
};
use crate::render::shader::Program;

/// Device + queue pair used for resource creation and uploads.
///
/// `wgpu` handles are reference counted, so this is cheap to build from a
/// [`Gpu`](crate::device::Gpu) and can outlive individual frames.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    sampler: wgpu::Sampler,
    white: WgpuTexture,
}

/// Texture + default view.
pub struct WgpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl WgpuTexture {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

/// Compiled pipeline for one [`Program`].
pub struct WgpuProgram {
    program: Program,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

/// Per-renderer uniform ring + bind group.
pub struct WgpuBindings {
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl WgpuDevice {
    /// Wraps an existing device/queue. `target_format` is the color format
    /// every pipeline renders into (normally the surface format).
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, target_format: wgpu::TextureFormat) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("deltawing sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_texture(
            &device,
            &queue,
            &TextureImage { width: 1, height: 1, rgba: &[255, 255, 255, 255] },
        );

        Self { device, queue, target_format, sampler, white }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn create_bind_group_layout(&self, program: Program) -> wgpu::BindGroupLayout {
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: uniform_block_size(),
            },
            count: None,
        }];

        if program.is_textured() {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(program.label()),
            entries: &entries,
        })
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;
    type Texture = WgpuTexture;
    type Program = WgpuProgram;
    type Bindings = WgpuBindings;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> wgpu::Buffer {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        match desc.contents {
            Some(contents) => self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents,
                usage,
            }),
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(desc.label),
                size: desc.size,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        }
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn create_texture(&self, image: &TextureImage<'_>) -> WgpuTexture {
        upload_texture(&self.device, &self.queue, image)
    }

    fn compile_program(&self, program: Program) -> WgpuProgram {
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label()),
            source: wgpu::ShaderSource::Wgsl(program.source().into()),
        });

        let bind_group_layout = self.create_bind_group_layout(program);

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(program.label()),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let buffers = program.buffer_layouts();

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.label()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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

        WgpuProgram { program, pipeline, bind_group_layout }
    }

    fn create_bindings(&self, program: &WgpuProgram, texture: Option<&WgpuTexture>) -> WgpuBindings {
        let uniforms = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("deltawing uniform ring"),
            size: UNIFORM_SLOT_STRIDE * UNIFORM_SLOTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &uniforms,
                offset: 0,
                size: uniform_block_size(),
            }),
        }];

        if program.program.is_textured() {
            let view = &texture.unwrap_or(&self.white).view;
            entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(program.program.label()),
            layout: &program.bind_group_layout,
            entries: &entries,
        });

        WgpuBindings { uniforms, bind_group }
    }

    fn write_uniforms(&self, bindings: &WgpuBindings, slot: u32, uniforms: &DrawUniforms) {
        self.queue.write_buffer(
            &bindings.uniforms,
            slot as u64 * UNIFORM_SLOT_STRIDE,
            bytemuck::bytes_of(uniforms),
        );
    }
}

/// Records renderer commands into a wgpu render pass.
pub struct WgpuPass<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
}

impl<'a, 'p> WgpuPass<'a, 'p> {
    pub fn new(pass: &'a mut wgpu::RenderPass<'p>) -> Self {
        Self { pass }
    }
}

impl GpuPass<WgpuDevice> for WgpuPass<'_, '_> {
    fn set_program(&mut self, program: &WgpuProgram) {
        self.pass.set_pipeline(&program.pipeline);
    }

    fn set_bindings(&mut self, bindings: &WgpuBindings, slot: u32) {
        let offset = (slot as u64 * UNIFORM_SLOT_STRIDE) as wgpu::DynamicOffset;
        self.pass.set_bind_group(0, &bindings.bind_group, &[offset]);
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer) {
        self.pass.set_vertex_buffer(slot, buffer.slice(..));
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer) {
        self.pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.pass.draw_indexed(indices, base_vertex, instances);
    }
}

fn uniform_block_size() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64)
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage<'_>) -> WgpuTexture {
    let size = wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("deltawing texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    if image.width > 0 && image.height > 0 {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    WgpuTexture { texture, view }
}
