//! GPU backend seam.
//!
//! Renderers are written against [`GpuDevice`] (resource creation) and
//! [`GpuPass`] (command recording). The production implementation is the
//! wgpu backend in [`wgpu_device`]; tests use a recording mock.
//!
//! Resource handles are single-owner values: dropping one releases the GPU
//! object, so a resource is freed exactly once.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use super::shader::Program;

#[cfg(test)]
pub(crate) mod mock;
pub mod wgpu_device;

/// Number of per-draw uniform slots each renderer owns per frame.
pub const UNIFORM_SLOTS: u32 = 256;

/// Byte distance between two uniform slots (wgpu's default dynamic offset alignment).
pub const UNIFORM_SLOT_STRIDE: u64 = 256;

/// What a buffer is bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Buffer creation request.
///
/// `contents = Some(..)` uploads once at creation; `None` allocates `size`
/// bytes that are filled later with [`GpuDevice::write_buffer`].
#[derive(Debug, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub size: u64,
    pub contents: Option<&'a [u8]>,
}

/// Tightly packed RGBA8 pixels, top row first.
#[derive(Debug, Clone)]
pub struct TextureImage<'a> {
    pub width: u32,
    pub height: u32,
    pub rgba: &'a [u8],
}

/// Uniform block consumed by every program.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

/// Resource creation and upload.
pub trait GpuDevice {
    type Buffer;
    type Texture;
    type Program;
    type Bindings;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Self::Buffer;

    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    fn create_texture(&self, image: &TextureImage<'_>) -> Self::Texture;

    /// Compiles and links the program for `program`.
    fn compile_program(&self, program: Program) -> Self::Program;

    /// Creates the uniform buffer (`UNIFORM_SLOTS` slots) and the bind group for
    /// `program`. Textured programs sample `texture`, or a white texel when `None`.
    fn create_bindings(&self, program: &Self::Program, texture: Option<&Self::Texture>)
        -> Self::Bindings;

    fn write_uniforms(&self, bindings: &Self::Bindings, slot: u32, uniforms: &DrawUniforms);
}

/// Command recording within one render pass.
pub trait GpuPass<D: GpuDevice + ?Sized> {
    fn set_program(&mut self, program: &D::Program);

    /// Binds the renderer's bind group with the dynamic offset of `slot`.
    fn set_bindings(&mut self, bindings: &D::Bindings, slot: u32);

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &D::Buffer);

    /// Binds a `u32` index buffer.
    fn set_index_buffer(&mut self, buffer: &D::Buffer);

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);
}
