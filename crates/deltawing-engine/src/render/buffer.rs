//! Vertex/index buffers owned by a renderer.

use super::backend::{BufferDesc, BufferKind, GpuDevice};
use super::error::{report, RenderError};
use super::vertex::Vertex;

/// Capacity, in vertices (or instances), of a streaming buffer.
pub const MAX_VERTICES: u32 = 4096;

/// How often a vertex buffer's contents change.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    /// Uploaded once at creation.
    Static,
    /// Allocated empty and re-filled every draw.
    Stream,
}

/// GPU vertex storage tagged with its element stride and count.
pub struct VertexBuffer<D: GpuDevice> {
    handle: D::Buffer,
    stride: u32,
    count: u32,
    usage: BufferUsage,
}

impl<D: GpuDevice> VertexBuffer<D> {
    /// Uploads `data` (a whole number of `stride`-byte records) once.
    pub fn new_static(device: &D, stride: u32, data: &[u8]) -> Result<Self, RenderError> {
        if data.is_empty() || stride == 0 {
            return Err(report(RenderError::EmptyBuffer));
        }
        let handle = device.create_buffer(&BufferDesc {
            label: "deltawing static vbo",
            kind: BufferKind::Vertex,
            size: data.len() as u64,
            contents: Some(data),
        });
        Ok(Self { handle, stride, count: data.len() as u32 / stride, usage: BufferUsage::Static })
    }

    /// Typed [`new_static`](Self::new_static).
    pub fn from_vertices<V: Vertex>(device: &D, vertices: &[V]) -> Result<Self, RenderError> {
        Self::new_static(device, V::FORMAT.stride(), bytemuck::cast_slice(vertices))
    }

    /// Allocates an empty buffer of `MAX_VERTICES * stride` bytes.
    pub fn new_stream(device: &D, stride: u32) -> Self {
        let handle = device.create_buffer(&BufferDesc {
            label: "deltawing stream vbo",
            kind: BufferKind::Vertex,
            size: MAX_VERTICES as u64 * stride as u64,
            contents: None,
        });
        Self { handle, stride, count: 0, usage: BufferUsage::Stream }
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Elements uploaded at creation (static) or by the latest write (stream).
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Elements the buffer can hold.
    #[inline]
    pub fn capacity(&self) -> u32 {
        match self.usage {
            BufferUsage::Static => self.count,
            BufferUsage::Stream => MAX_VERTICES,
        }
    }

    #[inline]
    pub(crate) fn handle(&self) -> &D::Buffer {
        &self.handle
    }

    /// Writes whole records starting at element `first`. Only valid for streams.
    pub(crate) fn write(&mut self, device: &D, first: u32, bytes: &[u8]) {
        debug_assert_eq!(self.usage, BufferUsage::Stream);
        let offset = first as u64 * self.stride as u64;
        device.write_buffer(&self.handle, offset, bytes);
        self.count = first + bytes.len() as u32 / self.stride;
    }
}

/// Static `u32` index storage.
pub struct IndexBuffer<D: GpuDevice> {
    handle: D::Buffer,
    indices: Vec<u32>,
}

impl<D: GpuDevice> IndexBuffer<D> {
    /// Uploads `indices` once; index data never changes afterwards.
    pub fn new(device: &D, indices: &[u32]) -> Result<Self, RenderError> {
        if indices.is_empty() {
            return Err(report(RenderError::EmptyBuffer));
        }
        let handle = device.create_buffer(&BufferDesc {
            label: "deltawing ibo",
            kind: BufferKind::Index,
            size: std::mem::size_of_val(indices) as u64,
            contents: Some(bytemuck::cast_slice(indices)),
        });
        Ok(Self { handle, indices: indices.to_vec() })
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub(crate) fn handle(&self) -> &D::Buffer {
        &self.handle
    }
}

/// Geometry handed to a renderer, which takes exclusive ownership of it.
pub struct BufferPair<D: GpuDevice> {
    pub vertices: VertexBuffer<D>,
    pub indices: IndexBuffer<D>,
}

impl<D: GpuDevice> BufferPair<D> {
    pub fn new(vertices: VertexBuffer<D>, indices: IndexBuffer<D>) -> Self {
        Self { vertices, indices }
    }
}
