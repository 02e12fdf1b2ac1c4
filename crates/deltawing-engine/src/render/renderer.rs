//! Vertex-format-specialised draw object.
//!
//! A [`Renderer`] owns its buffers and a uniform ring, shares a compiled
//! program with every other renderer of the same format, and draws with the
//! projection of the [`Context`] and the current top of its matrix stack.
//!
//! Usage per frame:
//!
//! ```ignore
//! renderer.bind(frame.context);
//! frame.context.matrix_stack_mut().push_copy()?;
//! frame.context.matrix_stack_mut().translate(pos)?;
//! renderer.draw_all(&mut frame)?;
//! frame.context.matrix_stack_mut().pop()?;
//! ```

use std::ops::Range;
use std::rc::Rc;

use super::backend::{DrawUniforms, GpuDevice, UNIFORM_SLOTS};
use super::buffer::{BufferPair, BufferUsage, VertexBuffer};
use super::context::{Context, RendererId};
use super::error::{report, RenderError};
use super::frame::RenderFrame;
use super::shader::{Program, ShaderLibrary};
use super::texture::Texture;
use super::vertex::{Vertex, VertexFormat};
use crate::text::GlyphInstance;

pub struct Renderer<D: GpuDevice> {
    id: RendererId,
    format: VertexFormat,
    program_kind: Program,
    program: Rc<D::Program>,
    buffers: BufferPair<D>,
    instances: Option<VertexBuffer<D>>,
    bindings: D::Bindings,
    tint: [f32; 4],

    /// Vertices pushed since the last draw, not yet uploaded.
    staged: Vec<u8>,
    staged_count: u32,
    /// First vertex of the latest streamed upload.
    base_vertex: u32,

    /// Frame the cursors below belong to.
    frame: u64,
    uniform_cursor: u32,
    vertex_cursor: u32,
    instance_cursor: u32,
}

impl<D: GpuDevice> Renderer<D> {
    /// Creates a renderer drawing `buffers` with the program for `format`.
    ///
    /// The vertex buffer stride must match `format`.
    pub fn new(
        device: &D,
        shaders: &ShaderLibrary<D>,
        context: &mut Context,
        format: VertexFormat,
        buffers: BufferPair<D>,
    ) -> Result<Self, RenderError> {
        Self::build(device, shaders, context, format, Program::for_format(format), buffers, None)
    }

    /// Creates a renderer that draws `buffers` once per [`GlyphInstance`].
    ///
    /// Only [`VertexFormat::PositionTexture`] supports instancing.
    pub fn new_instanced(
        device: &D,
        shaders: &ShaderLibrary<D>,
        context: &mut Context,
        format: VertexFormat,
        buffers: BufferPair<D>,
    ) -> Result<Self, RenderError> {
        if format != VertexFormat::PositionTexture {
            return Err(report(RenderError::UnsupportedVertexFormat(format)));
        }
        let instances = VertexBuffer::new_stream(device, GlyphInstance::STRIDE);
        Self::build(
            device,
            shaders,
            context,
            format,
            Program::GlyphInstanced,
            buffers,
            Some(instances),
        )
    }

    fn build(
        device: &D,
        shaders: &ShaderLibrary<D>,
        context: &mut Context,
        format: VertexFormat,
        program_kind: Program,
        buffers: BufferPair<D>,
        instances: Option<VertexBuffer<D>>,
    ) -> Result<Self, RenderError> {
        if buffers.vertices.stride() != format.stride() {
            return Err(report(RenderError::UnsupportedVertexFormat(format)));
        }
        let program = shaders.program_for(program_kind);
        let bindings = device.create_bindings(&program, None);

        Ok(Self {
            id: context.next_renderer_id(),
            format,
            program_kind,
            program,
            buffers,
            instances,
            bindings,
            tint: [1.0; 4],
            staged: Vec::new(),
            staged_count: 0,
            base_vertex: 0,
            frame: context.frame(),
            uniform_cursor: 0,
            vertex_cursor: 0,
            instance_cursor: 0,
        })
    }

    #[inline]
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    #[inline]
    pub fn program(&self) -> Program {
        self.program_kind
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.buffers.indices.count()
    }

    /// Samples `texture` from now on. Untextured formats are rejected.
    pub fn set_texture(&mut self, device: &D, texture: &Texture<D>) -> Result<(), RenderError> {
        if !self.format.has_texture() {
            return Err(report(RenderError::UnsupportedVertexFormat(self.format)));
        }
        self.bindings = device.create_bindings(&self.program, Some(texture.handle()));
        Ok(())
    }

    /// Colour every fragment is multiplied by.
    pub fn set_tint(&mut self, tint: [f32; 4]) {
        self.tint = tint;
    }

    #[inline]
    pub fn tint(&self) -> [f32; 4] {
        self.tint
    }

    /// Makes this the renderer subsequent draws go through, unbinding any other.
    pub fn bind(&mut self, context: &mut Context) {
        self.sync_frame(context);
        context.mark_bound(self.id);
    }

    #[inline]
    pub fn is_bound(&self, context: &Context) -> bool {
        context.is_bound(self.id)
    }

    /// Stages vertices for the next [`draw`](Self::draw) of a streaming renderer.
    ///
    /// Vertices past the frame's capacity are dropped and `BufferFull` is
    /// returned after the fitting prefix has been staged.
    pub fn push_vertices<V: Vertex>(
        &mut self,
        frame: &mut RenderFrame<'_, D>,
        vertices: &[V],
    ) -> Result<(), RenderError> {
        self.ensure_bound(frame.context)?;
        if self.buffers.vertices.usage() != BufferUsage::Stream {
            return Err(report(RenderError::ImmutableBuffer));
        }
        if V::FORMAT != self.format {
            return Err(report(RenderError::UnsupportedVertexFormat(V::FORMAT)));
        }

        let used = self.vertex_cursor + self.staged_count;
        let room = self.buffers.vertices.capacity().saturating_sub(used);
        let requested = vertices.len() as u32;
        let accepted = requested.min(room);

        self.staged.extend_from_slice(bytemuck::cast_slice(&vertices[..accepted as usize]));
        self.staged_count += accepted;

        if accepted < requested {
            return Err(report(RenderError::BufferFull { requested, accepted }));
        }
        Ok(())
    }

    /// Draws `count` indices starting at `start` with the current model matrix.
    pub fn draw(
        &mut self,
        frame: &mut RenderFrame<'_, D>,
        start: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        self.ensure_bound(frame.context)?;
        let len = self.buffers.indices.count();
        if start.checked_add(count).is_none_or(|end| end > len) {
            return Err(report(RenderError::IndexOutOfRange { start, count, len }));
        }
        if count == 0 {
            return Ok(());
        }

        let slot = take_slot(&mut self.uniform_cursor)?;
        self.flush_staged(frame.device);
        self.record(frame, slot, start..start + count, 0..1);
        Ok(())
    }

    /// Draws the whole index buffer.
    pub fn draw_all(&mut self, frame: &mut RenderFrame<'_, D>) -> Result<(), RenderError> {
        let count = self.index_count();
        self.draw(frame, 0, count)
    }

    /// Streams `instances` and draws the whole index buffer once per instance.
    ///
    /// Instances past the frame's capacity are dropped; the fitting prefix is
    /// still drawn and `BufferFull` is returned.
    pub fn draw_instances(
        &mut self,
        frame: &mut RenderFrame<'_, D>,
        instances: &[GlyphInstance],
    ) -> Result<(), RenderError> {
        self.ensure_bound(frame.context)?;
        let Some(buffer) = self.instances.as_mut() else {
            return Err(report(RenderError::UnsupportedVertexFormat(self.format)));
        };
        if instances.is_empty() {
            return Ok(());
        }

        let requested = instances.len() as u32;
        let accepted = requested.min(buffer.capacity().saturating_sub(self.instance_cursor));
        if accepted == 0 {
            return Err(report(RenderError::BufferFull { requested, accepted }));
        }

        let slot = take_slot(&mut self.uniform_cursor)?;
        let first = self.instance_cursor;
        buffer.write(frame.device, first, bytemuck::cast_slice(&instances[..accepted as usize]));
        self.instance_cursor += accepted;

        let indices = 0..self.buffers.indices.count();
        self.record(frame, slot, indices, first..first + accepted);

        if accepted < requested {
            return Err(report(RenderError::BufferFull { requested, accepted }));
        }
        Ok(())
    }

    fn ensure_bound(&mut self, context: &Context) -> Result<(), RenderError> {
        if !context.is_bound(self.id) {
            return Err(report(RenderError::NotBound));
        }
        self.sync_frame(context);
        Ok(())
    }

    /// Resets the per-frame cursors when the context has moved to a new frame.
    fn sync_frame(&mut self, context: &Context) {
        if context.frame() == self.frame {
            return;
        }
        self.frame = context.frame();
        self.uniform_cursor = 0;
        self.vertex_cursor = 0;
        self.instance_cursor = 0;
        self.base_vertex = 0;
        self.staged.clear();
        self.staged_count = 0;
    }

    fn flush_staged(&mut self, device: &D) {
        if self.staged_count == 0 {
            return;
        }
        self.buffers.vertices.write(device, self.vertex_cursor, &self.staged);
        self.base_vertex = self.vertex_cursor;
        self.vertex_cursor += self.staged_count;
        self.staged.clear();
        self.staged_count = 0;
    }

    fn record(
        &self,
        frame: &mut RenderFrame<'_, D>,
        slot: u32,
        indices: Range<u32>,
        instances: Range<u32>,
    ) {
        let uniforms = DrawUniforms {
            projection: frame.context.projection().to_cols_array_2d(),
            model: frame.context.model_matrix().to_cols_array_2d(),
            tint: self.tint,
        };
        frame.device.write_uniforms(&self.bindings, slot, &uniforms);

        let pass = &mut *frame.pass;
        pass.set_program(&self.program);
        pass.set_bindings(&self.bindings, slot);
        pass.set_vertex_buffer(0, self.buffers.vertices.handle());
        if let Some(buffer) = &self.instances {
            pass.set_vertex_buffer(1, buffer.handle());
        }
        pass.set_index_buffer(self.buffers.indices.handle());
        pass.draw_indexed(indices, self.base_vertex as i32, instances);
    }
}

/// Claims the next uniform slot of the frame.
fn take_slot(cursor: &mut u32) -> Result<u32, RenderError> {
    if *cursor >= UNIFORM_SLOTS {
        return Err(report(RenderError::BufferFull { requested: 1, accepted: 0 }));
    }
    let slot = *cursor;
    *cursor += 1;
    Ok(slot)
}
