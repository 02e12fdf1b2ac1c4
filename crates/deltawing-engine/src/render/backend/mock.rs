//! Recording GPU backend for tests.
//!
//! Every device operation is appended to a shared call log; dropping a mock
//! resource logs its release, so tests can check that each resource is freed
//! exactly once. [`MockPass`] records the commands of one render pass.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use super::{BufferDesc, BufferKind, DrawUniforms, GpuDevice, GpuPass, TextureImage};
use crate::render::shader::Program;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MockCall {
    CreateBuffer { id: u32, kind: BufferKind, size: u64, initialized: bool },
    WriteBuffer { id: u32, offset: u64, data: Vec<u8> },
    ReleaseBuffer { id: u32 },
    CreateTexture { id: u32, width: u32, height: u32 },
    ReleaseTexture { id: u32 },
    CompileProgram(Program),
    CreateBindings { program: Program, texture: Option<u32> },
    WriteUniforms { slot: u32, uniforms: DrawUniforms },
}

type CallLog = Rc<RefCell<Vec<MockCall>>>;

pub(crate) struct MockDevice {
    log: CallLog,
    next_id: Cell<u32>,
}

impl MockDevice {
    pub(crate) fn new() -> Self {
        Self { log: Rc::default(), next_id: Cell::new(1) }
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.log.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub(crate) fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Last uniform block written, if any.
    pub(crate) fn last_uniforms(&self) -> Option<(u32, DrawUniforms)> {
        self.log.borrow().iter().rev().find_map(|c| match c {
            MockCall::WriteUniforms { slot, uniforms } => Some((*slot, *uniforms)),
            _ => None,
        })
    }

    /// Data of every write into buffer `id`, in order.
    pub(crate) fn writes_to(&self, id: u32) -> Vec<(u64, Vec<u8>)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|c| match c {
                MockCall::WriteBuffer { id: w, offset, data } if *w == id => {
                    Some((*offset, data.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn record(&self, call: MockCall) {
        self.log.borrow_mut().push(call);
    }
}

#[derive(Debug)]
pub(crate) struct MockBuffer {
    pub(crate) id: u32,
    log: CallLog,
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        self.log.borrow_mut().push(MockCall::ReleaseBuffer { id: self.id });
    }
}

#[derive(Debug)]
pub(crate) struct MockTexture {
    pub(crate) id: u32,
    log: CallLog,
}

impl Drop for MockTexture {
    fn drop(&mut self) {
        self.log.borrow_mut().push(MockCall::ReleaseTexture { id: self.id });
    }
}

#[derive(Debug)]
pub(crate) struct MockProgram {
    pub(crate) program: Program,
}

#[derive(Debug)]
pub(crate) struct MockBindings {
    pub(crate) texture: Option<u32>,
}

impl GpuDevice for MockDevice {
    type Buffer = MockBuffer;
    type Texture = MockTexture;
    type Program = MockProgram;
    type Bindings = MockBindings;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> MockBuffer {
        let id = self.id();
        self.record(MockCall::CreateBuffer {
            id,
            kind: desc.kind,
            size: desc.size,
            initialized: desc.contents.is_some(),
        });
        MockBuffer { id, log: Rc::clone(&self.log) }
    }

    fn write_buffer(&self, buffer: &MockBuffer, offset: u64, data: &[u8]) {
        self.record(MockCall::WriteBuffer { id: buffer.id, offset, data: data.to_vec() });
    }

    fn create_texture(&self, image: &TextureImage<'_>) -> MockTexture {
        let id = self.id();
        self.record(MockCall::CreateTexture { id, width: image.width, height: image.height });
        MockTexture { id, log: Rc::clone(&self.log) }
    }

    fn compile_program(&self, program: Program) -> MockProgram {
        self.record(MockCall::CompileProgram(program));
        MockProgram { program }
    }

    fn create_bindings(&self, program: &MockProgram, texture: Option<&MockTexture>) -> MockBindings {
        let texture = texture.map(|t| t.id);
        self.record(MockCall::CreateBindings { program: program.program, texture });
        MockBindings { texture }
    }

    fn write_uniforms(&self, _bindings: &MockBindings, slot: u32, uniforms: &DrawUniforms) {
        self.record(MockCall::WriteUniforms { slot, uniforms: *uniforms });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PassCall {
    SetProgram(Program),
    SetBindings { slot: u32 },
    SetVertexBuffer { slot: u32, id: u32 },
    SetIndexBuffer { id: u32 },
    DrawIndexed { indices: Range<u32>, base_vertex: i32, instances: Range<u32> },
}

#[derive(Debug, Default)]
pub(crate) struct MockPass {
    pub(crate) calls: Vec<PassCall>,
}

impl MockPass {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn draws(&self) -> Vec<&PassCall> {
        self.calls.iter().filter(|c| matches!(c, PassCall::DrawIndexed { .. })).collect()
    }
}

impl GpuPass<MockDevice> for MockPass {
    fn set_program(&mut self, program: &MockProgram) {
        self.calls.push(PassCall::SetProgram(program.program));
    }

    fn set_bindings(&mut self, _bindings: &MockBindings, slot: u32) {
        self.calls.push(PassCall::SetBindings { slot });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &MockBuffer) {
        self.calls.push(PassCall::SetVertexBuffer { slot, id: buffer.id });
    }

    fn set_index_buffer(&mut self, buffer: &MockBuffer) {
        self.calls.push(PassCall::SetIndexBuffer { id: buffer.id });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.calls.push(PassCall::DrawIndexed { indices, base_vertex, instances });
    }
}
