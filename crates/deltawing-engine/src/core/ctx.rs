use crate::render::backend::wgpu_device::WgpuDevice;
use crate::render::{Context, RenderFrame, ShaderLibrary};

/// Render state lent to the application outside of drawing: enough to
/// create renderers, load fonts and textures, and drive the matrix stack.
pub struct Graphics<'a> {
    pub device: &'a WgpuDevice,
    pub shaders: &'a ShaderLibrary<WgpuDevice>,
    pub context: &'a mut Context,
}

/// Per-frame drawing state passed to [`App::render`](super::App::render).
pub type Frame<'a> = RenderFrame<'a, WgpuDevice>;
