use super::backend::{GpuDevice, GpuPass};
use super::context::Context;

/// Everything a draw call needs for one frame: the device for uploads, the
/// shared render state and the pass commands are recorded into.
pub struct RenderFrame<'a, D: GpuDevice> {
    pub device: &'a D,
    pub context: &'a mut Context,
    pub pass: &'a mut dyn GpuPass<D>,
}

impl<'a, D: GpuDevice> RenderFrame<'a, D> {
    pub fn new(device: &'a D, context: &'a mut Context, pass: &'a mut dyn GpuPass<D>) -> Self {
        Self { device, context, pass }
    }

    /// Interpolation factor of this frame, see [`Context::partial_ticks`].
    #[inline]
    pub fn partial_ticks(&self) -> f32 {
        self.context.partial_ticks()
    }
}
