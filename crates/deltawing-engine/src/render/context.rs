use glam::{Mat4, Vec2};

use crate::math::MatrixStack;

/// Identifies one renderer for bind tracking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RendererId(u64);

/// Render state shared by every renderer drawing into one window.
///
/// Holds the orthographic projection (top-left origin, +Y down), the model
/// matrix stack, the camera offset, the partial tick of the current frame and
/// which renderer is currently bound.
pub struct Context {
    width: u32,
    height: u32,
    camera: Vec2,
    projection: Mat4,
    matrix_stack: MatrixStack,
    partial_ticks: f32,
    frame: u64,
    bound: Option<RendererId>,
    next_id: u64,
}

impl Context {
    /// Creates a context for a `width x height` pixel window.
    ///
    /// The matrix stack starts with a single identity entry.
    pub fn new(width: u32, height: u32) -> Self {
        let matrix_stack = MatrixStack::with_base(Mat4::IDENTITY);
        let mut ctx = Self {
            width: width.max(1),
            height: height.max(1),
            camera: Vec2::ZERO,
            projection: Mat4::IDENTITY,
            matrix_stack,
            partial_ticks: 0.0,
            frame: 0,
            bound: None,
            next_id: 1,
        };
        ctx.rebuild_projection();
        ctx
    }

    /// Rebuilds the projection for a new window size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.rebuild_projection();
    }

    /// Moves the camera; the world point `camera` maps to the top-left corner.
    pub fn set_camera(&mut self, camera: Vec2) {
        self.camera = camera;
        self.rebuild_projection();
    }

    /// Starts a new frame: records the tick fraction and clears the bound renderer.
    pub fn begin_frame(&mut self, partial_ticks: f32) {
        self.partial_ticks = partial_ticks.clamp(0.0, 1.0);
        self.frame += 1;
        self.bound = None;
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Fraction of a tick elapsed since the last simulation step, in `[0, 1]`.
    #[inline]
    pub fn partial_ticks(&self) -> f32 {
        self.partial_ticks
    }

    /// Monotonic frame counter, advanced by [`begin_frame`](Self::begin_frame).
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Top of the matrix stack, or identity if the stack was popped empty.
    pub fn model_matrix(&self) -> Mat4 {
        self.matrix_stack.peek().unwrap_or(Mat4::IDENTITY)
    }

    #[inline]
    pub fn matrix_stack(&self) -> &MatrixStack {
        &self.matrix_stack
    }

    #[inline]
    pub fn matrix_stack_mut(&mut self) -> &mut MatrixStack {
        &mut self.matrix_stack
    }

    pub(crate) fn next_renderer_id(&mut self) -> RendererId {
        let id = RendererId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn mark_bound(&mut self, id: RendererId) {
        self.bound = Some(id);
    }

    pub(crate) fn is_bound(&self, id: RendererId) -> bool {
        self.bound == Some(id)
    }

    fn rebuild_projection(&mut self) {
        let ortho =
            Mat4::orthographic_rh(0.0, self.width as f32, self.height as f32, 0.0, -1.0, 1.0);
        self.projection = ortho * Mat4::from_translation((-self.camera).extend(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn ndc(ctx: &Context, x: f32, y: f32) -> Vec2 {
        let clip = ctx.projection() * Vec4::new(x, y, 0.0, 1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    #[test]
    fn projection_maps_top_left_origin_with_y_down() {
        let ctx = Context::new(800, 600);
        assert!(ndc(&ctx, 0.0, 0.0).abs_diff_eq(Vec2::new(-1.0, 1.0), 1e-6));
        assert!(ndc(&ctx, 800.0, 600.0).abs_diff_eq(Vec2::new(1.0, -1.0), 1e-6));
        assert!(ndc(&ctx, 400.0, 300.0).abs_diff_eq(Vec2::ZERO, 1e-6));
    }

    #[test]
    fn resize_rebuilds_projection_and_ignores_zero() {
        let mut ctx = Context::new(800, 600);
        ctx.resize(400, 200);
        assert!(ndc(&ctx, 400.0, 200.0).abs_diff_eq(Vec2::new(1.0, -1.0), 1e-6));

        ctx.resize(0, 100);
        assert_eq!(ctx.size(), (400, 200));
    }

    #[test]
    fn camera_offsets_the_view() {
        let mut ctx = Context::new(800, 600);
        ctx.set_camera(Vec2::new(100.0, 50.0));
        assert!(ndc(&ctx, 100.0, 50.0).abs_diff_eq(Vec2::new(-1.0, 1.0), 1e-6));
        assert!(ndc(&ctx, 500.0, 350.0).abs_diff_eq(Vec2::ZERO, 1e-6));
    }

    #[test]
    fn starts_with_identity_model_matrix() {
        let ctx = Context::new(10, 10);
        assert_eq!(ctx.matrix_stack().depth(), 1);
        assert_eq!(ctx.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn model_matrix_follows_the_stack_top() {
        let mut ctx = Context::new(10, 10);
        let stack = ctx.matrix_stack_mut();
        stack.push_copy().unwrap();
        stack.translate(Vec3::new(5.0, 6.0, 0.0)).unwrap();
        assert_eq!(ctx.model_matrix(), Mat4::from_translation(Vec3::new(5.0, 6.0, 0.0)));

        ctx.matrix_stack_mut().pop().unwrap();
        assert_eq!(ctx.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn begin_frame_clears_binding_and_clamps_partial() {
        let mut ctx = Context::new(10, 10);
        let id = ctx.next_renderer_id();
        ctx.mark_bound(id);
        assert!(ctx.is_bound(id));

        ctx.begin_frame(1.5);
        assert!(!ctx.is_bound(id));
        assert_eq!(ctx.partial_ticks(), 1.0);
        assert_eq!(ctx.frame(), 1);
    }

    #[test]
    fn renderer_ids_are_unique() {
        let mut ctx = Context::new(10, 10);
        let a = ctx.next_renderer_id();
        let b = ctx.next_renderer_id();
        assert_ne!(a, b);
    }
}
