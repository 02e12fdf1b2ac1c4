use bytemuck::{Pod, Zeroable};

use super::font::FontData;
use crate::render::backend::GpuDevice;
use crate::render::{
    BufferPair, Context, IndexBuffer, RenderError, RenderFrame, Renderer, ShaderLibrary,
    VertexBuffer, VertexFormat, VertexPt,
};

/// Per-glyph instance record streamed for every `draw_string`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GlyphInstance {
    /// Top-left corner on screen, in pixels.
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// Lower-left atlas corner (bottom-left origin).
    pub uv: [f32; 2],
    pub uv_size: [f32; 2],
    pub advance: f32,
}

impl GlyphInstance {
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x2,
        5 => Float32x2,
        6 => Float32,
    ];

    /// Instance-rate layout for vertex buffer slot 1.
    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit quad every glyph is stamped from. The UV channel carries the corner
/// in screen orientation (0,0 = top-left); the glyph shader maps it into the
/// instance's atlas rectangle.
const QUAD: [VertexPt; 4] = [
    VertexPt::new([0.0, 0.0, 0.0], [0.0, 0.0]),
    VertexPt::new([1.0, 0.0, 0.0], [1.0, 0.0]),
    VertexPt::new([1.0, 1.0, 0.0], [1.0, 1.0]),
    VertexPt::new([0.0, 1.0, 0.0], [0.0, 1.0]),
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Draws single-line strings with a bitmap font, one instanced draw per call.
pub struct TextRenderer<D: GpuDevice> {
    renderer: Renderer<D>,
    font: FontData<D>,
    scale: f32,
    scratch: Vec<GlyphInstance>,
}

impl<D: GpuDevice> TextRenderer<D> {
    pub fn new(
        device: &D,
        shaders: &ShaderLibrary<D>,
        context: &mut Context,
        font: FontData<D>,
    ) -> Result<Self, RenderError> {
        let buffers = BufferPair::new(
            VertexBuffer::from_vertices(device, &QUAD)?,
            IndexBuffer::new(device, &QUAD_INDICES)?,
        );
        let mut renderer = Renderer::new_instanced(
            device,
            shaders,
            context,
            VertexFormat::PositionTexture,
            buffers,
        )?;
        renderer.set_texture(device, font.atlas())?;

        Ok(Self { renderer, font, scale: 1.0, scratch: Vec::new() })
    }

    pub fn font(&self) -> &FontData<D> {
        &self.font
    }

    /// Multiplier applied to glyph size, advance and measured widths.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.renderer.set_tint(color);
    }

    pub fn bind(&mut self, context: &mut Context) {
        self.renderer.bind(context);
    }

    /// Lays `text` out with its top-left corner at `(x, y)`.
    pub fn layout(&self, text: &str, x: f32, y: f32) -> Vec<GlyphInstance> {
        let mut out = Vec::with_capacity(text.len());
        self.layout_into(text, x, y, &mut out);
        out
    }

    fn layout_into(&self, text: &str, x: f32, y: f32, out: &mut Vec<GlyphInstance>) {
        let s = self.scale;
        let mut cursor = 0.0;
        for ch in text.chars() {
            let g = self.font.glyph(ch);
            let advance = g.advance * s;
            out.push(GlyphInstance {
                position: [x + cursor, y],
                size: [g.width as f32 * s, g.height as f32 * s],
                uv: g.uv.to_array(),
                uv_size: g.uv_size.to_array(),
                advance,
            });
            cursor += advance;
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn draw_string(
        &mut self,
        frame: &mut RenderFrame<'_, D>,
        text: &str,
        x: f32,
        y: f32,
    ) -> Result<(), RenderError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        self.layout_into(text, x, y, &mut scratch);
        let result = self.renderer.draw_instances(frame, &scratch);
        self.scratch = scratch;
        result
    }

    /// Width of `text` in pixels at the current scale.
    pub fn string_width(&self, text: &str) -> f32 {
        self.font.string_width(text) * self.scale
    }

    /// Tallest glyph height at the current scale.
    pub fn line_height(&self) -> f32 {
        self.font.line_height() * self.scale
    }
}
