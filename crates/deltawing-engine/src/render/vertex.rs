//! Vertex formats understood by the renderers.

use bytemuck::{Pod, Zeroable};

/// Fixed vertex layout a [`Renderer`](super::Renderer) is specialised for.
///
/// Attribute 0 is always a 3-float position; the remaining attributes depend
/// on the variant. The format is fixed for the lifetime of a renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    /// position + RGBA color
    PositionColor,
    /// position + UV
    PositionTexture,
    /// position + RGBA color + UV
    PositionColorTexture,
}

impl VertexFormat {
    /// Size in bytes of one vertex record.
    pub const fn stride(self) -> u32 {
        match self {
            Self::PositionColor => std::mem::size_of::<VertexPc>() as u32,
            Self::PositionTexture => std::mem::size_of::<VertexPt>() as u32,
            Self::PositionColorTexture => std::mem::size_of::<VertexPct>() as u32,
        }
    }

    /// Whether the format carries texture coordinates (and therefore a sampler binding).
    pub const fn has_texture(self) -> bool {
        matches!(self, Self::PositionTexture | Self::PositionColorTexture)
    }

    pub(crate) fn layout(self) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match self {
            Self::PositionColor => &VertexPc::ATTRS,
            Self::PositionTexture => &VertexPt::ATTRS,
            Self::PositionColorTexture => &VertexPct::ATTRS,
        };
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

/// A CPU vertex record matching one [`VertexFormat`].
pub trait Vertex: Pod {
    const FORMAT: VertexFormat;
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPc {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPt {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPct {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl VertexPc {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

impl VertexPt {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    #[inline]
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

impl VertexPct {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2];

    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4], uv: [f32; 2]) -> Self {
        Self { position, color, uv }
    }
}

impl Vertex for VertexPc {
    const FORMAT: VertexFormat = VertexFormat::PositionColor;
}

impl Vertex for VertexPt {
    const FORMAT: VertexFormat = VertexFormat::PositionTexture;
}

impl Vertex for VertexPct {
    const FORMAT: VertexFormat = VertexFormat::PositionColorTexture;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_float_counts() {
        assert_eq!(VertexFormat::PositionColor.stride(), 7 * 4);
        assert_eq!(VertexFormat::PositionTexture.stride(), 5 * 4);
        assert_eq!(VertexFormat::PositionColorTexture.stride(), 9 * 4);
    }

    #[test]
    fn position_is_always_attribute_zero() {
        for format in [
            VertexFormat::PositionColor,
            VertexFormat::PositionTexture,
            VertexFormat::PositionColorTexture,
        ] {
            let layout = format.layout();
            let first = layout.attributes[0];
            assert_eq!(first.shader_location, 0);
            assert_eq!(first.offset, 0);
            assert_eq!(first.format, wgpu::VertexFormat::Float32x3);
            assert_eq!(layout.array_stride, format.stride() as u64);
        }
    }

    #[test]
    fn texture_formats_are_flagged() {
        assert!(!VertexFormat::PositionColor.has_texture());
        assert!(VertexFormat::PositionTexture.has_texture());
        assert!(VertexFormat::PositionColorTexture.has_texture());
    }
}
