//! Shader programs, compiled once per vertex layout at startup.

use std::rc::Rc;

use super::backend::GpuDevice;
use super::VertexFormat;
use crate::text::GlyphInstance;

/// Every program the core can draw with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Program {
    PositionColor,
    PositionTexture,
    PositionColorTexture,
    /// Unit quad (PositionTexture) + one [`GlyphInstance`] per instance.
    GlyphInstanced,
}

impl Program {
    pub const ALL: [Program; 4] = [
        Program::PositionColor,
        Program::PositionTexture,
        Program::PositionColorTexture,
        Program::GlyphInstanced,
    ];

    /// Program for plain (non-instanced) geometry in `format`.
    pub const fn for_format(format: VertexFormat) -> Self {
        match format {
            VertexFormat::PositionColor => Self::PositionColor,
            VertexFormat::PositionTexture => Self::PositionTexture,
            VertexFormat::PositionColorTexture => Self::PositionColorTexture,
        }
    }

    /// Per-vertex layout consumed at buffer slot 0.
    pub const fn vertex_format(self) -> VertexFormat {
        match self {
            Self::PositionColor => VertexFormat::PositionColor,
            Self::PositionTexture | Self::GlyphInstanced => VertexFormat::PositionTexture,
            Self::PositionColorTexture => VertexFormat::PositionColorTexture,
        }
    }

    pub const fn is_instanced(self) -> bool {
        matches!(self, Self::GlyphInstanced)
    }

    pub const fn is_textured(self) -> bool {
        self.vertex_format().has_texture()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PositionColor => "deltawing position_color",
            Self::PositionTexture => "deltawing position_texture",
            Self::PositionColorTexture => "deltawing position_color_texture",
            Self::GlyphInstanced => "deltawing glyph",
        }
    }

    pub(crate) const fn source(self) -> &'static str {
        match self {
            Self::PositionColor => include_str!("shaders/position_color.wgsl"),
            Self::PositionTexture => include_str!("shaders/position_texture.wgsl"),
            Self::PositionColorTexture => include_str!("shaders/position_color_texture.wgsl"),
            Self::GlyphInstanced => include_str!("shaders/glyph.wgsl"),
        }
    }

    /// Vertex buffer layouts in slot order.
    pub(crate) fn buffer_layouts(self) -> Vec<wgpu::VertexBufferLayout<'static>> {
        let mut layouts = vec![self.vertex_format().layout()];
        if self.is_instanced() {
            layouts.push(GlyphInstance::layout());
        }
        layouts
    }

    const fn index(self) -> usize {
        match self {
            Self::PositionColor => 0,
            Self::PositionTexture => 1,
            Self::PositionColorTexture => 2,
            Self::GlyphInstanced => 3,
        }
    }
}

/// One compiled program per [`Program`], shared by every renderer.
///
/// Renderers hold a reference-counted handle; dropping a renderer detaches it
/// from the program without destroying it.
pub struct ShaderLibrary<D: GpuDevice> {
    programs: Vec<Rc<D::Program>>,
}

impl<D: GpuDevice> ShaderLibrary<D> {
    /// Compiles every program. Must run before any renderer is constructed.
    pub fn compile(device: &D) -> Self {
        let programs = Program::ALL
            .iter()
            .map(|&program| {
                log::debug!("compiling shader program: {}", program.label());
                Rc::new(device.compile_program(program))
            })
            .collect();
        Self { programs }
    }

    pub fn program_for(&self, program: Program) -> Rc<D::Program> {
        Rc::clone(&self.programs[program.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::mock::{MockCall, MockDevice};

    #[test]
    fn compiles_each_program_exactly_once() {
        let device = MockDevice::new();
        let library = ShaderLibrary::compile(&device);

        let compiled: Vec<_> = device
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::CompileProgram(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(compiled, Program::ALL.to_vec());

        for program in Program::ALL {
            assert_eq!(library.program_for(program).program, program);
        }
        assert_eq!(device.calls().len(), Program::ALL.len());
    }

    #[test]
    fn only_the_glyph_program_is_instanced() {
        for program in Program::ALL {
            assert_eq!(program.buffer_layouts().len(), if program.is_instanced() { 2 } else { 1 });
        }
        assert_eq!(Program::GlyphInstanced.vertex_format(), VertexFormat::PositionTexture);
    }

    #[test]
    fn format_programs_round_trip() {
        for format in [
            VertexFormat::PositionColor,
            VertexFormat::PositionTexture,
            VertexFormat::PositionColorTexture,
        ] {
            assert_eq!(Program::for_format(format).vertex_format(), format);
        }
    }
}
