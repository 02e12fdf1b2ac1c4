//! GPU rendering core.
//!
//! Convention:
//! - geometry is in window pixels (top-left origin, +Y down), projected by
//!   the orthographic matrix of the [`Context`].
//! - texture coordinates use a bottom-left origin; shaders flip `v` when sampling.
//! - every GPU object is owned by exactly one value and released on drop.

pub mod backend;
mod buffer;
mod context;
mod error;
mod frame;
mod renderer;
mod shader;
mod texture;
mod vertex;

pub use buffer::{BufferPair, BufferUsage, IndexBuffer, VertexBuffer, MAX_VERTICES};
pub use context::{Context, RendererId};
pub use error::RenderError;
pub use frame::RenderFrame;
pub use renderer::Renderer;
pub use shader::{Program, ShaderLibrary};
pub use texture::{load_texture, Texture, TextureError};
pub use vertex::{Vertex, VertexFormat, VertexPc, VertexPct, VertexPt};
