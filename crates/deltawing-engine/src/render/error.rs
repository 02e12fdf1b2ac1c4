use std::fmt;

use super::VertexFormat;

/// Recoverable renderer failure.
///
/// Every variant is logged where it is raised; the offending operation is
/// skipped (or truncated, for `BufferFull`) and GPU state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// `draw`/`push_vertices` on a renderer that is not the currently bound one.
    NotBound,
    /// A per-frame capacity was exceeded; only `accepted` of `requested` items were kept.
    BufferFull { requested: u32, accepted: u32 },
    /// The operation is not available for this vertex format.
    UnsupportedVertexFormat(VertexFormat),
    /// Vertices were pushed into a renderer whose vertex buffer is static.
    ImmutableBuffer,
    /// A static buffer was created without initial data.
    EmptyBuffer,
    /// `[start, start + count)` does not fit inside the index buffer.
    IndexOutOfRange { start: u32, count: u32, len: u32 },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBound => write!(f, "renderer is not bound"),
            Self::BufferFull { requested, accepted } => {
                write!(f, "buffer full: dropped {} of {requested} items", requested - accepted)
            }
            Self::UnsupportedVertexFormat(format) => {
                write!(f, "unsupported vertex format for this operation: {format:?}")
            }
            Self::ImmutableBuffer => write!(f, "vertex buffer is static"),
            Self::EmptyBuffer => write!(f, "static buffer created without data"),
            Self::IndexOutOfRange { start, count, len } => {
                write!(f, "index range {start}..{} exceeds {len} indices", start.saturating_add(*count))
            }
        }
    }
}

impl std::error::Error for RenderError {}

pub(crate) fn report(err: RenderError) -> RenderError {
    log::warn!("{err}");
    err
}
