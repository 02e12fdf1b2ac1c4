//! Bitmap font loading and instanced text drawing.

pub mod bmfont;
mod font;
mod renderer;

pub use bmfont::{BmFont, CharRecord, FontError, HeaderError};
pub use font::{
    load_font, FontData, GlyphRecord, GlyphTable, FALLBACK_GLYPH, FIRST_GLYPH, GLYPH_COUNT,
    LAST_GLYPH,
};
pub use renderer::{GlyphInstance, TextRenderer};
