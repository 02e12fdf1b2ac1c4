use std::path::Path;

use glam::Vec2;

use super::bmfont::{self, CharRecord, FontError};
use crate::render::backend::GpuDevice;
use crate::render::{load_texture, Texture};

/// First character code with a glyph (space).
pub const FIRST_GLYPH: u32 = 32;
/// Last character code with a glyph (`~`).
pub const LAST_GLYPH: u32 = 126;
pub const GLYPH_COUNT: usize = (LAST_GLYPH - FIRST_GLYPH + 1) as usize;
/// Drawn in place of any character outside `FIRST_GLYPH..=LAST_GLYPH`.
pub const FALLBACK_GLYPH: char = '?';

const CHAR_CODE_MASK: u32 = 0xFF;

/// Atlas placement of one printable character.
///
/// `uv`/`uv_size` use a bottom-left origin: `uv` is the lower-left corner of
/// the glyph's rectangle, derived once from the atlas size at load time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphRecord {
    pub code: u32,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub uv: Vec2,
    pub uv_size: Vec2,
    /// Horizontal cursor advance in pixels (the glyph width).
    pub advance: f32,
}

impl GlyphRecord {
    fn from_char(code: u32, record: &CharRecord, atlas_width: f32, atlas_height: f32) -> Self {
        let (x, y) = (record.x as f32, record.y as f32);
        let (w, h) = (record.width as f32, record.height as f32);
        Self {
            code,
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
            uv: Vec2::new(x / atlas_width, 1.0 - y / atlas_height - h / atlas_height),
            uv_size: Vec2::new(w / atlas_width, h / atlas_height),
            advance: w,
        }
    }

    fn empty(code: u32) -> Self {
        Self {
            code,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            uv: Vec2::ZERO,
            uv_size: Vec2::ZERO,
            advance: 0.0,
        }
    }
}

/// Dense glyph array covering `FIRST_GLYPH..=LAST_GLYPH`.
#[derive(Debug, Clone)]
pub struct GlyphTable {
    glyphs: Vec<GlyphRecord>,
}

impl GlyphTable {
    /// Builds the table from parsed char records and the atlas size in pixels.
    ///
    /// Only the low byte of a record's id is used. Records whose low byte is
    /// outside the printable range are ignored; printable codes the font does
    /// not define get an empty glyph.
    pub fn build(chars: &[CharRecord], atlas_width: u32, atlas_height: u32) -> Self {
        let (tw, th) = (atlas_width.max(1) as f32, atlas_height.max(1) as f32);
        let mut glyphs: Vec<GlyphRecord> =
            (FIRST_GLYPH..=LAST_GLYPH).map(GlyphRecord::empty).collect();

        let mut ignored = 0;
        for record in chars {
            let code = record.id & CHAR_CODE_MASK;
            match slot(code) {
                Some(i) => glyphs[i] = GlyphRecord::from_char(code, record, tw, th),
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            log::debug!("font: ignored {ignored} glyphs outside the printable ASCII range");
        }
        Self { glyphs }
    }

    /// Glyph drawn for `ch`, substituting [`FALLBACK_GLYPH`] outside the range.
    pub fn glyph(&self, ch: char) -> &GlyphRecord {
        let index = slot(ch as u32).or_else(|| slot(FALLBACK_GLYPH as u32)).unwrap_or(0);
        &self.glyphs[index]
    }

    /// Sum of the advances of every glyph in `text`.
    pub fn string_width(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.glyph(ch).advance).sum()
    }

    /// Height of the tallest glyph.
    pub fn line_height(&self) -> f32 {
        self.glyphs.iter().map(|g| g.height).max().unwrap_or(0) as f32
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.glyphs.iter()
    }
}

fn slot(code: u32) -> Option<usize> {
    (FIRST_GLYPH..=LAST_GLYPH)
        .contains(&code)
        .then(|| (code - FIRST_GLYPH) as usize)
}

/// A loaded bitmap font: its atlas texture plus the glyph table.
pub struct FontData<D: GpuDevice> {
    name: String,
    atlas: Texture<D>,
    glyphs: GlyphTable,
}

impl<D: GpuDevice> FontData<D> {
    /// Assembles a font from an uploaded atlas and its char records.
    pub fn new(name: impl Into<String>, atlas: Texture<D>, chars: &[CharRecord]) -> Self {
        let glyphs = GlyphTable::build(chars, atlas.width(), atlas.height());
        Self { name: name.into(), atlas, glyphs }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atlas(&self) -> &Texture<D> {
        &self.atlas
    }

    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    pub fn glyph(&self, ch: char) -> &GlyphRecord {
        self.glyphs.glyph(ch)
    }

    pub fn string_width(&self, text: &str) -> f32 {
        self.glyphs.string_width(text)
    }

    pub fn line_height(&self) -> f32 {
        self.glyphs.line_height()
    }
}

/// Loads a BMF font file and its atlas page from `asset_dir`.
pub fn load_font<D: GpuDevice>(
    device: &D,
    font_path: &Path,
    asset_dir: &Path,
) -> Result<FontData<D>, FontError> {
    let bytes = std::fs::read(font_path).map_err(|source| {
        let err = FontError::Io { path: font_path.to_path_buf(), source };
        log::error!("{err}");
        err
    })?;
    let parsed = bmfont::parse(&bytes)?;

    let Some(page) = parsed.page.as_deref() else {
        log::error!("font {}: {}", font_path.display(), FontError::MissingPage);
        return Err(FontError::MissingPage);
    };
    let atlas_path = asset_dir.join(page);
    let atlas = load_texture(device, &atlas_path).map_err(FontError::Atlas)?;

    log::info!("loaded bitmap font: {} @ {}", parsed.name, atlas_path.display());
    Ok(FontData::new(parsed.name, atlas, &parsed.chars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::mock::{MockCall, MockDevice};
    use crate::text::bmfont::tests::{record, FontBuilder};
    use crate::text::bmfont::HeaderError;

    const TOL: f32 = 1e-6;

    #[test]
    fn uv_rectangle_flips_to_bottom_left_origin() {
        let chars = [record(65, 64, 32, 16, 24), record(66, 0, 0, 256, 128)];
        let table = GlyphTable::build(&chars, 256, 128);

        for (ch, r) in [('A', chars[0]), ('B', chars[1])] {
            let g = table.glyph(ch);
            let (x, y, w, h) = (r.x as f32, r.y as f32, r.width as f32, r.height as f32);
            assert_eq!((g.x, g.y, g.width, g.height), (r.x, r.y, r.width, r.height));
            assert!((g.uv.x - x / 256.0).abs() < TOL);
            assert!((g.uv.y - (1.0 - y / 128.0 - h / 128.0)).abs() < TOL);
            assert!((g.uv_size.x - w / 256.0).abs() < TOL);
            assert!((g.uv_size.y - h / 128.0).abs() < TOL);
            assert_eq!(g.advance, w);
        }
        assert!(table.glyph('B').uv.abs_diff_eq(Vec2::ZERO, TOL));
    }

    #[test]
    fn out_of_range_characters_use_the_fallback() {
        let table = GlyphTable::build(&[record(63, 5, 5, 9, 14), record(65, 0, 0, 7, 14)], 64, 64);
        let fallback = *table.glyph('?');

        for ch in ['\n', '\u{7f}', 'é', '🦀', '\0'] {
            assert_eq!(*table.glyph(ch), fallback);
        }
        assert_eq!(table.string_width("\té"), 2.0 * fallback.advance);
    }

    #[test]
    fn records_outside_the_range_are_ignored() {
        let table = GlyphTable::build(&[record(10, 1, 1, 30, 30), record(200 + 256, 1, 1, 30, 30)], 64, 64);
        assert_eq!(table.iter().count(), GLYPH_COUNT);
        assert!(table.iter().all(|g| g.width == 0));
        assert_eq!(table.line_height(), 0.0);
    }

    #[test]
    fn only_the_low_byte_of_an_id_is_used() {
        let table = GlyphTable::build(&[record(65 + 256, 1, 1, 3, 5)], 64, 64);
        let g = table.glyph('A');
        assert_eq!(g.code, 65);
        assert_eq!(g.width, 3);
        assert_eq!(g.advance, 3.0);
    }

    #[test]
    fn string_width_sums_advances() {
        let table = GlyphTable::build(
            &[record(72, 0, 0, 10, 20), record(105, 10, 0, 4, 22), record(32, 0, 0, 6, 0)],
            64,
            64,
        );
        assert_eq!(table.string_width(""), 0.0);
        assert_eq!(table.string_width("Hi"), 14.0);
        assert_eq!(table.string_width("Hi Hi"), 34.0);
        assert_eq!(table.line_height(), 22.0);
    }

    #[test]
    fn missing_printable_codes_are_empty() {
        let table = GlyphTable::build(&[], 64, 64);
        let g = table.glyph('x');
        assert_eq!(g.code, 'x' as u32);
        assert_eq!(g.advance, 0.0);
    }

    fn write_font(dir: &Path, header: [u8; 4], page: Option<&str>) -> std::path::PathBuf {
        let mut builder = FontBuilder::with_header(header).info("Test Mono").common();
        if let Some(page) = page {
            builder = builder.page(page);
        }
        let bytes = builder.chars(&[record(65, 0, 0, 8, 16), record(63, 8, 0, 8, 16)]).build();
        let path = dir.join("test.fnt");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn loads_font_and_atlas_from_asset_dir() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::new(32, 16).save(dir.path().join("test_0.png")).unwrap();
        let path = write_font(dir.path(), *b"BMF\x03", Some("test_0.png"));

        let device = MockDevice::new();
        let font = load_font(&device, &path, dir.path()).unwrap();

        assert_eq!(font.name(), "Test Mono");
        assert_eq!((font.atlas().width(), font.atlas().height()), (32, 16));
        assert!((font.glyph('?').uv.x - 0.25).abs() < TOL);
        assert_eq!(font.string_width("A?"), 16.0);

        let atlas = font.atlas().handle().id;
        drop(font);
        assert_eq!(device.count(|c| *c == MockCall::ReleaseTexture { id: atlas }), 1);
    }

    #[test]
    fn version_2_yields_no_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_font(dir.path(), *b"BMF\x02", Some("test_0.png"));
        let device = MockDevice::new();

        let result = load_font(&device, &path, dir.path());
        assert!(matches!(
            result,
            Err(FontError::MalformedHeader(HeaderError::UnsupportedVersion(2)))
        ));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn missing_page_or_atlas_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let device = MockDevice::new();

        let path = write_font(dir.path(), *b"BMF\x03", None);
        assert!(matches!(load_font(&device, &path, dir.path()), Err(FontError::MissingPage)));

        let path = write_font(dir.path(), *b"BMF\x03", Some("absent.png"));
        assert!(matches!(load_font(&device, &path, dir.path()), Err(FontError::Atlas(_))));
    }

    #[test]
    fn missing_font_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let device = MockDevice::new();
        let result = load_font(&device, &dir.path().join("none.fnt"), dir.path());
        assert!(matches!(result, Err(FontError::Io { .. })));
    }
}
