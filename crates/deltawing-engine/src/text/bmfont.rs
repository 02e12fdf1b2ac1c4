//! Parser for the binary (version 3) BMFont file layout.
//!
//! ```text
//! header   "BMF" + version:u8
//! block*   type:u8 size:u32le payload[size]
//!   1 info    14 reserved bytes, then the NUL-terminated font name
//!   2 common  skipped
//!   3 pages   NUL-terminated atlas file name
//!   4 chars   size / 20 records of 20 bytes:
//!             id:u32 x:u16 y:u16 w:u16 h:u16 reserved[7] channel:u8
//! ```
//!
//! Reads past the end of the data are logged and yield zero, so a truncated
//! file degrades instead of failing. Only the header is fatal.

use std::fmt;
use std::path::PathBuf;

use crate::render::TextureError;

const MAGIC: &[u8; 3] = b"BMF";
const SUPPORTED_VERSION: u8 = 3;

const BLOCK_INFO: u8 = 1;
const BLOCK_COMMON: u8 = 2;
const BLOCK_PAGES: u8 = 3;
const BLOCK_CHARS: u8 = 4;

const INFO_RESERVED: usize = 14;
const CHAR_RECORD_SIZE: usize = 20;
const CHAR_CHANNEL_OFFSET: usize = 19;

/// Why a font header was rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderError {
    /// The first three bytes are not `BMF`.
    BadMagic,
    UnsupportedVersion(u8),
    /// Fewer than four bytes.
    Truncated,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "missing BMF magic"),
            Self::UnsupportedVersion(v) => {
                write!(f, "unsupported BMF version {v} (expected {SUPPORTED_VERSION})")
            }
            Self::Truncated => write!(f, "file shorter than the BMF header"),
        }
    }
}

/// Failure to load a bitmap font. The font is unusable in every case.
#[derive(Debug)]
pub enum FontError {
    MalformedHeader(HeaderError),
    Io { path: PathBuf, source: std::io::Error },
    /// The file names no atlas page.
    MissingPage,
    Atlas(TextureError),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader(e) => write!(f, "malformed font header: {e}"),
            Self::Io { path, source } => {
                write!(f, "failed to read font {}: {source}", path.display())
            }
            Self::MissingPage => write!(f, "font has no atlas page"),
            Self::Atlas(e) => write!(f, "failed to load font atlas: {e}"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Atlas(e) => Some(e),
            Self::MalformedHeader(_) | Self::MissingPage => None,
        }
    }
}

/// One entry of the chars block, in atlas pixels (top-left origin).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CharRecord {
    pub id: u32,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub channel: u8,
}

/// Contents of a BMF file that the text renderer uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BmFont {
    pub name: String,
    /// Atlas file name, relative to the asset directory.
    pub page: Option<String>,
    pub chars: Vec<CharRecord>,
}

/// Parses a complete BMF file held in memory.
pub fn parse(bytes: &[u8]) -> Result<BmFont, FontError> {
    let mut reader = ByteReader::new(bytes);
    check_header(&mut reader).map_err(|e| {
        let err = FontError::MalformedHeader(e);
        log::error!("{err}");
        err
    })?;

    let mut font = BmFont::default();
    while !reader.is_empty() {
        let kind = reader.u8();
        let size = reader.u32() as usize;
        let payload = reader.take(size);

        match kind {
            BLOCK_INFO => {
                let mut block = ByteReader::new(payload);
                block.skip(INFO_RESERVED);
                font.name = block.string(size.saturating_sub(INFO_RESERVED));
            }
            BLOCK_COMMON => {}
            BLOCK_PAGES => {
                // Every page name has the same length; only the first is used.
                font.page = Some(ByteReader::new(payload).string(size));
            }
            BLOCK_CHARS => parse_chars(payload, size / CHAR_RECORD_SIZE, &mut font.chars),
            other => log::debug!("skipping BMF block type {other} ({size} bytes)"),
        }
    }
    Ok(font)
}

fn check_header(reader: &mut ByteReader<'_>) -> Result<(), HeaderError> {
    if reader.remaining() < 4 {
        return Err(HeaderError::Truncated);
    }
    let header = reader.take(4);
    if &header[..3] != MAGIC {
        return Err(HeaderError::BadMagic);
    }
    match header[3] {
        SUPPORTED_VERSION => Ok(()),
        v => Err(HeaderError::UnsupportedVersion(v)),
    }
}

/// Reads `count` records; a record cut short keeps its zero-filled tail.
///
/// Records that start past the end of the data carry nothing and are not
/// emitted, which also bounds the work done for a corrupt block size.
fn parse_chars(payload: &[u8], count: usize, out: &mut Vec<CharRecord>) {
    let mut r = ByteReader::new(payload);
    for index in 0..count {
        if r.is_empty() {
            log::warn!("chars block ends after {index} of {count} records");
            break;
        }
        out.push(parse_char(&mut r));
    }
}

fn parse_char(r: &mut ByteReader<'_>) -> CharRecord {
    let start = r.pos;
    let id = r.u32();
    let x = r.u16();
    let y = r.u16();
    let width = r.u16();
    let height = r.u16();
    r.skip(CHAR_CHANNEL_OFFSET - (r.pos - start));
    let channel = r.u8();
    CharRecord { id, x, y, width, height, channel }
}

/// Little-endian cursor that never reads out of bounds.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Up to `n` bytes; fewer (with a warning) at the end of the data.
    fn take(&mut self, n: usize) -> &'a [u8] {
        let available = n.min(self.remaining());
        if available < n {
            log::warn!("truncated font data: wanted {n} bytes at offset {}, have {available}", self.pos);
        }
        let bytes = &self.buf[self.pos..self.pos + available];
        self.pos += available;
        bytes
    }

    fn skip(&mut self, n: usize) {
        self.take(n);
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let bytes = self.take(N);
        let mut out = [0; N];
        if bytes.len() == N {
            out.copy_from_slice(bytes);
        }
        out
    }

    fn u8(&mut self) -> u8 {
        self.array::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    /// Reads `len` bytes and keeps everything before the first NUL.
    fn string(&mut self, len: usize) -> String {
        let bytes = self.take(len);
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }
}
