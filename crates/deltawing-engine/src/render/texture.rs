use std::fmt;
use std::path::{Path, PathBuf};

use super::backend::{GpuDevice, TextureImage};

/// Failure to load a texture from disk.
#[derive(Debug)]
pub enum TextureError {
    Io { path: PathBuf, source: std::io::Error },
    Decode { path: PathBuf, source: image::ImageError },
    /// The decoded image has a channel count outside `1..=4`.
    UnknownChannelCount { path: PathBuf, channels: u8 },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read texture {}: {source}", path.display()),
            Self::Decode { path, source } => {
                write!(f, "failed to decode texture {}: {source}", path.display())
            }
            Self::UnknownChannelCount { path, channels } => {
                write!(f, "texture {} has unsupported channel count {channels}", path.display())
            }
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::UnknownChannelCount { .. } => None,
        }
    }
}

/// A GPU texture together with the dimensions of its source image.
pub struct Texture<D: GpuDevice> {
    width: u32,
    height: u32,
    channels: u8,
    handle: D::Texture,
}

impl<D: GpuDevice> Texture<D> {
    /// Uploads tightly packed RGBA8 pixels. `channels` records the source format.
    pub fn from_rgba(device: &D, width: u32, height: u32, channels: u8, rgba: &[u8]) -> Self {
        let handle = device.create_texture(&TextureImage { width, height, rgba });
        Self { width, height, channels, handle }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count of the decoded image before expansion to RGBA.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    #[inline]
    pub fn handle(&self) -> &D::Texture {
        &self.handle
    }
}

/// Decodes the image at `path`, expands it to RGBA8 and uploads it.
pub fn load_texture<D: GpuDevice>(device: &D, path: &Path) -> Result<Texture<D>, TextureError> {
    let result = decode(path);
    let (width, height, channels, rgba) = match result {
        Ok(decoded) => decoded,
        Err(err) => {
            log::error!("{err}");
            return Err(err);
        }
    };
    log::debug!("loaded texture {} ({width}x{height}, {channels} channels)", path.display());
    Ok(Texture::from_rgba(device, width, height, channels, &rgba))
}

fn decode(path: &Path) -> Result<(u32, u32, u8, Vec<u8>), TextureError> {
    let bytes = std::fs::read(path)
        .map_err(|source| TextureError::Io { path: path.to_path_buf(), source })?;
    let image = image::load_from_memory(&bytes)
        .map_err(|source| TextureError::Decode { path: path.to_path_buf(), source })?;

    let channels = image.color().channel_count();
    if !(1..=4).contains(&channels) {
        return Err(TextureError::UnknownChannelCount { path: path.to_path_buf(), channels });
    }
    let rgba = image.to_rgba8();
    Ok((rgba.width(), rgba.height(), channels, rgba.into_raw()))
}
