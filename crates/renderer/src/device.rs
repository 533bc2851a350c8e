//! Graphics device interface: handles, formats, sampler parameters.

use thiserror::Error;

use crate::caps::DeviceCaps;

/// GPU texture object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// GPU buffer object name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// What a texture object is bound as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

/// Destination of a single image upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Texture2D,
    Cube(CubeFace),
}

impl ImageTarget {
    pub fn texture_target(self) -> TextureTarget {
        match self {
            ImageTarget::Texture2D => TextureTarget::Texture2D,
            ImageTarget::Cube(_) => TextureTarget::CubeMap,
        }
    }
}

/// Layout of client pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Luminance => 1,
            PixelFormat::LuminanceAlpha => 2,
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            PixelFormat::Rgba | PixelFormat::Bgra => 4,
        }
    }
}

/// How the GPU stores the texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
    Srgb8,
    Srgb8Alpha8,
    /// Driver-chosen compression of uncompressed uploads.
    CompressedLuminance,
    CompressedLuminanceAlpha,
    CompressedRgb,
    CompressedRgba,
    CompressedSrgb,
    CompressedSrgbAlpha,
    /// Pre-compressed S3TC blocks.
    Dxt1,
    Dxt3,
    Dxt5,
    SrgbDxt1,
    SrgbDxt3,
    SrgbDxt5,
}

impl InternalFormat {
    /// Bytes per 4x4 block for pre-compressed formats.
    pub fn block_bytes(self) -> Option<usize> {
        match self {
            InternalFormat::Dxt1 | InternalFormat::SrgbDxt1 => Some(8),
            InternalFormat::Dxt3
            | InternalFormat::Dxt5
            | InternalFormat::SrgbDxt3
            | InternalFormat::SrgbDxt5 => Some(16),
            _ => None,
        }
    }

    #[inline]
    pub fn is_block_compressed(self) -> bool {
        self.block_bytes().is_some()
    }

    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            InternalFormat::Srgb8
                | InternalFormat::Srgb8Alpha8
                | InternalFormat::CompressedSrgb
                | InternalFormat::CompressedSrgbAlpha
                | InternalFormat::SrgbDxt1
                | InternalFormat::SrgbDxt3
                | InternalFormat::SrgbDxt5
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapLinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MagFilter {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SamplerParam {
    WrapS(Wrap),
    WrapT(Wrap),
    WrapR(Wrap),
    MinFilter(MinFilter),
    MagFilter(MagFilter),
    MaxAnisotropy(f32),
    /// Legacy path: rebuild mips automatically whenever level 0 changes.
    AutoGenerateMipmap(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Uncompressed pixel upload for one level of one image target.
#[derive(Clone, Copy, Debug)]
pub struct ImageUpload<'a> {
    pub target: ImageTarget,
    pub level: u32,
    pub internal_format: InternalFormat,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Tightly packed rows.
    pub data: &'a [u8],
}

impl ImageUpload<'_> {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Pre-compressed block upload for one level.
#[derive(Clone, Copy, Debug)]
pub struct CompressedUpload<'a> {
    pub target: ImageTarget,
    pub level: u32,
    pub internal_format: InternalFormat,
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

#[derive(Debug, Error, PartialEq)]
pub enum DeviceError {
    #[error("no texture bound to {0:?}")]
    NothingBound(TextureTarget),
    #[error("upload of {width}x{height} expects {expected} bytes, got {actual}")]
    ShortUpload {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("{0:?} is not a block-compressed format")]
    NotBlockCompressed(InternalFormat),
    #[error("{0:?} cannot be used for an uncompressed upload")]
    UnexpectedBlockFormat(InternalFormat),
    #[error("zero-sized upload")]
    EmptyUpload,
}

/// Everything the content core needs from a rendering context.
///
/// Calls follow bind-then-modify semantics: sampler changes, uploads and mip
/// generation apply to the texture currently bound to the matching target.
pub trait GraphicsDevice {
    fn caps(&self) -> &DeviceCaps;

    fn create_texture(&mut self) -> TextureId;
    fn delete_texture(&mut self, id: TextureId);
    fn bind_texture(&mut self, target: TextureTarget, id: TextureId);

    fn set_sampler(&mut self, target: TextureTarget, param: SamplerParam)
    -> Result<(), DeviceError>;
    fn upload_image(&mut self, upload: &ImageUpload<'_>) -> Result<(), DeviceError>;
    fn upload_compressed(&mut self, upload: &CompressedUpload<'_>) -> Result<(), DeviceError>;
    fn generate_mipmap(&mut self, target: TextureTarget) -> Result<(), DeviceError>;

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferId;
    fn delete_buffer(&mut self, id: BufferId);
}
