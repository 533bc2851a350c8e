use serde::Deserialize;

/// Size bucket selected by the user's texture quality setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum SizeTier {
    #[default]
    Full,
    /// Axes above 256 pixels are halved.
    Medium,
    /// Axes above 128 pixels are quartered.
    Small,
}

impl SizeTier {
    /// Target dimensions for an image of `width` x `height`.
    pub fn reduce(self, width: u32, height: u32) -> (u32, u32) {
        let (threshold, factor) = match self {
            SizeTier::Full => return (width, height),
            SizeTier::Medium => (256, 2),
            SizeTier::Small => (128, 4),
        };
        let axis = |v: u32| if v > threshold { v / factor } else { v };
        (axis(width), axis(height))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum ColorSpace {
    #[default]
    Linear,
    /// Perceptual (sRGB encoded) color data.
    Srgb,
}

/// Per-load texture settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextureInfo {
    pub repeat_u: bool,
    pub repeat_v: bool,
    pub nearest: bool,
    pub mipmap: bool,
    /// Requested anisotropy; values of 0 or 1 leave it off.
    pub anisotropy: u32,
    pub color_space: ColorSpace,
    /// Let the driver compress large images.
    pub compress: bool,
    pub size: SizeTier,
    pub cube: bool,
    /// Cube map stored as one 3x4 vertical-cross image instead of six files.
    pub vertical_cross: bool,
}

impl Default for TextureInfo {
    fn default() -> Self {
        Self {
            repeat_u: true,
            repeat_v: true,
            nearest: false,
            mipmap: true,
            anisotropy: 0,
            color_space: ColorSpace::Linear,
            compress: true,
            size: SizeTier::Full,
            cube: false,
            vertical_cross: false,
        }
    }
}
