//! CPU-side images between decode and upload.

use std::borrow::Cow;

use image::DynamicImage;

use crate::error::{AssetError, AssetResult};

/// Order of the color channels in 3 and 4 byte pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Pixel memory supplied by the caller instead of a file.
#[derive(Clone, Copy, Debug)]
pub struct RawImage<'a> {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: usize,
    pub order: ChannelOrder,
    /// Tightly packed rows, top to bottom.
    pub data: &'a [u8],
}

impl<'a> RawImage<'a> {
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            order: ChannelOrder::Rgb,
            data,
        }
    }
}

/// Decoded 8-bit-per-channel image.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: usize,
    /// Row stride in bytes.
    pub pitch: usize,
    pub order: ChannelOrder,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Tightly packed image.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            pitch: width as usize * bytes_per_pixel,
            order: ChannelOrder::Rgb,
            pixels,
        }
    }

    pub fn from_raw(raw: RawImage<'_>) -> AssetResult<Self> {
        if !(1..=4).contains(&raw.bytes_per_pixel) {
            return Err(AssetError::UnknownFormat {
                name: "<memory>".to_owned(),
                bytes_per_pixel: raw.bytes_per_pixel,
            });
        }
        let needed = raw.width as usize * raw.height as usize * raw.bytes_per_pixel;
        if raw.width == 0 || raw.height == 0 || raw.data.len() < needed {
            return Err(AssetError::Parse {
                name: "<memory>".to_owned(),
                message: format!(
                    "{}x{}x{} image needs {needed} bytes, buffer holds {}",
                    raw.width,
                    raw.height,
                    raw.bytes_per_pixel,
                    raw.data.len()
                ),
            });
        }

        let mut image = Self::new(
            raw.width,
            raw.height,
            raw.bytes_per_pixel,
            raw.data[..needed].to_vec(),
        );
        image.order = raw.order;
        Ok(image)
    }

    /// Decode an encoded image (PNG, ...). Deeper formats are reduced to 8 bits per channel.
    pub fn decode(name: &str, bytes: &[u8]) -> AssetResult<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            name: name.to_owned(),
            source,
        })?;
        Ok(Self::from_dynamic(decoded))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let (bpp, pixels) = match image {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other => match other.color().channel_count() {
                1 => (1, other.to_luma8().into_raw()),
                2 => (2, other.to_luma_alpha8().into_raw()),
                3 => (3, other.to_rgb8().into_raw()),
                _ => (4, other.to_rgba8().into_raw()),
            },
        };
        Self::new(width, height, bpp, pixels)
    }

    /// Bytes of pixel `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let at = y as usize * self.pitch + x as usize * self.bytes_per_pixel;
        &self.pixels[at..at + self.bytes_per_pixel]
    }

    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let at = y as usize * self.pitch;
        &self.pixels[at..at + self.width as usize * self.bytes_per_pixel]
    }

    /// Pixel data without row padding.
    pub fn packed(&self) -> Cow<'_, [u8]> {
        let row_len = self.width as usize * self.bytes_per_pixel;
        if self.pitch == row_len {
            return Cow::Borrowed(&self.pixels[..row_len * self.height as usize]);
        }
        Cow::Owned((0..self.height).flat_map(|y| self.row(y).iter().copied()).collect())
    }

    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}
