//! DirectDraw Surface container: header parsing and mip chain layout.
//!
//! Layout (little endian): `"DDS "`, a 124 byte header, then every mip level
//! of the main image back to back. S3TC (DXT1/3/5) and uncompressed 24/32 bit
//! BGR(A) payloads are supported.

use bytemuck::{Pod, Zeroable};
use renderer::{InternalFormat, PixelFormat};

use super::info::ColorSpace;
use crate::error::{AssetError, AssetResult};

pub const MAGIC: &[u8; 4] = b"DDS ";
const HEADER_SIZE: usize = 124;
const DATA_OFFSET: usize = MAGIC.len() + HEADER_SIZE;

const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DdsPixelFormat {
    size: u32,
    flags: u32,
    four_cc: [u8; 4],
    rgb_bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    a_mask: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DdsHeader {
    size: u32,
    flags: u32,
    height: u32,
    width: u32,
    pitch_or_linear_size: u32,
    depth: u32,
    mip_map_count: u32,
    reserved1: [u32; 11],
    pixel_format: DdsPixelFormat,
    caps: [u32; 4],
    reserved2: u32,
}

/// Pixel layout of a DDS payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DdsFormat {
    Bgr,
    Bgra,
    Dxt1,
    Dxt3,
    Dxt5,
}

impl DdsFormat {
    /// Bytes for one level of `width` x `height`. Saturates instead of overflowing.
    pub fn level_size(self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        let blocks = || w.div_ceil(4).saturating_mul(h.div_ceil(4));
        match self {
            DdsFormat::Bgr => w.saturating_mul(h).saturating_mul(3),
            DdsFormat::Bgra => w.saturating_mul(h).saturating_mul(4),
            DdsFormat::Dxt1 => blocks().saturating_mul(8),
            DdsFormat::Dxt3 | DdsFormat::Dxt5 => blocks().saturating_mul(16),
        }
    }

    pub fn is_block_compressed(self) -> bool {
        !matches!(self, DdsFormat::Bgr | DdsFormat::Bgra)
    }

    /// Client layout for uncompressed payloads.
    pub fn pixel_format(self) -> Option<PixelFormat> {
        match self {
            DdsFormat::Bgr => Some(PixelFormat::Bgr),
            DdsFormat::Bgra => Some(PixelFormat::Bgra),
            _ => None,
        }
    }

    /// GPU storage, switched to the sRGB variant when the texture holds perceptual color.
    pub fn internal_format(self, color_space: ColorSpace) -> InternalFormat {
        let srgb = color_space == ColorSpace::Srgb;
        match (self, srgb) {
            (DdsFormat::Bgr, false) => InternalFormat::Rgb,
            (DdsFormat::Bgr, true) => InternalFormat::Srgb8,
            (DdsFormat::Bgra, false) => InternalFormat::Rgba,
            (DdsFormat::Bgra, true) => InternalFormat::Srgb8Alpha8,
            (DdsFormat::Dxt1, false) => InternalFormat::Dxt1,
            (DdsFormat::Dxt1, true) => InternalFormat::SrgbDxt1,
            (DdsFormat::Dxt3, false) => InternalFormat::Dxt3,
            (DdsFormat::Dxt3, true) => InternalFormat::SrgbDxt3,
            (DdsFormat::Dxt5, false) => InternalFormat::Dxt5,
            (DdsFormat::Dxt5, true) => InternalFormat::SrgbDxt5,
        }
    }
}

/// One mip level inside the payload.
#[derive(Clone, Copy, Debug)]
pub struct DdsLevel<'a> {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// Parsed DDS file borrowing its payload from the source buffer.
#[derive(Clone, Copy, Debug)]
pub struct DdsContainer<'a> {
    pub format: DdsFormat,
    pub width: u32,
    pub height: u32,
    pub levels: u32,
    pub payload: &'a [u8],
}

pub fn is_dds(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

impl<'a> DdsContainer<'a> {
    /// `Ok(None)` when `bytes` is not a DDS file at all.
    pub fn parse(name: &str, bytes: &'a [u8]) -> AssetResult<Option<Self>> {
        if !is_dds(bytes) {
            return Ok(None);
        }
        let malformed = |reason: String| AssetError::Dds {
            name: name.to_owned(),
            reason,
        };

        let header_bytes = bytes
            .get(MAGIC.len()..DATA_OFFSET)
            .ok_or_else(|| {
                malformed(format!(
                    "file is {} bytes, header needs {DATA_OFFSET}",
                    bytes.len()
                ))
            })?;
        let header: DdsHeader = bytemuck::pod_read_unaligned(header_bytes);

        if u32::from_le(header.size) as usize != HEADER_SIZE {
            return Err(malformed(format!("header size {}", u32::from_le(header.size))));
        }
        let width = u32::from_le(header.width);
        let height = u32::from_le(header.height);
        if width == 0 || height == 0 {
            return Err(malformed(format!("empty image {width}x{height}")));
        }

        let format = Self::pixel_format(&header.pixel_format).map_err(malformed)?;
        let mip_count = u32::from_le(header.mip_map_count);
        // a full chain halves down to 1x1; anything beyond that is a bogus count
        let chain = width.max(height).ilog2() + 1;
        let levels = if u32::from_le(header.flags) & DDSD_MIPMAPCOUNT != 0 && mip_count > 0 {
            mip_count.min(chain)
        } else {
            1
        };

        Ok(Some(Self {
            format,
            width,
            height,
            levels,
            payload: &bytes[DATA_OFFSET..],
        }))
    }

    fn pixel_format(pf: &DdsPixelFormat) -> Result<DdsFormat, String> {
        let flags = u32::from_le(pf.flags);
        if flags & DDPF_FOURCC != 0 {
            return match &pf.four_cc {
                b"DXT1" => Ok(DdsFormat::Dxt1),
                b"DXT3" => Ok(DdsFormat::Dxt3),
                b"DXT5" => Ok(DdsFormat::Dxt5),
                other => Err(format!(
                    "unsupported FourCC '{}'",
                    String::from_utf8_lossy(other)
                )),
            };
        }
        if flags & DDPF_RGB != 0 {
            let bits = u32::from_le(pf.rgb_bit_count);
            let red = u32::from_le(pf.r_mask);
            return match (bits, red) {
                (24, 0x00ff_0000) => Ok(DdsFormat::Bgr),
                (32, 0x00ff_0000) => Ok(DdsFormat::Bgra),
                _ => Err(format!("unsupported {bits} bit layout, red mask {red:#010x}")),
            };
        }
        Err(format!("unsupported pixel format flags {flags:#x}"))
    }

    /// Walk the mip chain, halving each axis (at least 1) per level.
    pub fn mip_levels(&self, name: &str) -> AssetResult<Vec<DdsLevel<'a>>> {
        let mut out = Vec::with_capacity(self.levels as usize);
        let (mut width, mut height, mut offset) = (self.width, self.height, 0usize);

        for level in 0..self.levels {
            let len = self.format.level_size(width, height);
            let end = offset.saturating_add(len);
            let data = self.payload.get(offset..end).ok_or_else(|| AssetError::Dds {
                name: name.to_owned(),
                reason: format!(
                    "payload ends before level {level} ({width}x{height}, {len} bytes at {offset})"
                ),
            })?;
            out.push(DdsLevel {
                level,
                width,
                height,
                data,
            });

            offset += len;
            width = (width / 2).max(1);
            height = (height / 2).max(1);
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal DDS writer for fixtures.
    pub(crate) fn encode(
        format: DdsFormat,
        width: u32,
        height: u32,
        levels: u32,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut pf = DdsPixelFormat::zeroed();
        pf.size = 32;
        match format {
            DdsFormat::Bgr | DdsFormat::Bgra => {
                pf.flags = DDPF_RGB;
                pf.rgb_bit_count = if format == DdsFormat::Bgr { 24 } else { 32 };
                pf.r_mask = 0x00ff_0000;
                pf.g_mask = 0x0000_ff00;
                pf.b_mask = 0x0000_00ff;
            }
            DdsFormat::Dxt1 => (pf.flags, pf.four_cc) = (DDPF_FOURCC, *b"DXT1"),
            DdsFormat::Dxt3 => (pf.flags, pf.four_cc) = (DDPF_FOURCC, *b"DXT3"),
            DdsFormat::Dxt5 => (pf.flags, pf.four_cc) = (DDPF_FOURCC, *b"DXT5"),
        }

        let mut header = DdsHeader::zeroed();
        header.size = HEADER_SIZE as u32;
        header.flags = 0x1007 | if levels > 1 { DDSD_MIPMAPCOUNT } else { 0 };
        header.width = width;
        header.height = height;
        header.mip_map_count = levels;
        header.pixel_format = pf;

        let mut out = MAGIC.to_vec();
        out.extend_from_slice(bytemuck::bytes_of(&header));
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn header_is_124_bytes() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), HEADER_SIZE);
    }

    #[test]
    fn other_files_are_not_dds() {
        assert!(DdsContainer::parse("a.png", b"\x89PNG\r\n").unwrap().is_none());
        assert!(DdsContainer::parse("tiny", b"DD").unwrap().is_none());
    }

    #[test]
    fn dxt1_chain_halves_to_one() {
        // 8x4: 2 blocks, 4x2: 1, 2x1: 1, 1x1: 1 -> 5 blocks of 8 bytes
        let bytes = encode(DdsFormat::Dxt1, 8, 4, 4, &[0xab; 40]);
        let dds = DdsContainer::parse("t.dds", &bytes).unwrap().unwrap();
        assert_eq!((dds.format, dds.width, dds.height, dds.levels), (DdsFormat::Dxt1, 8, 4, 4));
        let levels = dds.mip_levels("t.dds").unwrap();
        let dims: Vec<_> = levels.iter().map(|l| (l.width, l.height, l.data.len())).collect();
        assert_eq!(dims, vec![(8, 4, 16), (4, 2, 8), (2, 1, 8), (1, 1, 8)]);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let bytes = encode(DdsFormat::Dxt5, 8, 8, 2, &[0; 64]);
        let dds = DdsContainer::parse("t.dds", &bytes).unwrap().unwrap();
        assert!(matches!(dds.mip_levels("t.dds"), Err(AssetError::Dds { .. })));
    }

    #[test]
    fn mip_count_is_capped_at_the_full_chain() {
        // 8x4 halves to 4x2, 2x1, 1x1: four levels at most
        let mut bytes = encode(DdsFormat::Dxt1, 8, 4, 2, &[0; 40]);
        bytes[4 + 24..4 + 28].copy_from_slice(&u32::MAX.to_le_bytes());
        let dds = DdsContainer::parse("t.dds", &bytes).unwrap().unwrap();
        assert_eq!(dds.levels, 4);
        assert_eq!(dds.mip_levels("t.dds").unwrap().len(), 4);
    }

    #[test]
    fn huge_dimensions_fail_without_overflow() {
        let bytes = encode(DdsFormat::Bgra, u32::MAX, u32::MAX, 2, &[0; 16]);
        let dds = DdsContainer::parse("t.dds", &bytes).unwrap().unwrap();
        assert_eq!(dds.levels, 2);
        assert!(matches!(dds.mip_levels("t.dds"), Err(AssetError::Dds { .. })));
    }

    #[test]
    fn mip_count_ignored_without_flag() {
        let mut bytes = encode(DdsFormat::Bgra, 2, 2, 1, &[0; 16]);
        // count present, flag absent
        bytes[4 + 24..4 + 28].copy_from_slice(&3u32.to_le_bytes());
        let dds = DdsContainer::parse("t.dds", &bytes).unwrap().unwrap();
        assert_eq!(dds.levels, 1);
    }

    #[test]
    fn srgb_remap_covers_known_formats() {
        assert_eq!(DdsFormat::Bgr.internal_format(ColorSpace::Srgb), InternalFormat::Srgb8);
        assert_eq!(DdsFormat::Bgra.internal_format(ColorSpace::Srgb), InternalFormat::Srgb8Alpha8);
        assert_eq!(DdsFormat::Dxt1.internal_format(ColorSpace::Srgb), InternalFormat::SrgbDxt1);
        assert_eq!(DdsFormat::Dxt3.internal_format(ColorSpace::Srgb), InternalFormat::SrgbDxt3);
        assert_eq!(DdsFormat::Dxt5.internal_format(ColorSpace::Srgb), InternalFormat::SrgbDxt5);
        assert_eq!(DdsFormat::Dxt5.internal_format(ColorSpace::Linear), InternalFormat::Dxt5);
    }

    #[test]
    fn unknown_four_cc_is_rejected() {
        let mut bytes = encode(DdsFormat::Dxt1, 4, 4, 1, &[0; 8]);
        // four_cc: magic + 72 byte header prefix + 8 bytes into the pixel format
        bytes[84..88].copy_from_slice(b"ATI2");
        assert!(matches!(DdsContainer::parse("n.dds", &bytes), Err(AssetError::Dds { .. })));
    }
}
