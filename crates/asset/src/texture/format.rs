//! Upload formats and sampler state derived from the image and its [`TextureInfo`].

use renderer::{
    DeviceError, GraphicsDevice, InternalFormat, MagFilter, MinFilter, PixelFormat, SamplerParam,
    TextureTarget, Wrap,
};

use super::image::ChannelOrder;
use super::info::{ColorSpace, TextureInfo};

/// Images larger than this on either axis may be driver compressed.
pub const COMPRESS_THRESHOLD: u32 = 512;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadFormat {
    pub internal: InternalFormat,
    pub format: PixelFormat,
}

/// Client pixel layout for a channel count, `None` for unsupported counts.
pub fn pixel_format(bytes_per_pixel: usize, order: ChannelOrder) -> Option<PixelFormat> {
    Some(match (bytes_per_pixel, order) {
        (1, _) => PixelFormat::Luminance,
        (2, _) => PixelFormat::LuminanceAlpha,
        (3, ChannelOrder::Rgb) => PixelFormat::Rgb,
        (3, ChannelOrder::Bgr) => PixelFormat::Bgr,
        (4, ChannelOrder::Rgb) => PixelFormat::Rgba,
        (4, ChannelOrder::Bgr) => PixelFormat::Bgra,
        _ => return None,
    })
}

/// Uncompressed, linear storage matching a client layout.
pub fn plain_internal(format: PixelFormat) -> InternalFormat {
    match format {
        PixelFormat::Luminance => InternalFormat::Luminance,
        PixelFormat::LuminanceAlpha => InternalFormat::LuminanceAlpha,
        PixelFormat::Rgb | PixelFormat::Bgr => InternalFormat::Rgb,
        PixelFormat::Rgba | PixelFormat::Bgra => InternalFormat::Rgba,
    }
}

/// Storage and client format for a 2D upload.
///
/// Compression only kicks in above [`COMPRESS_THRESHOLD`]; sRGB applies to color images.
pub fn upload_format(
    bytes_per_pixel: usize,
    order: ChannelOrder,
    info: &TextureInfo,
    width: u32,
    height: u32,
) -> Option<UploadFormat> {
    let format = pixel_format(bytes_per_pixel, order)?;
    let compress = info.compress && (width > COMPRESS_THRESHOLD || height > COMPRESS_THRESHOLD);
    let srgb = info.color_space == ColorSpace::Srgb;

    let internal = match (bytes_per_pixel, compress, srgb) {
        (1, true, _) => InternalFormat::CompressedLuminance,
        (1, false, _) => InternalFormat::Luminance,
        (2, true, _) => InternalFormat::CompressedLuminanceAlpha,
        (2, false, _) => InternalFormat::LuminanceAlpha,
        (3, true, true) => InternalFormat::CompressedSrgb,
        (3, true, false) => InternalFormat::CompressedRgb,
        (3, false, true) => InternalFormat::Srgb8,
        (3, false, false) => InternalFormat::Rgb,
        (_, true, true) => InternalFormat::CompressedSrgbAlpha,
        (_, true, false) => InternalFormat::CompressedRgba,
        (_, false, true) => InternalFormat::Srgb8Alpha8,
        (_, false, false) => InternalFormat::Rgba,
    };
    Some(UploadFormat { internal, format })
}

fn wrap(repeat: bool) -> Wrap {
    if repeat { Wrap::Repeat } else { Wrap::ClampToEdge }
}

/// Sampler state for the 2D texture currently bound.
pub(crate) fn apply_sampler(
    dev: &mut dyn GraphicsDevice,
    info: &TextureInfo,
    has_mip_levels: bool,
) -> Result<(), DeviceError> {
    let caps = dev.caps().clone();
    let target = TextureTarget::Texture2D;

    dev.set_sampler(target, SamplerParam::WrapS(wrap(info.repeat_u)))?;
    dev.set_sampler(target, SamplerParam::WrapT(wrap(info.repeat_v)))?;

    let (min, mag) = match (info.mipmap, info.nearest) {
        (true, true) => (MinFilter::NearestMipmapNearest, MagFilter::Nearest),
        (true, false) => (MinFilter::LinearMipmapLinear, MagFilter::Linear),
        (false, true) => (MinFilter::Nearest, MagFilter::Nearest),
        (false, false) => (MinFilter::Linear, MagFilter::Linear),
    };
    dev.set_sampler(target, SamplerParam::MinFilter(min))?;
    dev.set_sampler(target, SamplerParam::MagFilter(mag))?;

    if info.mipmap && !has_mip_levels && !caps.generate_mipmap {
        dev.set_sampler(target, SamplerParam::AutoGenerateMipmap(true))?;
    }

    if info.anisotropy > 1 && caps.anisotropy_supported() {
        let level = (info.anisotropy as f32).min(caps.max_anisotropy);
        dev.set_sampler(target, SamplerParam::MaxAnisotropy(level))?;
    }
    Ok(())
}

/// Sampler state for the cube map currently bound.
pub(crate) fn apply_cube_sampler(
    dev: &mut dyn GraphicsDevice,
    mipmap: bool,
) -> Result<(), DeviceError> {
    let target = TextureTarget::CubeMap;
    dev.set_sampler(target, SamplerParam::WrapS(Wrap::ClampToEdge))?;
    dev.set_sampler(target, SamplerParam::WrapT(Wrap::ClampToEdge))?;
    dev.set_sampler(target, SamplerParam::WrapR(Wrap::ClampToEdge))?;
    dev.set_sampler(target, SamplerParam::MagFilter(MagFilter::Linear))?;
    if mipmap {
        dev.set_sampler(target, SamplerParam::MinFilter(MinFilter::LinearMipmapLinear))?;
        if !dev.caps().generate_mipmap {
            dev.set_sampler(target, SamplerParam::AutoGenerateMipmap(true))?;
        }
    } else {
        dev.set_sampler(target, SamplerParam::MinFilter(MinFilter::Linear))?;
    }
    Ok(())
}

/// Ask the driver for a mip chain; older contexts rely on the auto-generate flag instead.
pub(crate) fn generate_mipmap(
    dev: &mut dyn GraphicsDevice,
    target: TextureTarget,
) -> Result<(), DeviceError> {
    if dev.caps().generate_mipmap {
        dev.generate_mipmap(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{DeviceCaps, HeadlessDevice, SamplerState};

    fn sampler_for(caps: DeviceCaps, info: &TextureInfo, has_mip_levels: bool) -> SamplerState {
        let mut dev = HeadlessDevice::new(caps);
        let id = dev.create_texture();
        dev.bind_texture(TextureTarget::Texture2D, id);
        apply_sampler(&mut dev, info, has_mip_levels).unwrap();
        dev.texture(id).unwrap().sampler.clone()
    }

    #[test]
    fn channel_count_selects_layout() {
        let info = TextureInfo::default();
        let f = |bpp, order| upload_format(bpp, order, &info, 64, 64);
        assert_eq!(f(1, ChannelOrder::Rgb).unwrap().format, PixelFormat::Luminance);
        assert_eq!(f(2, ChannelOrder::Rgb).unwrap().format, PixelFormat::LuminanceAlpha);
        assert_eq!(f(3, ChannelOrder::Bgr).unwrap().format, PixelFormat::Bgr);
        assert_eq!(f(4, ChannelOrder::Bgr).unwrap().format, PixelFormat::Bgra);
        assert_eq!(f(4, ChannelOrder::Rgb).unwrap().internal, InternalFormat::Rgba);
        assert!(f(5, ChannelOrder::Rgb).is_none());
    }

    #[test]
    fn compression_only_for_large_images() {
        let info = TextureInfo {
            compress: true,
            color_space: ColorSpace::Srgb,
            ..TextureInfo::default()
        };
        let small = upload_format(4, ChannelOrder::Rgb, &info, 512, 512).unwrap();
        assert_eq!(small.internal, InternalFormat::Srgb8Alpha8);
        let large = upload_format(4, ChannelOrder::Rgb, &info, 1024, 16).unwrap();
        assert_eq!(large.internal, InternalFormat::CompressedSrgbAlpha);
        let rgb = upload_format(3, ChannelOrder::Rgb, &info, 16, 1024).unwrap();
        assert_eq!(rgb.internal, InternalFormat::CompressedSrgb);
        // luminance never takes an sRGB variant
        let lum = upload_format(1, ChannelOrder::Rgb, &info, 16, 16).unwrap();
        assert_eq!(lum.internal, InternalFormat::Luminance);
    }

    #[test]
    fn clamped_axes_use_clamp_to_edge() {
        let info = TextureInfo {
            repeat_u: false,
            repeat_v: true,
            ..TextureInfo::default()
        };
        let sampler = sampler_for(DeviceCaps::default(), &info, false);
        assert_eq!(sampler.wrap_s, Some(Wrap::ClampToEdge));
        assert_eq!(sampler.wrap_t, Some(Wrap::Repeat));
    }

    #[test]
    fn nearest_filtering_with_and_without_mips() {
        let mipped = TextureInfo {
            nearest: true,
            mipmap: true,
            ..TextureInfo::default()
        };
        let sampler = sampler_for(DeviceCaps::default(), &mipped, false);
        assert_eq!(sampler.min_filter, Some(MinFilter::NearestMipmapNearest));
        assert_eq!(sampler.mag_filter, Some(MagFilter::Nearest));

        let flat = TextureInfo {
            mipmap: false,
            ..mipped
        };
        let sampler = sampler_for(DeviceCaps::default(), &flat, false);
        assert_eq!(sampler.min_filter, Some(MinFilter::Nearest));
        assert_eq!(sampler.mag_filter, Some(MagFilter::Nearest));
    }

    #[test]
    fn anisotropy_is_clamped_to_the_device_limit() {
        let info = |anisotropy| TextureInfo {
            anisotropy,
            ..TextureInfo::default()
        };
        let caps = DeviceCaps::default();
        assert_eq!(sampler_for(caps.clone(), &info(8), false).max_anisotropy, Some(8.0));
        assert_eq!(sampler_for(caps.clone(), &info(32), false).max_anisotropy, Some(16.0));
        assert_eq!(sampler_for(caps, &info(1), false).max_anisotropy, None);
        // no extension, no request
        assert_eq!(sampler_for(DeviceCaps::legacy(), &info(8), false).max_anisotropy, None);
    }

    #[test]
    fn legacy_devices_auto_generate_missing_mips() {
        let info = TextureInfo {
            mipmap: true,
            ..TextureInfo::default()
        };
        assert!(sampler_for(DeviceCaps::legacy(), &info, false).auto_generate_mipmap);
        assert!(!sampler_for(DeviceCaps::legacy(), &info, true).auto_generate_mipmap);
        assert!(!sampler_for(DeviceCaps::default(), &info, false).auto_generate_mipmap);
    }
}
