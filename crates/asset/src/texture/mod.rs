//! GPU textures and the pipeline that builds them.
//!
//! A load runs start to finish on the calling thread: read the file, try DDS,
//! otherwise decode, correct non-power-of-two sizes for devices that need it,
//! shrink to the size tier, upload, set the sampler and request mips. Cube
//! maps come from a vertical-cross atlas or six separate files.

pub mod cubemap;
pub mod dds;
pub mod format;
pub mod image;
pub mod info;
pub mod resample;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use renderer::{
    CompressedUpload, CubeFace, GraphicsDevice, ImageTarget, ImageUpload, SharedDevice, TextureId,
    TextureTarget,
};

use self::dds::DdsContainer;
use self::image::DecodedImage;
use crate::error::{AssetError, AssetResult, report};

pub use self::image::{ChannelOrder, RawImage};
pub use self::info::{ColorSpace, SizeTier, TextureInfo};

/// A texture object on the device. Released when dropped.
pub struct Texture {
    device: SharedDevice,
    id: Option<TextureId>,
    target: TextureTarget,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn new(device: SharedDevice) -> Self {
        Self {
            device,
            id: None,
            target: TextureTarget::Texture2D,
            width: 0,
            height: 0,
        }
    }

    /// Load from a file (or six `path-xx.png` files for cube maps).
    ///
    /// Returns `false` and writes the reason to `error` on failure; the texture stays empty.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        info: &TextureInfo,
        error: &mut dyn fmt::Write,
    ) -> bool {
        let path = path.as_ref();
        match self.load_file(path, info) {
            Ok(()) => {
                log::info!(
                    "Loaded texture {} ({}x{}, {:?})",
                    path.display(),
                    self.width,
                    self.height,
                    self.target
                );
                true
            }
            Err(err) => {
                report(error, &err);
                false
            }
        }
    }

    /// Load from pixel memory.
    pub fn load_pixels(
        &mut self,
        raw: RawImage<'_>,
        info: &TextureInfo,
        error: &mut dyn fmt::Write,
    ) -> bool {
        match self.load_memory(raw, info) {
            Ok(()) => true,
            Err(err) => {
                report(error, &err);
                false
            }
        }
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub fn is_loaded(&self) -> bool {
        self.id.is_some()
    }

    pub fn target(&self) -> TextureTarget {
        self.target
    }

    pub fn is_cube(&self) -> bool {
        self.target == TextureTarget::CubeMap
    }

    /// Width in pixels (of one face for cube maps).
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    /// Release the device texture; the object can be loaded again afterwards.
    pub fn unload(&mut self) {
        if let Some(id) = self.id.take() {
            self.device.borrow_mut().delete_texture(id);
        }
    }

    fn load_file(&mut self, path: &Path, info: &TextureInfo) -> AssetResult<()> {
        if self.id.is_some() {
            return Err(AssetError::DoubleLoad(path.display().to_string()));
        }
        if path.as_os_str().is_empty() {
            return Err(AssetError::EmptyName);
        }
        let name = path.display().to_string();

        // six-file cube maps have no file at `path` itself
        let file = std::fs::read(path);
        if let Ok(bytes) = &file {
            if let Some(dds) = DdsContainer::parse(&name, bytes)? {
                return self.upload_dds(&name, &dds, info);
            }
        }

        if info.cube && !info.vertical_cross {
            return self.load_cube_files(path);
        }

        let bytes = file.map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = DecodedImage::decode(&name, &bytes)?;
        if info.cube {
            self.upload_cross(&name, &image, info)
        } else {
            self.upload_2d(&name, image, info)
        }
    }

    fn load_memory(&mut self, raw: RawImage<'_>, info: &TextureInfo) -> AssetResult<()> {
        if self.id.is_some() {
            return Err(AssetError::DoubleLoad("<memory>".to_owned()));
        }
        let image = DecodedImage::from_raw(raw)?;
        match (info.cube, info.vertical_cross) {
            (false, _) => self.upload_2d("<memory>", image, info),
            (true, true) => self.upload_cross("<memory>", &image, info),
            (true, false) => Err(AssetError::Parse {
                name: "<memory>".to_owned(),
                message: "six-face cube maps can only be loaded from files".to_owned(),
            }),
        }
    }

    /// Create and bind a device texture, fill it through `fill`, and keep it only on success.
    fn create_with(
        &mut self,
        target: TextureTarget,
        fill: impl FnOnce(&mut dyn GraphicsDevice) -> AssetResult<(u32, u32)>,
    ) -> AssetResult<()> {
        let device = Rc::clone(&self.device);
        let mut dev = device.borrow_mut();
        let id = dev.create_texture();
        dev.bind_texture(target, id);

        match fill(&mut *dev) {
            Ok((width, height)) => {
                self.id = Some(id);
                self.target = target;
                self.width = width;
                self.height = height;
                Ok(())
            }
            Err(err) => {
                dev.delete_texture(id);
                Err(err)
            }
        }
    }

    fn upload_2d(
        &mut self,
        name: &str,
        image: DecodedImage,
        info: &TextureInfo,
    ) -> AssetResult<()> {
        // compression is decided by the source size, before any resampling
        let upload_format = format::upload_format(
            image.bytes_per_pixel,
            image.order,
            info,
            image.width,
            image.height,
        )
        .ok_or_else(|| AssetError::UnknownFormat {
            name: name.to_owned(),
            bytes_per_pixel: image.bytes_per_pixel,
        })?;

        let npot_ok = self.device.borrow().caps().npot_textures;
        let mut image = image;
        if !image.is_power_of_two() && !npot_ok {
            image = resample::upsample_to_power_of_two(image);
        }
        let image = resample::apply_size_tier(image, info.size);

        self.create_with(TextureTarget::Texture2D, |dev| {
            format::apply_sampler(dev, info, false).map_err(AssetError::device("sampler state"))?;
            dev.upload_image(&ImageUpload {
                target: ImageTarget::Texture2D,
                level: 0,
                internal_format: upload_format.internal,
                width: image.width,
                height: image.height,
                format: upload_format.format,
                data: &image.packed(),
            })
            .map_err(AssetError::device("texture upload"))?;

            if info.mipmap {
                format::generate_mipmap(dev, TextureTarget::Texture2D)
                    .map_err(AssetError::device("mipmap generation"))?;
            }
            Ok((image.width, image.height))
        })
    }

    fn upload_dds(
        &mut self,
        name: &str,
        dds: &DdsContainer<'_>,
        info: &TextureInfo,
    ) -> AssetResult<()> {
        let levels = dds.mip_levels(name)?;
        let internal_format = dds.format.internal_format(info.color_space);

        self.create_with(TextureTarget::Texture2D, |dev| {
            format::apply_sampler(dev, info, levels.len() > 1)
                .map_err(AssetError::device("sampler state"))?;

            for level in &levels {
                let uploaded = match dds.format.pixel_format() {
                    Some(format) => dev.upload_image(&ImageUpload {
                        target: ImageTarget::Texture2D,
                        level: level.level,
                        internal_format,
                        width: level.width,
                        height: level.height,
                        format,
                        data: level.data,
                    }),
                    None => dev.upload_compressed(&CompressedUpload {
                        target: ImageTarget::Texture2D,
                        level: level.level,
                        internal_format,
                        width: level.width,
                        height: level.height,
                        data: level.data,
                    }),
                };
                uploaded.map_err(AssetError::device("DDS level upload"))?;
            }

            // a single level becomes the base of a driver-built chain
            if levels.len() == 1 {
                format::generate_mipmap(dev, TextureTarget::Texture2D)
                    .map_err(AssetError::device("mipmap generation"))?;
            }
            Ok((dds.width, dds.height))
        })
    }

    fn upload_cross(
        &mut self,
        name: &str,
        atlas: &DecodedImage,
        info: &TextureInfo,
    ) -> AssetResult<()> {
        let faces = cubemap::split_vertical_cross(name, atlas)?;
        self.upload_cube(name, &faces, info.mipmap)
    }

    /// Six separate face files. These never get mips, whatever `info` asks for.
    fn load_cube_files(&mut self, path: &Path) -> AssetResult<()> {
        let name = path.display().to_string();
        let mut faces: Vec<(CubeFace, DecodedImage)> = Vec::with_capacity(6);

        for (suffix, face) in cubemap::CUBE_FILES {
            let file = with_suffix(path, suffix);
            let bytes = std::fs::read(&file).map_err(|source| AssetError::Io {
                path: file.clone(),
                source,
            })?;
            let image = DecodedImage::decode(&file.display().to_string(), &bytes)?;

            if let Some((_, first)) = faces.first() {
                if (first.width, first.height) != (image.width, image.height) {
                    return Err(AssetError::CubeFaceMismatch { name });
                }
            }
            faces.push((face, image));
        }
        self.upload_cube(&name, &faces, false)
    }

    fn upload_cube(
        &mut self,
        name: &str,
        faces: &[(CubeFace, DecodedImage)],
        mipmap: bool,
    ) -> AssetResult<()> {
        let Some((_, first)) = faces.first() else {
            return Err(AssetError::CubeFaceMismatch {
                name: name.to_owned(),
            });
        };
        let (width, height) = (first.width, first.height);

        let mut uploads = Vec::with_capacity(faces.len());
        for (face, image) in faces {
            let pixel_format = format::pixel_format(image.bytes_per_pixel, image.order)
                .ok_or_else(|| AssetError::UnknownFormat {
                    name: name.to_owned(),
                    bytes_per_pixel: image.bytes_per_pixel,
                })?;
            uploads.push((*face, pixel_format, image));
        }

        self.create_with(TextureTarget::CubeMap, |dev| {
            format::apply_cube_sampler(dev, mipmap)
                .map_err(AssetError::device("cube sampler state"))?;
            for (face, pixel_format, image) in uploads {
                dev.upload_image(&ImageUpload {
                    target: ImageTarget::Cube(face),
                    level: 0,
                    internal_format: format::plain_internal(pixel_format),
                    width: image.width,
                    height: image.height,
                    format: pixel_format,
                    data: &image.packed(),
                })
                .map_err(AssetError::device("cube face upload"))?;
            }
            if mipmap {
                format::generate_mipmap(dev, TextureTarget::CubeMap)
                    .map_err(AssetError::device("cube mipmap generation"))?;
            }
            Ok((width, height))
        })
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.unload();
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{DeviceCaps, HeadlessDevice, InternalFormat, MinFilter, PixelFormat};
    use std::cell::RefCell;

    use super::dds::DdsFormat;

    fn device(caps: DeviceCaps) -> Rc<RefCell<HeadlessDevice>> {
        renderer::share(HeadlessDevice::new(caps))
    }

    #[test]
    fn raw_pixels_upload_as_given() {
        let dev = device(DeviceCaps::default());
        let mut tex = Texture::new(dev.clone());
        let pixels = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut error = String::new();
        let info = TextureInfo {
            mipmap: false,
            ..TextureInfo::default()
        };
        assert!(tex.load_pixels(RawImage::new(2, 1, 4, &pixels), &info, &mut error), "{error}");

        let dev = dev.borrow();
        let record = dev.texture(tex.id().unwrap()).unwrap();
        let level = record.level(ImageTarget::Texture2D, 0).unwrap();
        assert_eq!(level.format, Some(PixelFormat::Rgba));
        assert_eq!(level.data, pixels);
        assert!(!record.mipmaps_generated);
        assert_eq!(record.sampler.min_filter, Some(MinFilter::Linear));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut tex = Texture::new(device(DeviceCaps::default()));
        let mut error = String::new();
        assert!(!tex.load("", &TextureInfo::default(), &mut error));
        assert!(error.contains("empty name"));
    }

    #[test]
    fn bgr_memory_keeps_its_order() {
        let dev = device(DeviceCaps::default());
        let mut tex = Texture::new(dev.clone());
        let raw = RawImage {
            order: ChannelOrder::Bgr,
            ..RawImage::new(1, 1, 3, &[3, 2, 1])
        };
        assert!(tex.load_pixels(raw, &TextureInfo::default(), &mut String::new()));
        let dev = dev.borrow();
        let record = dev.texture(tex.id().unwrap()).unwrap();
        let level = record.level(ImageTarget::Texture2D, 0).unwrap().clone();
        assert_eq!(level.format, Some(PixelFormat::Bgr));
        assert_eq!(level.internal_format, InternalFormat::Rgb);
    }

    #[test]
    fn failed_upload_leaves_no_texture_behind() {
        let dev = device(DeviceCaps::default());
        let mut tex = Texture::new(dev.clone());
        let mut error = String::new();
        // a DDS whose header promises more levels than the payload holds
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dds");
        std::fs::write(&path, dds::tests::encode(DdsFormat::Dxt1, 8, 8, 2, &[0; 8])).unwrap();
        assert!(!tex.load(&path, &TextureInfo::default(), &mut error));
        assert!(error.contains("broken.dds"), "{error}");
        assert!(!tex.is_loaded());
        assert_eq!(dev.borrow().texture_count(), 0);
    }

    #[test]
    fn dropping_releases_the_device_texture() {
        let dev = device(DeviceCaps::default());
        let mut tex = Texture::new(dev.clone());
        let raw = RawImage::new(1, 1, 1, &[0]);
        assert!(tex.load_pixels(raw, &TextureInfo::default(), &mut String::new()));
        assert_eq!(dev.borrow().texture_count(), 1);
        drop(tex);
        assert_eq!(dev.borrow().texture_count(), 0);
    }

    fn write_dds(dir: &tempfile::TempDir, name: &str, bytes: Vec<u8>) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn dds_mip_chain_uploads_every_level_compressed() {
        let dev = device(DeviceCaps::default());
        let dir = tempfile::tempdir().unwrap();
        // 8x8: 4 blocks, 4x4: 1 block
        let bytes = dds::tests::encode(DdsFormat::Dxt1, 8, 8, 2, &[7; 40]);
        let path = write_dds(&dir, "road.dds", bytes);

        let mut tex = Texture::new(dev.clone());
        let mut error = String::new();
        assert!(tex.load(&path, &TextureInfo::default(), &mut error), "{error}");
        assert_eq!((tex.width(), tex.height()), (8, 8));

        let dev = dev.borrow();
        let record = dev.texture(tex.id().unwrap()).unwrap();
        let base = record.level(ImageTarget::Texture2D, 0).unwrap();
        let mip = record.level(ImageTarget::Texture2D, 1).unwrap();
        assert_eq!(
            (base.internal_format, base.format, base.data.len()),
            (InternalFormat::Dxt1, None, 32)
        );
        assert_eq!((mip.width, mip.height, mip.data.len()), (4, 4, 8));
        assert!(!record.mipmaps_generated);
        assert!(!record.sampler.auto_generate_mipmap);
    }

    #[test]
    fn single_level_dds_gets_generated_mips() {
        let dev = device(DeviceCaps::default());
        let dir = tempfile::tempdir().unwrap();
        let bytes = dds::tests::encode(DdsFormat::Bgr, 2, 2, 1, &[9; 12]);
        let path = write_dds(&dir, "sky.dds", bytes);
        let info = TextureInfo {
            color_space: ColorSpace::Srgb,
            ..TextureInfo::default()
        };

        let mut tex = Texture::new(dev.clone());
        assert!(tex.load(&path, &info, &mut String::new()));

        let dev = dev.borrow();
        let record = dev.texture(tex.id().unwrap()).unwrap();
        let base = record.level(ImageTarget::Texture2D, 0).unwrap();
        assert_eq!(base.internal_format, InternalFormat::Srgb8);
        assert!(base.internal_format.is_srgb());
        assert_eq!(base.format, Some(PixelFormat::Bgr));
        assert!(record.mipmaps_generated);
    }
}
