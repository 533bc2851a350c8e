//! In-memory [`GraphicsDevice`]: validates and records every call.

use std::collections::HashMap;

use crate::caps::DeviceCaps;
use crate::device::{
    BufferId, BufferKind, CompressedUpload, DeviceError, GraphicsDevice, ImageTarget, ImageUpload,
    InternalFormat, MagFilter, MinFilter, PixelFormat, SamplerParam, TextureId, TextureTarget,
    Wrap,
};

/// One uploaded level of one image target.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRecord {
    pub internal_format: InternalFormat,
    /// `None` for pre-compressed uploads.
    pub format: Option<PixelFormat>,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SamplerState {
    pub wrap_s: Option<Wrap>,
    pub wrap_t: Option<Wrap>,
    pub wrap_r: Option<Wrap>,
    pub min_filter: Option<MinFilter>,
    pub mag_filter: Option<MagFilter>,
    pub max_anisotropy: Option<f32>,
    pub auto_generate_mipmap: bool,
}

impl SamplerState {
    fn apply(&mut self, param: SamplerParam) {
        match param {
            SamplerParam::WrapS(w) => self.wrap_s = Some(w),
            SamplerParam::WrapT(w) => self.wrap_t = Some(w),
            SamplerParam::WrapR(w) => self.wrap_r = Some(w),
            SamplerParam::MinFilter(f) => self.min_filter = Some(f),
            SamplerParam::MagFilter(f) => self.mag_filter = Some(f),
            SamplerParam::MaxAnisotropy(a) => self.max_anisotropy = Some(a),
            SamplerParam::AutoGenerateMipmap(on) => self.auto_generate_mipmap = on,
        }
    }
}

/// Everything recorded for one texture object.
#[derive(Clone, Debug, Default)]
pub struct TextureRecord {
    /// Set on first bind.
    pub target: Option<TextureTarget>,
    pub levels: HashMap<(ImageTarget, u32), LevelRecord>,
    pub sampler: SamplerState,
    pub mipmaps_generated: bool,
}

impl TextureRecord {
    pub fn level(&self, target: ImageTarget, level: u32) -> Option<&LevelRecord> {
        self.levels.get(&(target, level))
    }
}

/// Device without a GPU behind it.
pub struct HeadlessDevice {
    caps: DeviceCaps,
    next_name: u32,
    textures: HashMap<TextureId, TextureRecord>,
    buffers: HashMap<BufferId, (BufferKind, Vec<u8>)>,
    bound: HashMap<TextureTarget, TextureId>,
}

impl HeadlessDevice {
    pub fn new(caps: DeviceCaps) -> Self {
        Self {
            caps,
            next_name: 1,
            textures: HashMap::new(),
            buffers: HashMap::new(),
            bound: HashMap::new(),
        }
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureRecord> {
        self.textures.get(&id)
    }

    /// Number of live (created, not deleted) textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn buffer(&self, id: BufferId) -> Option<(BufferKind, &[u8])> {
        self.buffers.get(&id).map(|(kind, data)| (*kind, data.as_slice()))
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn next_name(&mut self) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn bound_mut(&mut self, target: TextureTarget) -> Result<&mut TextureRecord, DeviceError> {
        let id = *self
            .bound
            .get(&target)
            .ok_or(DeviceError::NothingBound(target))?;
        self.textures
            .get_mut(&id)
            .ok_or(DeviceError::NothingBound(target))
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new(DeviceCaps::default())
    }
}

fn check_len(width: u32, height: u32, expected: usize, actual: usize) -> Result<(), DeviceError> {
    if width == 0 || height == 0 {
        return Err(DeviceError::EmptyUpload);
    }
    if actual < expected {
        return Err(DeviceError::ShortUpload {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}

impl GraphicsDevice for HeadlessDevice {
    fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    fn create_texture(&mut self) -> TextureId {
        let id = TextureId(self.next_name());
        self.textures.insert(id, TextureRecord::default());
        id
    }

    fn delete_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_none() {
            log::warn!("delete of unknown texture {id:?}");
        }
        self.bound.retain(|_, bound| *bound != id);
    }

    fn bind_texture(&mut self, target: TextureTarget, id: TextureId) {
        if let Some(record) = self.textures.get_mut(&id) {
            record.target.get_or_insert(target);
            self.bound.insert(target, id);
        } else {
            log::warn!("bind of unknown texture {id:?}");
        }
    }

    fn set_sampler(
        &mut self,
        target: TextureTarget,
        param: SamplerParam,
    ) -> Result<(), DeviceError> {
        self.bound_mut(target)?.sampler.apply(param);
        Ok(())
    }

    fn upload_image(&mut self, upload: &ImageUpload<'_>) -> Result<(), DeviceError> {
        if upload.internal_format.is_block_compressed() {
            return Err(DeviceError::UnexpectedBlockFormat(upload.internal_format));
        }
        let expected = upload.expected_len();
        check_len(upload.width, upload.height, expected, upload.data.len())?;

        let record = self.bound_mut(upload.target.texture_target())?;
        record.levels.insert(
            (upload.target, upload.level),
            LevelRecord {
                internal_format: upload.internal_format,
                format: Some(upload.format),
                width: upload.width,
                height: upload.height,
                data: upload.data[..expected].to_vec(),
            },
        );
        Ok(())
    }

    fn upload_compressed(&mut self, upload: &CompressedUpload<'_>) -> Result<(), DeviceError> {
        let block = upload
            .internal_format
            .block_bytes()
            .ok_or(DeviceError::NotBlockCompressed(upload.internal_format))?;
        let expected =
            upload.width.div_ceil(4) as usize * upload.height.div_ceil(4) as usize * block;
        check_len(upload.width, upload.height, expected, upload.data.len())?;

        let record = self.bound_mut(upload.target.texture_target())?;
        record.levels.insert(
            (upload.target, upload.level),
            LevelRecord {
                internal_format: upload.internal_format,
                format: None,
                width: upload.width,
                height: upload.height,
                data: upload.data[..expected].to_vec(),
            },
        );
        Ok(())
    }

    fn generate_mipmap(&mut self, target: TextureTarget) -> Result<(), DeviceError> {
        if !self.caps.generate_mipmap {
            log::warn!("generate_mipmap called on a device without support");
        }
        self.bound_mut(target)?.mipmaps_generated = true;
        Ok(())
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferId {
        let id = BufferId(self.next_name());
        self.buffers.insert(id, (kind, data.to_vec()));
        id
    }

    fn delete_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(&id).is_none() {
            log::warn!("delete of unknown buffer {id:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_requires_bound_texture() {
        let mut device = HeadlessDevice::default();
        let upload = ImageUpload {
            target: ImageTarget::Texture2D,
            level: 0,
            internal_format: InternalFormat::Rgba,
            width: 1,
            height: 1,
            format: PixelFormat::Rgba,
            data: &[1, 2, 3, 4],
        };
        assert_eq!(
            device.upload_image(&upload),
            Err(DeviceError::NothingBound(TextureTarget::Texture2D))
        );

        let id = device.create_texture();
        device.bind_texture(TextureTarget::Texture2D, id);
        device.upload_image(&upload).expect("upload");
        let level = device.texture(id).unwrap().level(ImageTarget::Texture2D, 0).unwrap();
        assert_eq!(level.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn short_uploads_are_rejected() {
        let mut device = HeadlessDevice::default();
        let id = device.create_texture();
        device.bind_texture(TextureTarget::Texture2D, id);
        let err = device
            .upload_compressed(&CompressedUpload {
                target: ImageTarget::Texture2D,
                level: 0,
                internal_format: InternalFormat::Dxt5,
                width: 8,
                height: 8,
                data: &[0; 32],
            })
            .unwrap_err();
        assert_eq!(
            err,
            DeviceError::ShortUpload {
                width: 8,
                height: 8,
                expected: 64,
                actual: 32
            }
        );
    }

    #[test]
    fn deleting_unbinds() {
        let mut device = HeadlessDevice::default();
        let id = device.create_texture();
        device.bind_texture(TextureTarget::CubeMap, id);
        device.delete_texture(id);
        assert_eq!(device.texture_count(), 0);
        assert!(device.generate_mipmap(TextureTarget::CubeMap).is_err());
    }
}
