use std::fmt;
use std::rc::Rc;

use renderer::SharedDevice;

use crate::cache::{AssetFactory, AssetKey};
use crate::error::{AssetError, AssetResult};
use crate::texture::{RawImage, Texture, TextureInfo};

/// Where a texture is built from.
#[derive(Clone, Copy, Debug)]
pub enum TextureSource<'a> {
    /// Image or DDS file at `base_path/path/name` (cube maps: the six-file prefix).
    File(&'a TextureInfo),
    /// Pixels already in memory.
    Pixels(RawImage<'a>, &'a TextureInfo),
}

pub struct TextureFactory {
    device: SharedDevice,
    default: Rc<Texture>,
    zero: Rc<Texture>,
}

impl TextureFactory {
    /// Build the factory with its 1x1 white default and 1x1 black zero textures.
    pub fn initialize(device: SharedDevice) -> AssetResult<Self> {
        let default = Rc::new(solid(&device, "default white", 0xff)?);
        let zero = Rc::new(solid(&device, "zero black", 0x00)?);
        Ok(Self { device, default, zero })
    }

    /// Black texture bound to material slots that have nothing in them.
    pub fn zero(&self) -> Rc<Texture> {
        Rc::clone(&self.zero)
    }
}

fn solid(device: &SharedDevice, name: &str, value: u8) -> AssetResult<Texture> {
    let pixel = [value; 4];
    let info = TextureInfo {
        mipmap: false,
        compress: false,
        ..TextureInfo::default()
    };
    let mut texture = Texture::new(Rc::clone(device));
    let mut error = String::new();
    if texture.load_pixels(RawImage::new(1, 1, 4, &pixel), &info, &mut error) {
        Ok(texture)
    } else {
        Err(AssetError::Parse {
            name: name.to_owned(),
            message: error.trim_end().to_owned(),
        })
    }
}

impl AssetFactory for TextureFactory {
    type Asset = Texture;
    type Source<'s> = TextureSource<'s>;

    fn create(
        &mut self,
        error: &mut dyn fmt::Write,
        key: &AssetKey,
        source: TextureSource<'_>,
    ) -> Option<Rc<Texture>> {
        let mut texture = Texture::new(Rc::clone(&self.device));
        let loaded = match source {
            TextureSource::File(info) => texture.load(key.full_path(), info, error),
            TextureSource::Pixels(raw, info) => texture.load_pixels(raw, info, error),
        };
        loaded.then(|| Rc::new(texture))
    }

    fn default_asset(&self) -> Rc<Texture> {
        Rc::clone(&self.default)
    }
}
