//! One cache per asset kind over a shared device and data directory.

use std::fmt;
use std::rc::Rc;

use renderer::SharedDevice;

use crate::archive::Archive;
use crate::cache::{AssetCache, AssetKey};
use crate::error::AssetResult;
use crate::mesh::MeshData;
use crate::model::Model;
use crate::model_factory::{ModelFactory, ModelSource};
use crate::texture::{RawImage, Texture, TextureInfo};
use crate::texture_factory::{TextureFactory, TextureSource};

pub struct ContentManager {
    device: SharedDevice,
    base_path: String,
    models: AssetCache<ModelFactory>,
    textures: AssetCache<TextureFactory>,
}

impl ContentManager {
    /// Set up the factories; vertex buffers are used when the device supports them.
    pub fn new(device: SharedDevice, base_path: impl Into<String>) -> AssetResult<Self> {
        let use_vbo = device.borrow().caps().vertex_buffers;
        let models = AssetCache::new(ModelFactory::initialize(Rc::clone(&device), use_vbo)?);
        let textures = AssetCache::new(TextureFactory::initialize(Rc::clone(&device))?);
        let base_path = base_path.into();
        log::info!("Content manager ready: data={base_path}, vbo={use_vbo}");
        Ok(Self {
            device,
            base_path,
            models,
            textures,
        })
    }

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn key(&self, path: &str, name: &str) -> AssetKey {
        AssetKey::new(self.base_path.as_str(), path, name)
    }

    /// Texture `path/name`, loaded on first request. `None` after a reported failure.
    pub fn try_load_texture(
        &mut self,
        error: &mut dyn fmt::Write,
        path: &str,
        name: &str,
        info: &TextureInfo,
    ) -> Option<Rc<Texture>> {
        let key = self.key(path, name);
        self.textures.try_load(error, &key, TextureSource::File(info))
    }

    /// Like [`ContentManager::try_load_texture`], falling back to the white default.
    pub fn load_texture(
        &mut self,
        error: &mut dyn fmt::Write,
        path: &str,
        name: &str,
        info: &TextureInfo,
    ) -> Rc<Texture> {
        let key = self.key(path, name);
        self.textures.load(error, &key, TextureSource::File(info))
    }

    /// Texture from caller-owned pixels, cached under `path/name`.
    pub fn load_texture_pixels(
        &mut self,
        error: &mut dyn fmt::Write,
        path: &str,
        name: &str,
        raw: RawImage<'_>,
        info: &TextureInfo,
    ) -> Option<Rc<Texture>> {
        let key = self.key(path, name);
        self.textures.try_load(error, &key, TextureSource::Pixels(raw, info))
    }

    pub fn get_texture(&self, path: &str, name: &str) -> Option<Rc<Texture>> {
        self.textures.get(&self.key(path, name))
    }

    pub fn zero_texture(&self) -> Rc<Texture> {
        self.textures.factory().zero()
    }

    /// OBJ model `path/name` from disk.
    pub fn load_model(
        &mut self,
        error: &mut dyn fmt::Write,
        path: &str,
        name: &str,
    ) -> Option<Rc<Model>> {
        let key = self.key(path, name);
        self.models.try_load(error, &key, ModelSource::File)
    }

    /// OBJ model `name` from a pack, cached under `path/name`.
    pub fn load_model_from_archive(
        &mut self,
        error: &mut dyn fmt::Write,
        path: &str,
        name: &str,
        archive: &dyn Archive,
    ) -> Option<Rc<Model>> {
        let key = self.key(path, name);
        self.models.try_load(error, &key, ModelSource::Archive(archive))
    }

    /// Model from in-memory geometry (procedural shapes, scaled variants).
    pub fn load_model_from_mesh(
        &mut self,
        error: &mut dyn fmt::Write,
        path: &str,
        name: &str,
        mesh: &MeshData,
    ) -> Option<Rc<Model>> {
        let key = self.key(path, name);
        self.models.try_load(error, &key, ModelSource::Mesh(mesh))
    }

    pub fn get_model(&self, path: &str, name: &str) -> Option<Rc<Model>> {
        self.models.get(&self.key(path, name))
    }

    pub fn models(&self) -> &AssetCache<ModelFactory> {
        &self.models
    }

    pub fn textures(&self) -> &AssetCache<TextureFactory> {
        &self.textures
    }
}
