use std::fmt;
use std::rc::Rc;

use renderer::SharedDevice;

use crate::archive::Archive;
use crate::cache::{AssetFactory, AssetKey};
use crate::error::{AssetError, AssetResult, report};
use crate::mesh::MeshData;
use crate::model::Model;
use crate::obj;

/// Where a model is built from.
#[derive(Clone, Copy)]
pub enum ModelSource<'a> {
    /// OBJ file at `base_path/path/name`.
    File,
    /// OBJ entry `name` inside a pack.
    Archive(&'a dyn Archive),
    /// Geometry already in memory (procedural or derived, e.g. a scaled variant).
    Mesh(&'a MeshData),
}

pub struct ModelFactory {
    device: SharedDevice,
    use_vbo: bool,
    default: Rc<Model>,
}

impl ModelFactory {
    /// Build the factory and its default model (a cube of edge 0.5).
    pub fn initialize(device: SharedDevice, use_vbo: bool) -> AssetResult<Self> {
        let mut cube = MeshData::unit_cube();
        cube.scale(0.5, 0.5, 0.5);
        let default = Rc::new(Model::from_mesh("default cube", cube, &device, use_vbo)?);
        Ok(Self {
            device,
            use_vbo,
            default,
        })
    }

    pub fn use_vbo(&self) -> bool {
        self.use_vbo
    }

    fn build(&self, key: &AssetKey, source: ModelSource<'_>) -> AssetResult<Model> {
        let mesh = match source {
            ModelSource::File => {
                let path = key.full_path();
                if !path.is_file() {
                    return Err(AssetError::Io {
                        path,
                        source: std::io::ErrorKind::NotFound.into(),
                    });
                }
                obj::load_obj(&path)?
            }
            ModelSource::Archive(archive) => {
                let bytes = archive
                    .load_entry(&key.name)
                    .ok_or_else(|| AssetError::MissingEntry(key.name.clone()))?;
                obj::parse_obj(&key.name, bytes)?
            }
            ModelSource::Mesh(mesh) => mesh.clone(),
        };
        Model::from_mesh(&key.name, mesh, &self.device, self.use_vbo)
    }
}

impl AssetFactory for ModelFactory {
    type Asset = Model;
    type Source<'s> = ModelSource<'s>;

    fn create(
        &mut self,
        error: &mut dyn fmt::Write,
        key: &AssetKey,
        source: ModelSource<'_>,
    ) -> Option<Rc<Model>> {
        match self.build(key, source) {
            Ok(model) => {
                log::info!("Loaded model {key}");
                Some(Rc::new(model))
            }
            Err(err) => {
                report(error, &err);
                None
            }
        }
    }

    fn default_asset(&self) -> Rc<Model> {
        Rc::clone(&self.default)
    }
}
