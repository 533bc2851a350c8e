//! Content core: asset cache and factories, meshes and models, texture pipeline.
//!
//! Loading is synchronous and single-threaded. Assets are handed out as
//! `Rc<T>`; the cache keeps one strong reference per key so a key always
//! resolves to the same instance.

pub mod archive;
pub mod cache;
pub mod content;
pub mod error;
pub mod mesh;
pub mod model;
pub mod model_factory;
pub mod obj;
pub mod texture;
pub mod texture_factory;

pub use archive::{Archive, MemoryArchive, PackArchive};
pub use cache::{AssetCache, AssetFactory, AssetKey};
pub use content::ContentManager;
pub use error::{AssetError, AssetResult};
pub use mesh::{MeshData, MeshVertex};
pub use model::Model;
pub use model_factory::{ModelFactory, ModelSource};
pub use texture::{ColorSpace, RawImage, SizeTier, Texture, TextureInfo};
pub use texture_factory::{TextureFactory, TextureSource};
