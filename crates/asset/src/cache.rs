//! Keyed asset cache over pluggable factories.
//!
//! The cache memoizes: a key that resolved once keeps resolving to the same
//! `Rc` until it is explicitly removed. Failed creations are not cached, so a
//! later request for the same key tries again.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Identity of an asset: where it lives and what it is called.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey {
    pub base_path: String,
    pub path: String,
    pub name: String,
}

impl AssetKey {
    pub fn new(
        base_path: impl Into<String>,
        path: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            path: path.into(),
            name: name.into(),
        }
    }

    /// `base_path/path/name` on disk.
    pub fn full_path(&self) -> PathBuf {
        let mut full = PathBuf::from(&self.base_path);
        full.push(&self.path);
        full.push(&self.name);
        full
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.base_path, self.path, self.name)
    }
}

/// Builds assets of one kind from a source description.
pub trait AssetFactory {
    type Asset;
    /// Where the asset comes from; each factory defines its own variants.
    type Source<'s>;

    /// Build a fresh asset. Failures are written to `error`; `None` is returned.
    fn create(
        &mut self,
        error: &mut dyn fmt::Write,
        key: &AssetKey,
        source: Self::Source<'_>,
    ) -> Option<Rc<Self::Asset>>;

    /// Placeholder handed out when loading fails or is skipped.
    fn default_asset(&self) -> Rc<Self::Asset>;
}

pub struct AssetCache<F: AssetFactory> {
    factory: F,
    assets: HashMap<AssetKey, Rc<F::Asset>>,
}

impl<F: AssetFactory> AssetCache<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            assets: HashMap::new(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn get(&self, key: &AssetKey) -> Option<Rc<F::Asset>> {
        self.assets.get(key).cloned()
    }

    pub fn contains(&self, key: &AssetKey) -> bool {
        self.assets.contains_key(key)
    }

    /// Cached asset for `key`, creating it from `source` on first use.
    pub fn try_load(
        &mut self,
        error: &mut dyn fmt::Write,
        key: &AssetKey,
        source: F::Source<'_>,
    ) -> Option<Rc<F::Asset>> {
        if let Some(asset) = self.assets.get(key) {
            log::debug!("Cache hit: {key}");
            return Some(Rc::clone(asset));
        }

        log::debug!("Cache miss: {key}");
        let asset = self.factory.create(error, key, source)?;
        self.assets.insert(key.clone(), Rc::clone(&asset));
        Some(asset)
    }

    /// Like [`AssetCache::try_load`], but hands out the factory default on failure.
    pub fn load(
        &mut self,
        error: &mut dyn fmt::Write,
        key: &AssetKey,
        source: F::Source<'_>,
    ) -> Rc<F::Asset> {
        self.try_load(error, key, source)
            .unwrap_or_else(|| self.factory.default_asset())
    }

    /// Register an asset built elsewhere. An existing entry for `key` wins.
    pub fn insert(&mut self, key: AssetKey, asset: Rc<F::Asset>) -> Rc<F::Asset> {
        Rc::clone(self.assets.entry(key).or_insert(asset))
    }

    /// Drop the cache's reference; holders keep theirs.
    pub fn remove(&mut self, key: &AssetKey) -> Option<Rc<F::Asset>> {
        self.assets.remove(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn default_asset(&self) -> Rc<F::Asset> {
        self.factory.default_asset()
    }
}
