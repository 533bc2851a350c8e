//! Engine settings, read from a RON file.

use std::path::Path;

use anyhow::{Context, Result};
use asset::SizeTier;
use renderer::DeviceCaps;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the content tree; `--data=` overrides it.
    pub data_path: String,
    /// Anisotropic filtering requested for scene textures; 0 or 1 disables it.
    pub anisotropy: u32,
    pub texture_size: SizeTier,
    /// What the (headless) device reports it can do.
    pub caps: DeviceCaps,
    /// Eye offset of the free camera relative to its position.
    pub camera_offset: [f32; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: "data".to_owned(),
            anisotropy: 0,
            texture_size: SizeTier::Full,
            caps: DeviceCaps::default(),
            camera_offset: [0.0, 0.0, 1.5],
        }
    }
}

impl Settings {
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).context("invalid settings")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = Settings::from_ron("(anisotropy: 8, texture_size: Medium)").unwrap();
        assert_eq!(settings.anisotropy, 8);
        assert_eq!(settings.texture_size, SizeTier::Medium);
        assert_eq!(settings.data_path, "data");
        assert!(settings.caps.npot_textures);
    }

    #[test]
    fn caps_can_be_restricted() {
        let settings =
            Settings::from_ron("(caps: (npot_textures: false, generate_mipmap: false))").unwrap();
        assert!(!settings.caps.npot_textures);
        assert!(!settings.caps.generate_mipmap);
        assert!(settings.caps.vertex_buffers);
    }

    #[test]
    fn unknown_tier_is_an_error() {
        assert!(Settings::from_ron("(texture_size: Huge)").is_err());
    }
}
