use serde::Deserialize;

/// What the current rendering context can do.
///
/// Loaded from the engine settings file; every field has a default so a
/// partial RON table is enough.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceCaps {
    /// Non-power-of-two texture dimensions are accepted.
    pub npot_textures: bool,
    /// The driver can build mip chains on request.
    pub generate_mipmap: bool,
    /// Highest anisotropy level, `0.0` when anisotropic filtering is unavailable.
    pub max_anisotropy: f32,
    /// Geometry may live in GPU buffer objects.
    pub vertex_buffers: bool,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            npot_textures: true,
            generate_mipmap: true,
            max_anisotropy: 16.0,
            vertex_buffers: true,
        }
    }
}

impl DeviceCaps {
    /// Capabilities of an old fixed-function context: no NPOT, no driver mips, no extensions.
    pub fn legacy() -> Self {
        Self {
            npot_textures: false,
            generate_mipmap: false,
            max_anisotropy: 0.0,
            vertex_buffers: false,
        }
    }

    #[inline]
    pub fn anisotropy_supported(&self) -> bool {
        self.max_anisotropy > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults() {
        let caps: DeviceCaps = ron::from_str("(npot_textures: false)").expect("parse caps");
        assert!(!caps.npot_textures);
        assert!(caps.generate_mipmap);
        assert_eq!(caps.max_anisotropy, 16.0);
    }
}
