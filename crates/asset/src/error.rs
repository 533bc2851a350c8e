use std::fmt;
use std::io;
use std::path::PathBuf;

use renderer::DeviceError;
use thiserror::Error;

/// Everything that can go wrong while building an asset.
///
/// Loaders never panic on bad data; they return one of these, and the public
/// entry points write it to the caller's error sink.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Tried to double load texture {0}")]
    DoubleLoad(String),
    #[error("Tried to load a texture with an empty name")]
    EmptyName,
    #[error("Error loading file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error decoding image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to parse {name}: {message}")]
    Parse { name: String, message: String },
    #[error("Texture has unknown format ({bytes_per_pixel} bytes per pixel): {name}")]
    UnknownFormat { name: String, bytes_per_pixel: usize },
    #[error("Cube map sides aren't equal sizes: {name}")]
    CubeFaceMismatch { name: String },
    #[error("Vertical cross {name} is {width}x{height}, not a 3x4 grid of square faces")]
    BadCrossLayout { name: String, width: u32, height: u32 },
    #[error("Malformed DDS file {name}: {reason}")]
    Dds { name: String, reason: String },
    #[error("Archive entry not found: {0}")]
    MissingEntry(String),
    #[error("Mesh {0} contains no geometry")]
    EmptyMesh(String),
    #[error("Device rejected {context}: {source}")]
    Device {
        context: &'static str,
        #[source]
        source: DeviceError,
    },
}

pub type AssetResult<T> = Result<T, AssetError>;

impl AssetError {
    pub(crate) fn device(context: &'static str) -> impl FnOnce(DeviceError) -> AssetError {
        move |source| AssetError::Device { context, source }
    }
}

/// Write a failure to the error sink and the log.
pub fn report(error: &mut dyn fmt::Write, err: &AssetError) {
    log::warn!("{err}");
    let _ = writeln!(error, "{err}");
}
