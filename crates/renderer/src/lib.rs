//! Renderer seam: the graphics device interface the content core uploads through.
//!
//! The core never talks to a graphics API directly. Everything it needs
//! (texture objects, level uploads, sampler state, mip generation, vertex
//! buffers) goes through [`GraphicsDevice`]. [`HeadlessDevice`] implements it
//! in memory and is what tools and tests run against.

use std::cell::RefCell;
use std::rc::Rc;

pub mod caps;
pub mod device;
pub mod headless;

pub use caps::DeviceCaps;
pub use device::{
    BufferId, BufferKind, CompressedUpload, CubeFace, DeviceError, GraphicsDevice, ImageTarget,
    ImageUpload, InternalFormat, MagFilter, MinFilter, PixelFormat, SamplerParam, TextureId,
    TextureTarget, Wrap,
};
pub use headless::{HeadlessDevice, LevelRecord, SamplerState, TextureRecord};

/// Device shared by every loader on the content thread.
pub type SharedDevice = Rc<RefCell<dyn GraphicsDevice>>;

/// Wrap a concrete device for sharing.
pub fn share<D: GraphicsDevice + 'static>(device: D) -> Rc<RefCell<D>> {
    Rc::new(RefCell::new(device))
}
