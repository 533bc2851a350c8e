//! Drawable geometry: mesh data plus optional GPU buffer objects.

use renderer::{BufferId, BufferKind, SharedDevice};

use crate::error::{AssetError, AssetResult};
use crate::mesh::MeshData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelBuffers {
    pub vertex: BufferId,
    pub index: BufferId,
}

/// A mesh ready for drawing. With buffer objects enabled the geometry is also
/// uploaded; the buffers are released when the model is dropped.
pub struct Model {
    mesh: MeshData,
    buffers: Option<(SharedDevice, ModelBuffers)>,
}

impl Model {
    pub fn from_mesh(
        name: &str,
        mesh: MeshData,
        device: &SharedDevice,
        use_vbo: bool,
    ) -> AssetResult<Self> {
        if !mesh.is_valid() {
            return Err(AssetError::EmptyMesh(name.to_owned()));
        }

        let buffers = use_vbo.then(|| {
            let mut dev = device.borrow_mut();
            let buffers = ModelBuffers {
                vertex: dev.create_buffer(BufferKind::Vertex, mesh.vertex_bytes()),
                index: dev.create_buffer(BufferKind::Index, mesh.index_bytes()),
            };
            (device.clone(), buffers)
        });

        log::debug!(
            "Model {name}: {} vertices, {} indices, vbo={}",
            mesh.vertices.len(),
            mesh.indices.len(),
            buffers.is_some()
        );
        Ok(Self { mesh, buffers })
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn buffers(&self) -> Option<ModelBuffers> {
        self.buffers.as_ref().map(|(_, b)| *b)
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.indices.len() as u32
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        if let Some((device, buffers)) = self.buffers.take() {
            let mut dev = device.borrow_mut();
            dev.delete_buffer(buffers.vertex);
            dev.delete_buffer(buffers.index);
        }
    }
}
