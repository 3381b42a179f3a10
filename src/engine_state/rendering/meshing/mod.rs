//! Mesh generation for voxel rendering.
//!
//! This module defines the contract between the displayer and the function that turns one
//! block of voxels into triangles, and ships the mesher the viewer uses.
//!
//! # Architecture
//! - `Mesher`: `(volume, block bounds) -> MeshData`. Any closure with that signature works.
//! - `MeshData`: a vertex list plus a triangle index list, positions local to `bounds.min`
//! - `CubicMesher`: one quad per exposed voxel face
//! - `face`: corner layout and winding of a single voxel face
//! - `MeshingRenderer`: the wgpu pipeline drawing cached block meshes

use crate::engine_state::{error::MeshingError, rendering::vertex::Vertex, voxels::region::Region};

mod cubic;
mod face;
mod renderer;

pub use cubic::CubicMesher;
pub use face::{Face, VoxelFace, FACE_INDICES};
pub use renderer::{MeshingRenderer, WgpuBlockDrawer};

/// Geometry produced for one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex list, positions relative to the block's minimum corner
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates mesh data from raw vertex and index lists.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Checks that the indices describe whole triangles over existing vertices.
    pub fn validate(&self) -> Result<(), MeshingError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshingError::IncompleteTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        match self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(MeshingError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Bytes needed to hold the vertex and index lists on the GPU.
    pub fn byte_size(&self) -> u64 {
        (std::mem::size_of_val(self.vertices.as_slice())
            + std::mem::size_of_val(self.indices.as_slice())) as u64
    }

    /// Appends a face, offsetting its indices past the vertices already present.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&face.vertices());
        self.indices.extend(FACE_INDICES.iter().map(|i| base + i));
    }
}

/// Turns the voxels inside `bounds` into block-local geometry.
///
/// Implementations may read voxels outside `bounds` for neighbour context, but must only
/// emit geometry for voxels inside it.
pub trait Mesher<V: ?Sized> {
    /// Generates geometry for one block.
    fn mesh(&self, volume: &V, bounds: &Region) -> Result<MeshData, MeshingError>;
}

impl<V: ?Sized, F> Mesher<V> for F
where
    F: Fn(&V, &Region) -> Result<MeshData, MeshingError>,
{
    fn mesh(&self, volume: &V, bounds: &Region) -> Result<MeshData, MeshingError> {
        self(volume, bounds)
    }
}
