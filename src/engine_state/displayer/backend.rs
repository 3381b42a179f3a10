//! # Mesh Backends
//!
//! The seam between the block mesh store and wherever block geometry actually lives.
//!
//! `MeshBackend` turns mesh data into a resource handle and releases handles again; the GPU
//! implementation is `buffer_state::WgpuMeshBackend`. `CpuMeshBackend` keeps geometry in host
//! memory, which lets the whole displayer run without a graphics device.
//!
//! `BlockDrawer` is the matching seam on the draw side: `Displayer::display` hands every
//! non-empty block to it once.

use cgmath::Vector3;
use log::debug;

use super::{block_grid::BlockIndex, block_mesh_store::BlockMesh};
use crate::engine_state::{error::DisplayError, rendering::meshing::MeshData};

/// Allocates and frees per-block geometry resources.
pub trait MeshBackend {
    /// Resource owned by a live block.
    type Handle;

    /// Uploads `mesh` for `block`, placed in world space by `translation`.
    ///
    /// `replacing` is the handle the new geometry supersedes. It stays live until the caller
    /// releases it, but the budget check treats its bytes as already freed.
    ///
    /// # Errors
    /// `ResourceExhaustion` when the allocation fails or would exceed the memory budget.
    fn upload(
        &mut self,
        block: BlockIndex,
        mesh: &MeshData,
        translation: Vector3<f32>,
        replacing: Option<&Self::Handle>,
    ) -> Result<Self::Handle, DisplayError>;

    /// Frees a handle previously returned by `upload`.
    fn release(&mut self, handle: Self::Handle);

    /// Caps the bytes this backend may hold at once. `None` removes the cap.
    fn set_memory_budget(&mut self, budget: Option<u64>);
}

/// Issues the draw for one block.
pub trait BlockDrawer<H> {
    /// Draws `mesh` with its stored translation.
    fn draw_block(&mut self, mesh: &BlockMesh<H>);
}

impl<H, F> BlockDrawer<H> for F
where
    F: FnMut(&BlockMesh<H>),
{
    fn draw_block(&mut self, mesh: &BlockMesh<H>) {
        self(mesh)
    }
}

/// Host-side copy of a block's geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuMesh {
    /// Block the geometry was uploaded for
    pub block: BlockIndex,
    /// Uploaded geometry
    pub mesh: MeshData,
    /// World-space offset of the block
    pub translation: Vector3<f32>,
    /// Sequence number of the upload, starting at 1
    pub generation: u64,
}

/// Mesh backend keeping geometry in host memory.
///
/// Counts uploads and releases and tracks live bytes, so tests can check that replaced
/// blocks never leak their previous geometry.
#[derive(Debug, Default)]
pub struct CpuMeshBackend {
    budget: Option<u64>,
    allocated_bytes: u64,
    uploads: u64,
    releases: u64,
}

impl CpuMeshBackend {
    /// Creates a backend without a memory budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend refusing uploads that would exceed `budget` live bytes.
    pub fn with_budget(budget: u64) -> Self {
        Self {
            budget: Some(budget),
            ..Self::default()
        }
    }

    /// Bytes currently held by live handles.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }

    /// Number of successful uploads.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Number of released handles.
    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Handles uploaded and not yet released.
    pub fn live_handles(&self) -> u64 {
        self.uploads - self.releases
    }
}

impl MeshBackend for CpuMeshBackend {
    type Handle = CpuMesh;

    fn upload(
        &mut self,
        block: BlockIndex,
        mesh: &MeshData,
        translation: Vector3<f32>,
        replacing: Option<&CpuMesh>,
    ) -> Result<CpuMesh, DisplayError> {
        let requested_bytes = mesh.byte_size();
        let replaced_bytes = replacing.map_or(0, |old| old.mesh.byte_size());
        if let Some(budget) = self.budget {
            if self.allocated_bytes.saturating_sub(replaced_bytes) + requested_bytes > budget {
                return Err(DisplayError::ResourceExhaustion {
                    block,
                    requested_bytes,
                    reason: format!(
                        "budget of {} bytes exceeded ({} bytes live)",
                        budget, self.allocated_bytes
                    ),
                });
            }
        }

        self.allocated_bytes += requested_bytes;
        self.uploads += 1;
        debug!("CPU upload #{} for block {:?}", self.uploads, block);

        Ok(CpuMesh {
            block,
            mesh: mesh.clone(),
            translation,
            generation: self.uploads,
        })
    }

    fn release(&mut self, handle: CpuMesh) {
        self.allocated_bytes -= handle.mesh.byte_size();
        self.releases += 1;
    }

    fn set_memory_budget(&mut self, budget: Option<u64>) {
        self.budget = budget;
    }
}
