//! # Block Mesh Store
//!
//! An arena with one slot per block, indexed by the block's flattened grid position. Each
//! slot holds either nothing or the backend resource for that block's current geometry.
//!
//! Replacing a block allocates the new resource before releasing the old one, so a failed
//! upload leaves the previous geometry in place. The backend is told which handle is being
//! replaced, so a memory budget only has to fit the new geometry. Every resource still held is released when
//! the store is dropped.

use cgmath::Vector3;
use log::debug;

use super::{
    backend::MeshBackend,
    block_grid::{BlockGrid, BlockIndex},
};
use crate::engine_state::{error::DisplayError, rendering::meshing::MeshData};

/// Cached geometry of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMesh<H> {
    /// Block this geometry belongs to
    pub index: BlockIndex,
    /// Backend resource holding the geometry
    pub handle: H,
    /// Number of vertices uploaded
    pub vertex_count: u32,
    /// Number of indices to draw
    pub index_count: u32,
    /// World-space offset of the block's local origin
    pub translation: Vector3<f32>,
}

/// Per-block geometry cache.
pub struct BlockMeshStore<B: MeshBackend> {
    grid: BlockGrid,
    backend: B,
    slots: Vec<Option<BlockMesh<B::Handle>>>,
    live_blocks: usize,
}

impl<B: MeshBackend> BlockMeshStore<B> {
    /// Creates a store with one empty slot per block of `grid`.
    pub fn new(grid: &BlockGrid, backend: B) -> Self {
        let mut slots = Vec::with_capacity(grid.block_count());
        slots.resize_with(grid.block_count(), || None);

        Self {
            grid: grid.clone(),
            backend,
            slots,
            live_blocks: 0,
        }
    }

    /// Uploads `mesh` as the geometry of `block`, replacing whatever the block held.
    ///
    /// Empty geometry clears the slot instead.
    ///
    /// # Errors
    /// `ContractViolation` for a block outside the grid, `ResourceExhaustion` when the upload
    /// fails. On error the slot is unchanged.
    pub fn set(
        &mut self,
        block: BlockIndex,
        mesh: &MeshData,
        translation: Vector3<f32>,
    ) -> Result<(), DisplayError> {
        let slot = self.grid.flatten(block)?;
        if mesh.is_empty() {
            self.release_slot(slot);
            return Ok(());
        }

        let current = self.slots[slot].as_ref().map(|old| &old.handle);
        let handle = self.backend.upload(block, mesh, translation, current)?;
        let previous = self.slots[slot].replace(BlockMesh {
            index: block,
            handle,
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.indices.len() as u32,
            translation,
        });

        match previous {
            Some(old) => self.backend.release(old.handle),
            None => self.live_blocks += 1,
        }
        Ok(())
    }

    /// Releases the geometry of `block`. Returns whether the block held any.
    pub fn clear(&mut self, block: BlockIndex) -> Result<bool, DisplayError> {
        let slot = self.grid.flatten(block)?;
        Ok(self.release_slot(slot))
    }

    /// Releases every block's geometry.
    pub fn clear_all(&mut self) {
        for slot in 0..self.slots.len() {
            self.release_slot(slot);
        }
    }

    fn release_slot(&mut self, slot: usize) -> bool {
        match self.slots[slot].take() {
            Some(mesh) => {
                debug!("Releasing geometry of block {:?}", mesh.index);
                self.backend.release(mesh.handle);
                self.live_blocks -= 1;
                true
            }
            None => false,
        }
    }

    /// Geometry currently cached for `block`, if any.
    pub fn get(&self, block: BlockIndex) -> Result<Option<&BlockMesh<B::Handle>>, DisplayError> {
        let slot = self.grid.flatten(block)?;
        Ok(self.slots[slot].as_ref())
    }

    /// Iterates over the blocks holding geometry, in slot order.
    ///
    /// Each call starts a fresh pass, so this is safe to use once per frame.
    pub fn iter_non_empty(&self) -> impl Iterator<Item = &BlockMesh<B::Handle>> {
        self.slots.iter().flatten()
    }

    /// Calls `f` once for every block holding geometry.
    pub fn for_each_non_empty(&self, f: impl FnMut(&BlockMesh<B::Handle>)) {
        self.iter_non_empty().for_each(f);
    }

    /// Number of blocks holding geometry.
    pub fn live_blocks(&self) -> usize {
        self.live_blocks
    }

    /// Number of slots, one per grid block.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the grid has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The backend owning the block resources.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend, e.g. to change its memory budget.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: MeshBackend> Drop for BlockMeshStore<B> {
    fn drop(&mut self) {
        self.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;
    use crate::engine_state::{
        displayer::backend::CpuMeshBackend,
        rendering::meshing::{Face, VoxelFace},
    };

    fn quads(count: i32) -> MeshData {
        let mut mesh = MeshData::default();
        for i in 0..count {
            mesh.push_face(&Face::new(i, 0, 0, VoxelFace::TOP, [1.0; 4]));
        }
        mesh
    }

    fn store() -> BlockMeshStore<CpuMeshBackend> {
        let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
        BlockMeshStore::new(&grid, CpuMeshBackend::new())
    }

    const ORIGIN: Vector3<f32> = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[test]
    fn test_new_store_has_empty_slots() {
        let store = store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.live_blocks(), 0);
        assert_eq!(store.iter_non_empty().count(), 0);
    }

    #[test]
    fn test_replace_releases_previous_geometry() {
        let mut store = store();
        let block = BlockIndex::new(1, 0, 0);
        store.set(block, &quads(1), ORIGIN).unwrap();
        store.set(block, &quads(3), ORIGIN).unwrap();

        assert_eq!(store.live_blocks(), 1);
        assert_eq!(store.backend().uploads(), 2);
        assert_eq!(store.backend().releases(), 1);
        assert_eq!(store.backend().allocated_bytes(), quads(3).byte_size());

        let mesh = store.get(block).unwrap().unwrap();
        assert_eq!(mesh.index_count, 18);
        assert_eq!(mesh.vertex_count, 12);
        assert_eq!(mesh.handle.generation, 2);
    }

    #[test]
    fn test_empty_geometry_clears_slot() {
        let mut store = store();
        let block = BlockIndex::new(0, 0, 0);
        store.set(block, &quads(2), ORIGIN).unwrap();
        store.set(block, &MeshData::default(), ORIGIN).unwrap();

        assert!(store.get(block).unwrap().is_none());
        assert_eq!(store.live_blocks(), 0);
        assert_eq!(store.backend().live_handles(), 0);
        assert!(!store.clear(block).unwrap());
    }

    #[test]
    fn test_failed_upload_keeps_previous_geometry() {
        let grid = BlockGrid::new(Vector3::new(16, 16, 16), 16).unwrap();
        let budget = quads(2).byte_size() - 1;
        let mut store = BlockMeshStore::new(&grid, CpuMeshBackend::with_budget(budget));
        let block = BlockIndex::new(0, 0, 0);
        store.set(block, &quads(1), ORIGIN).unwrap();

        let err = store.set(block, &quads(2), ORIGIN).unwrap_err();
        assert!(matches!(err, DisplayError::ResourceExhaustion { .. }));
        assert_eq!(store.get(block).unwrap().unwrap().index_count, 6);
        assert_eq!(store.live_blocks(), 1);
    }

    #[test]
    fn test_replacing_a_large_block_fits_the_budget() {
        let grid = BlockGrid::new(Vector3::new(16, 16, 16), 16).unwrap();
        let budget = quads(4).byte_size() * 3 / 2;
        let mut store = BlockMeshStore::new(&grid, CpuMeshBackend::with_budget(budget));
        let block = BlockIndex::new(0, 0, 0);

        store.set(block, &quads(4), ORIGIN).unwrap();
        store.set(block, &quads(4), ORIGIN).unwrap();
        assert_eq!(store.get(block).unwrap().unwrap().handle.generation, 2);
        assert_eq!(store.backend().allocated_bytes(), quads(4).byte_size());
    }

    #[test]
    fn test_out_of_grid_block_is_rejected() {
        let mut store = store();
        let err = store
            .set(BlockIndex::new(2, 0, 0), &quads(1), ORIGIN)
            .unwrap_err();
        assert!(err.is_contract_violation());
        assert!(store.clear(BlockIndex::new(0, 0, 1)).is_err());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut store = store();
        store.set(BlockIndex::new(0, 0, 0), &quads(1), ORIGIN).unwrap();
        store
            .set(BlockIndex::new(1, 0, 0), &quads(1), Vector3::new(16.0, 0.0, 0.0))
            .unwrap();

        let first: Vec<_> = store.iter_non_empty().map(|m| m.index).collect();
        let mut second = Vec::new();
        store.for_each_non_empty(|m| second.push(m.index));
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_clear_all_releases_everything() {
        let mut store = store();
        store.set(BlockIndex::new(0, 0, 0), &quads(1), ORIGIN).unwrap();
        store.set(BlockIndex::new(1, 0, 0), &quads(1), ORIGIN).unwrap();
        store.clear_all();
        assert_eq!(store.backend().live_handles(), 0);
        assert_eq!(store.backend().allocated_bytes(), 0);
    }
}
