//! # Update Scheduler
//!
//! Turns an invalidated region into regenerated blocks.
//!
//! Every block the region touches is remeshed over its full bounds and written to the store
//! before `update` returns, so the next draw pass never sees a block that was reported
//! updated but not yet remeshed.

use std::ops::AddAssign;

use log::{debug, info};

use super::{
    backend::MeshBackend,
    block_grid::{BlockGrid, BlockIndex},
    block_mesh_store::BlockMeshStore,
};
use crate::engine_state::{
    error::DisplayError,
    rendering::meshing::Mesher,
    voxels::{region::Region, volume::VoxelVolume},
};

/// What an update did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Blocks the region touched
    pub blocks_touched: usize,
    /// Blocks that received new geometry
    pub blocks_meshed: usize,
    /// Blocks whose regenerated geometry was empty
    pub blocks_cleared: usize,
    /// Vertices uploaded across all meshed blocks
    pub vertices_uploaded: usize,
}

impl AddAssign for UpdateReport {
    fn add_assign(&mut self, other: Self) {
        self.blocks_touched += other.blocks_touched;
        self.blocks_meshed += other.blocks_meshed;
        self.blocks_cleared += other.blocks_cleared;
        self.vertices_uploaded += other.vertices_uploaded;
    }
}

/// Drives block regeneration through a meshing function.
pub struct UpdateScheduler<M> {
    mesher: M,
    totals: UpdateReport,
    updates: u64,
}

impl<M> UpdateScheduler<M> {
    /// Creates a scheduler meshing blocks with `mesher`.
    pub fn new(mesher: M) -> Self {
        Self {
            mesher,
            totals: UpdateReport::default(),
            updates: 0,
        }
    }

    /// Work done by every update so far, including partially completed ones.
    pub fn totals(&self) -> UpdateReport {
        self.totals
    }

    /// Number of non-empty updates run.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Regenerates every block `region` touches.
    ///
    /// An empty region is a no-op. On error the blocks processed before the failing one keep
    /// their new geometry and the failing block keeps its previous geometry.
    pub fn update<V, B>(
        &mut self,
        volume: &V,
        grid: &BlockGrid,
        store: &mut BlockMeshStore<B>,
        region: &Region,
    ) -> Result<UpdateReport, DisplayError>
    where
        V: VoxelVolume + ?Sized,
        M: Mesher<V>,
        B: MeshBackend,
    {
        let blocks = grid.blocks_touching(region)?;
        if blocks.is_empty() {
            return Ok(UpdateReport::default());
        }

        let mut report = UpdateReport {
            blocks_touched: blocks.len(),
            ..UpdateReport::default()
        };
        let result = blocks
            .iter()
            .try_for_each(|block| self.regenerate(volume, grid, store, block, &mut report));

        self.updates += 1;
        self.totals += report;
        result?;

        info!(
            "Updated region {:?}..{:?}: {} blocks meshed, {} cleared, {} vertices",
            region.min,
            region.max,
            report.blocks_meshed,
            report.blocks_cleared,
            report.vertices_uploaded
        );
        Ok(report)
    }

    fn regenerate<V, B>(
        &self,
        volume: &V,
        grid: &BlockGrid,
        store: &mut BlockMeshStore<B>,
        block: BlockIndex,
        report: &mut UpdateReport,
    ) -> Result<(), DisplayError>
    where
        V: VoxelVolume + ?Sized,
        M: Mesher<V>,
        B: MeshBackend,
    {
        let bounds = grid.bounds_of(block)?;
        let mesh = self
            .mesher
            .mesh(volume, &bounds)
            .and_then(|mesh| mesh.validate().map(|()| mesh))
            .map_err(|source| DisplayError::Meshing { block, source })?;

        if mesh.is_empty() {
            store.clear(block)?;
            report.blocks_cleared += 1;
            debug!("Block {:?} is empty", block);
        } else {
            store.set(block, &mesh, grid.translation_of(block))?;
            report.blocks_meshed += 1;
            report.vertices_uploaded += mesh.vertices.len();
            debug!(
                "Block {:?} meshed: {} vertices, {} indices",
                block,
                mesh.vertices.len(),
                mesh.indices.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::engine_state::{
        displayer::backend::CpuMeshBackend,
        error::MeshingError,
        rendering::meshing::{CubicMesher, MeshData},
        voxels::{
            volume::VoxelMap,
            voxel::{Material, Voxel},
        },
    };

    fn setup() -> (VoxelMap, BlockGrid, BlockMeshStore<CpuMeshBackend>) {
        let map = VoxelMap::new(Vector3::new(32, 16, 16));
        let grid = BlockGrid::new(map.extent(), 16).unwrap();
        let store = BlockMeshStore::new(&grid, CpuMeshBackend::new());
        (map, grid, store)
    }

    #[test]
    fn test_report_counts_meshed_and_cleared_blocks() {
        let (map, grid, mut store) = setup();
        map.set_voxel(Point3::new(20, 1, 1), Voxel::new(Material::STONE))
            .unwrap();

        let mut scheduler = UpdateScheduler::new(CubicMesher);
        let report = scheduler
            .update(&map, &grid, &mut store, &map.full_region())
            .unwrap();
        assert_eq!(
            report,
            UpdateReport {
                blocks_touched: 2,
                blocks_meshed: 1,
                blocks_cleared: 1,
                vertices_uploaded: 24,
            }
        );
        assert_eq!(scheduler.totals(), report);
        assert_eq!(scheduler.updates(), 1);
    }

    #[test]
    fn test_empty_region_is_noop() {
        let (map, grid, mut store) = setup();
        let mut scheduler = UpdateScheduler::new(CubicMesher);
        let empty = Region::new(Point3::new(3, 3, 3), Point3::new(3, 8, 8));
        let report = scheduler.update(&map, &grid, &mut store, &empty).unwrap();
        assert_eq!(report, UpdateReport::default());
        assert_eq!(scheduler.updates(), 0);
    }

    #[test]
    fn test_malformed_geometry_is_a_meshing_error() {
        let (map, grid, mut store) = setup();
        let broken = |_: &VoxelMap, _: &Region| -> Result<MeshData, MeshingError> {
            Ok(MeshData::new(Vec::new(), vec![0, 1, 2]))
        };
        let mut scheduler = UpdateScheduler::new(broken);
        let err = scheduler
            .update(&map, &grid, &mut store, &map.full_region())
            .unwrap_err();
        assert!(matches!(
            err,
            DisplayError::Meshing {
                block,
                source: MeshingError::IndexOutOfRange { .. }
            } if block == BlockIndex::new(0, 0, 0)
        ));
        assert_eq!(store.live_blocks(), 0);
    }
}
