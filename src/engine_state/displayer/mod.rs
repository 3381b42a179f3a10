//! # Displayer Module
//!
//! The chunked, incrementally updated mesh cache sitting between a voxel volume and the draw
//! path.
//!
//! ## Key Components
//!
//! * `BlockGrid` - maps voxels and regions onto fixed-size blocks
//! * `BlockMeshStore` - one geometry slot per block, backed by a `MeshBackend`
//! * `UpdateScheduler` - regenerates exactly the blocks an update touches
//! * `Displayer` - owns the three and exposes `update` and `display`
//!
//! ## Data Flow
//!
//! 1. The application mutates the volume
//! 2. It calls `Displayer::update` with the bounding region of the change
//! 3. Every touched block is remeshed over its full bounds and stored
//! 4. `Displayer::display` draws every non-empty block once per frame
//!
//! ## Threading
//!
//! Nothing here locks. `update` and `display` run on the thread owning the graphics device
//! and must be serialized by the caller.

mod backend;
mod block_grid;
mod block_mesh_store;
mod update_scheduler;

pub use backend::{BlockDrawer, CpuMesh, CpuMeshBackend, MeshBackend};
pub use block_grid::{BlockGrid, BlockIndex, BlockRange};
pub use block_mesh_store::{BlockMesh, BlockMeshStore};
pub use update_scheduler::{UpdateReport, UpdateScheduler};

use log::info;

use super::{
    config::DisplayerConfig,
    error::DisplayError,
    rendering::meshing::Mesher,
    voxels::{region::Region, volume::VoxelVolume},
};

/// Renders a voxel volume through a per-block mesh cache.
///
/// The displayer borrows the volume for its whole life and never mutates it. Slots start
/// empty: nothing is drawn until an `update` covers a block.
///
/// # Examples
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use voxel_map_displayer::{
///     BlockMesh, CpuMesh, CpuMeshBackend, CubicMesher, Displayer, Material, Voxel, VoxelMap,
///     VoxelVolume,
/// };
///
/// let map = VoxelMap::new(Vector3::new(32, 16, 16));
/// map.set_voxel(Point3::new(20, 3, 3), Voxel::new(Material::GRASS)).unwrap();
///
/// let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
/// displayer.update(&map.full_region()).unwrap();
///
/// let mut drawn = Vec::new();
/// displayer.display(&mut |mesh: &BlockMesh<CpuMesh>| drawn.push(mesh.index));
/// assert_eq!(drawn.len(), 1);
/// ```
pub struct Displayer<'v, V, M, B>
where
    V: VoxelVolume + ?Sized,
    B: MeshBackend,
{
    volume: &'v V,
    grid: BlockGrid,
    store: BlockMeshStore<B>,
    scheduler: UpdateScheduler<M>,
}

impl<'v, V, M, B> Displayer<'v, V, M, B>
where
    V: VoxelVolume + ?Sized,
    M: Mesher<V>,
    B: MeshBackend,
{
    /// Lays a grid of `buffer_size`-wide blocks over `volume`, all slots empty.
    ///
    /// # Errors
    /// `ContractViolation` for a zero block size.
    pub fn new(
        volume: &'v V,
        buffer_size: u32,
        mesher: M,
        backend: B,
    ) -> Result<Self, DisplayError> {
        let grid = BlockGrid::new(volume.extent(), buffer_size)?;
        let store = BlockMeshStore::new(&grid, backend);
        let dims = grid.dims();
        info!(
            "Displayer over {:?} voxels: {}x{}x{} blocks of {}",
            grid.extent(),
            dims.x,
            dims.y,
            dims.z,
            buffer_size
        );

        Ok(Self {
            volume,
            grid,
            store,
            scheduler: UpdateScheduler::new(mesher),
        })
    }

    /// Like `new`, taking the block size and memory budget from `config`.
    pub fn with_config(
        volume: &'v V,
        config: &DisplayerConfig,
        mesher: M,
        mut backend: B,
    ) -> Result<Self, DisplayError> {
        backend.set_memory_budget(config.gpu_memory_budget);
        Self::new(volume, config.buffer_size, mesher, backend)
    }

    /// Regenerates every block touched by `region`, which must lie inside the volume.
    ///
    /// Returns only once all touched blocks are rebuilt, so a following `display` reflects
    /// the volume as of this call.
    ///
    /// # Errors
    /// * `ContractViolation` for an inverted region or one reaching outside the volume;
    ///   nothing is modified.
    /// * `ResourceExhaustion` or `Meshing` for the first block that fails. Blocks before it
    ///   are updated, the failing block keeps its previous geometry.
    pub fn update(&mut self, region: &Region) -> Result<UpdateReport, DisplayError> {
        self.scheduler
            .update(self.volume, &self.grid, &mut self.store, region)
    }

    /// Regenerates every block.
    pub fn update_all(&mut self) -> Result<UpdateReport, DisplayError> {
        let region = self.grid.volume_region();
        self.update(&region)
    }

    /// Hands every non-empty block to `drawer` once and returns how many were drawn.
    ///
    /// A pure read of cached state.
    pub fn display<D>(&self, drawer: &mut D) -> usize
    where
        D: BlockDrawer<B::Handle> + ?Sized,
    {
        let mut drawn = 0;
        self.store.for_each_non_empty(|mesh| {
            drawer.draw_block(mesh);
            drawn += 1;
        });
        drawn
    }

    /// The volume being displayed.
    pub fn volume(&self) -> &'v V {
        self.volume
    }

    /// The block grid.
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// The block mesh store.
    pub fn store(&self) -> &BlockMeshStore<B> {
        &self.store
    }

    /// Mutable access to the mesh backend.
    pub fn backend_mut(&mut self) -> &mut B {
        self.store.backend_mut()
    }

    /// Work done by all updates so far.
    pub fn totals(&self) -> UpdateReport {
        self.scheduler.totals()
    }
}
