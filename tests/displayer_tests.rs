//! Behaviour of the public `Displayer` contract, run on the host-memory backend.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use cgmath::{Point3, Vector3};
use voxel_map_displayer::{
    BlockIndex, BlockMesh, CpuMesh, CpuMeshBackend, CubicMesher, DisplayError, Displayer,
    Material, MeshBackend, MeshData, Mesher, MeshingError, Region, Voxel, VoxelMap, VoxelVolume,
};

const STONE: Voxel = Voxel {
    material: Material::STONE as u8,
};

fn region(min: [i32; 3], max: [i32; 3]) -> Region {
    Region::new(Point3::from(min), Point3::from(max))
}

/// Every displayed block with the geometry it would draw.
fn drawn<V, M>(displayer: &Displayer<'_, V, M, CpuMeshBackend>) -> BTreeMap<BlockIndex, MeshData>
where
    V: VoxelVolume + ?Sized,
    M: Mesher<V>,
{
    let mut meshes = BTreeMap::new();
    displayer.display(&mut |mesh: &BlockMesh<CpuMesh>| {
        assert!(meshes.insert(mesh.index, mesh.handle.mesh.clone()).is_none());
    });
    meshes
}

#[test]
fn empty_volume_draws_nothing() {
    let map = VoxelMap::new(Vector3::new(40, 20, 20));
    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();

    let report = displayer.update_all().unwrap();
    assert_eq!(report.blocks_touched, 3 * 2 * 2);
    assert_eq!(report.blocks_meshed, 0);
    assert!(drawn(&displayer).is_empty());
    assert_eq!(displayer.store().live_blocks(), 0);
}

#[test]
fn display_before_any_update_draws_nothing() {
    let map = VoxelMap::terrain(Vector3::new(32, 32, 32), 7);
    assert!(map.solid_count() > 0);

    let displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    assert!(drawn(&displayer).is_empty());
}

#[test]
fn region_across_block_edge_touches_both_blocks() {
    let map = VoxelMap::new(Vector3::new(32, 16, 16));
    map.set_voxel(Point3::new(15, 0, 0), STONE).unwrap();
    map.set_voxel(Point3::new(16, 0, 0), STONE).unwrap();

    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    let report = displayer.update(&region([14, 0, 0], [18, 1, 1])).unwrap();
    assert_eq!(report.blocks_touched, 2);
    assert_eq!(report.blocks_meshed, 2);

    let meshes = drawn(&displayer);
    assert_eq!(
        meshes.keys().copied().collect::<Vec<_>>(),
        vec![BlockIndex::new(0, 0, 0), BlockIndex::new(1, 0, 0)]
    );
    // The shared face between the two voxels is culled on both sides.
    for mesh in meshes.values() {
        assert_eq!(mesh.vertices.len(), 5 * 4);
    }
}

#[test]
fn region_ending_on_block_edge_stays_in_its_block() {
    let map = VoxelMap::new(Vector3::new(32, 16, 16));
    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();

    let report = displayer.update(&region([0, 0, 0], [16, 16, 16])).unwrap();
    assert_eq!(report.blocks_touched, 1);
}

#[test]
fn repeated_update_is_idempotent() {
    let map = VoxelMap::terrain(Vector3::new(48, 32, 48), 3);
    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();

    displayer.update_all().unwrap();
    let first = drawn(&displayer);
    let live = displayer.store().live_blocks();

    displayer.update_all().unwrap();
    assert_eq!(drawn(&displayer), first);
    assert_eq!(displayer.store().live_blocks(), live);

    let backend = displayer.store().backend();
    assert_eq!(backend.live_handles(), live as u64);
}

#[test]
fn edits_are_visible_after_update() {
    let map = VoxelMap::terrain(Vector3::new(48, 32, 48), 11);
    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    displayer.update_all().unwrap();

    let edits = [
        (Point3::new(15, 16, 15), 4, Voxel::EMPTY),
        (Point3::new(40, 30, 8), 3, STONE),
        (Point3::new(0, 0, 47), 6, Voxel::EMPTY),
    ];
    for (center, radius, voxel) in edits {
        let touched = map.fill_sphere(center, radius, voxel);
        let region = map.full_region().intersection(&touched.grown(1));
        displayer.update(&region).unwrap();
    }

    let mut fresh = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    fresh.update_all().unwrap();
    assert_eq!(drawn(&displayer), drawn(&fresh));
}

#[test]
fn emptied_block_is_skipped_and_keeps_its_slot() {
    let map = VoxelMap::new(Vector3::new(32, 16, 16));
    map.set_voxel(Point3::new(20, 4, 4), STONE).unwrap();
    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    displayer.update_all().unwrap();
    assert_eq!(drawn(&displayer).len(), 1);

    let changed = map.set_voxel(Point3::new(20, 4, 4), Voxel::EMPTY).unwrap();
    let report = displayer.update(&changed).unwrap();
    assert_eq!(report.blocks_cleared, 1);
    assert!(drawn(&displayer).is_empty());
    assert_eq!(displayer.store().len(), 2);
    assert_eq!(displayer.store().backend().live_handles(), 0);
}

#[test]
fn meshing_failure_keeps_previous_geometry() {
    let map = VoxelMap::new(Vector3::new(16, 16, 16));
    map.set_voxel(Point3::new(3, 3, 3), STONE).unwrap();

    let fail = Cell::new(false);
    let mesher = |volume: &VoxelMap, bounds: &Region| -> Result<MeshData, MeshingError> {
        if fail.get() {
            return Err(MeshingError::Failed("mesher offline".into()));
        }
        CubicMesher.mesh(volume, bounds)
    };
    let mut displayer = Displayer::new(&map, 16, mesher, CpuMeshBackend::new()).unwrap();
    displayer.update_all().unwrap();
    let before = drawn(&displayer);

    map.set_voxel(Point3::new(4, 3, 3), STONE).unwrap();
    fail.set(true);
    let err = displayer.update_all().unwrap_err();
    assert!(matches!(
        err,
        DisplayError::Meshing {
            source: MeshingError::Failed(_),
            ..
        }
    ));
    assert_eq!(drawn(&displayer), before);

    fail.set(false);
    displayer.update_all().unwrap();
    assert_ne!(drawn(&displayer), before);
}

#[test]
fn exhausted_budget_keeps_previous_geometry() {
    let map = VoxelMap::new(Vector3::new(16, 16, 16));
    map.set_voxel(Point3::new(3, 3, 3), STONE).unwrap();

    let one_cube = CubicMesher.mesh(&map, &map.full_region()).unwrap().byte_size();
    let mut displayer =
        Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::with_budget(one_cube * 2 - 1))
            .unwrap();
    displayer.update_all().unwrap();
    let before = drawn(&displayer);

    // Two separate cubes need twice the bytes of one.
    map.set_voxel(Point3::new(10, 10, 10), STONE).unwrap();
    let err = displayer.update_all().unwrap_err();
    assert!(matches!(
        err,
        DisplayError::ResourceExhaustion { block, .. } if block == BlockIndex::new(0, 0, 0)
    ));
    assert_eq!(drawn(&displayer), before);
    assert_eq!(displayer.store().backend().allocated_bytes(), one_cube);

    displayer.backend_mut().set_memory_budget(None);
    displayer.update_all().unwrap();
    assert_eq!(
        drawn(&displayer)[&BlockIndex::new(0, 0, 0)].vertices.len(),
        2 * 6 * 4
    );
}

#[test]
fn block_over_half_the_budget_can_be_regenerated() {
    let map = VoxelMap::new(Vector3::new(16, 16, 16));
    map.set_voxel(Point3::new(3, 3, 3), STONE).unwrap();

    let one_cube = CubicMesher.mesh(&map, &map.full_region()).unwrap().byte_size();
    let mut displayer = Displayer::new(
        &map,
        16,
        CubicMesher,
        CpuMeshBackend::with_budget(one_cube * 3 / 2),
    )
    .unwrap();

    let first = displayer.update_all().unwrap();
    let drawn_first = drawn(&displayer);
    let second = displayer.update_all().unwrap();
    assert_eq!(first, second);
    assert_eq!(drawn(&displayer), drawn_first);

    let backend = displayer.store().backend();
    assert_eq!(backend.uploads(), 2);
    assert_eq!(backend.allocated_bytes(), one_cube);
}

#[test]
fn invalid_inputs_are_contract_violations() {
    let map = VoxelMap::new(Vector3::new(32, 16, 16));
    map.set_voxel(Point3::new(1, 1, 1), STONE).unwrap();

    let zero = Displayer::new(&map, 0, CubicMesher, CpuMeshBackend::new());
    assert!(matches!(zero, Err(ref e) if e.is_contract_violation()));

    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    for bad in [
        region([0, 0, 0], [33, 1, 1]),
        region([-1, 0, 0], [4, 4, 4]),
        region([8, 8, 8], [4, 9, 9]),
    ] {
        let err = displayer.update(&bad).unwrap_err();
        assert!(err.is_contract_violation(), "{:?} gave {}", bad, err);
    }
    assert!(drawn(&displayer).is_empty());
    assert_eq!(displayer.totals().blocks_touched, 0);

    let err = displayer.store().get(BlockIndex::new(2, 0, 0)).unwrap_err();
    assert!(err.is_contract_violation());
}

#[test]
fn empty_region_is_a_noop() {
    let map = VoxelMap::new(Vector3::new(16, 16, 16));
    let mut displayer = Displayer::new(&map, 8, CubicMesher, CpuMeshBackend::new()).unwrap();
    let report = displayer.update(&region([4, 4, 4], [4, 8, 8])).unwrap();
    assert_eq!(report.blocks_touched, 0);
}

#[test]
fn last_block_is_truncated_to_the_volume() {
    let map = VoxelMap::new(Vector3::new(20, 5, 5));
    map.fill_region(&map.full_region(), STONE);
    let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
    displayer.update_all().unwrap();

    let meshes = drawn(&displayer);
    let last = &meshes[&BlockIndex::new(1, 0, 0)];
    let max_x = last
        .vertices
        .iter()
        .map(|v| v.position[0])
        .fold(f32::MIN, f32::max);
    assert_eq!(max_x, 4.0);
}

/// Backend counting live handles in shared cells so they can be read after the store is gone.
#[derive(Default, Clone)]
struct SharedCountingBackend {
    live: Rc<Cell<i64>>,
    released: Rc<RefCell<Vec<BlockIndex>>>,
}

impl MeshBackend for SharedCountingBackend {
    type Handle = BlockIndex;

    fn upload(
        &mut self,
        block: BlockIndex,
        _mesh: &MeshData,
        _translation: Vector3<f32>,
        _replacing: Option<&BlockIndex>,
    ) -> Result<BlockIndex, DisplayError> {
        self.live.set(self.live.get() + 1);
        Ok(block)
    }

    fn release(&mut self, handle: BlockIndex) {
        self.live.set(self.live.get() - 1);
        self.released.borrow_mut().push(handle);
    }

    fn set_memory_budget(&mut self, _budget: Option<u64>) {}
}

#[test]
fn dropping_the_displayer_releases_every_block() {
    let map = VoxelMap::terrain(Vector3::new(40, 24, 40), 5);
    let backend = SharedCountingBackend::default();
    let live = backend.live.clone();
    let released = backend.released.clone();

    {
        let mut displayer = Displayer::new(&map, 8, CubicMesher, backend).unwrap();
        displayer.update_all().unwrap();
        displayer.update_all().unwrap();
        assert_eq!(live.get(), displayer.store().live_blocks() as i64);
        assert!(live.get() > 0);
    }

    assert_eq!(live.get(), 0);
    assert!(!released.borrow().is_empty());
}
