//! Face-culled cube meshing.

use crate::engine_state::{
    error::MeshingError,
    voxels::{region::Region, volume::VoxelVolume},
};

use super::{face::Face, face::VoxelFace, MeshData, Mesher};

/// Emits one quad for every face of a solid voxel whose neighbour is empty.
///
/// Neighbours are read through the volume, so faces on a block edge are culled against the
/// adjacent block's voxels and the volume boundary counts as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubicMesher;

impl<V: VoxelVolume + ?Sized> Mesher<V> for CubicMesher {
    fn mesh(&self, volume: &V, bounds: &Region) -> Result<MeshData, MeshingError> {
        let mut mesh = MeshData::default();

        for point in bounds.points() {
            let voxel = volume.voxel(point);
            if !voxel.is_solid() {
                continue;
            }

            let local = point - bounds.min;
            for side in VoxelFace::all() {
                if volume.is_solid(point + side.offset()) {
                    continue;
                }
                mesh.push_face(&Face::new(local.x, local.y, local.z, side, voxel.color()));
            }
        }

        if mesh.vertices.len() > u32::MAX as usize {
            return Err(MeshingError::Failed(format!(
                "{} vertices exceed the 32-bit index range",
                mesh.vertices.len()
            )));
        }
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::engine_state::voxels::{
        volume::VoxelMap,
        voxel::{Material, Voxel},
    };

    #[test]
    fn test_lone_voxel_has_six_faces() {
        let map = VoxelMap::new(Vector3::new(4, 4, 4));
        map.set_voxel(Point3::new(1, 1, 1), Voxel::new(Material::STONE))
            .unwrap();

        let mesh = CubicMesher.mesh(&map, &map.full_region()).unwrap();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_shared_faces_are_culled() {
        let map = VoxelMap::new(Vector3::new(4, 4, 4));
        map.fill_region(
            &Region::new(Point3::new(0, 0, 0), Point3::new(2, 1, 1)),
            Voxel::new(Material::DIRT),
        );

        let mesh = CubicMesher.mesh(&map, &map.full_region()).unwrap();
        assert_eq!(mesh.indices.len(), 10 * 6);
    }

    #[test]
    fn test_block_edge_faces_see_neighbouring_block() {
        let map = VoxelMap::new(Vector3::new(8, 4, 4));
        map.fill_region(
            &Region::new(Point3::new(3, 0, 0), Point3::new(5, 1, 1)),
            Voxel::new(Material::STONE),
        );

        let left = Region::new(Point3::new(0, 0, 0), Point3::new(4, 4, 4));
        let mesh = CubicMesher.mesh(&map, &left).unwrap();
        // the +x face of (3,0,0) is hidden by (4,0,0) in the next block
        assert_eq!(mesh.indices.len(), 5 * 6);
    }

    #[test]
    fn test_positions_are_block_local() {
        let map = VoxelMap::new(Vector3::new(8, 8, 8));
        map.set_voxel(Point3::new(5, 6, 7), Voxel::new(Material::SAND))
            .unwrap();

        let bounds = Region::new(Point3::new(4, 4, 4), Point3::new(8, 8, 8));
        let mesh = CubicMesher.mesh(&map, &bounds).unwrap();
        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            assert!((1.0..=2.0).contains(&x));
            assert!((2.0..=3.0).contains(&y));
            assert!((3.0..=4.0).contains(&z));
            assert_eq!(vertex.color, Voxel::new(Material::SAND).color());
        }
    }

    #[test]
    fn test_empty_block_yields_empty_mesh() {
        let map = VoxelMap::new(Vector3::new(4, 4, 4));
        assert!(CubicMesher
            .mesh(&map, &map.full_region())
            .unwrap()
            .is_empty());
    }
}
