//! # Volume Module
//!
//! The read interface the displayer consumes (`VoxelVolume`) and a dense, editable
//! implementation of it (`VoxelMap`).
//!
//! ## Memory Layout
//!
//! `VoxelMap` keeps two parallel arrays in x-fastest, then y, then z order:
//! - `solid_array`: one bit per voxel for O(1) occupancy checks, which is what meshing asks
//!   for most often
//! - `materials`: one byte per voxel
//!
//! ## Thread Safety
//!
//! Both arrays sit behind a single `RwLock`, so the owning application can edit the map
//! through a shared reference while a `Displayer` holds another shared reference to it.
//! Edits must not run concurrently with a `Displayer::update` covering the same voxels.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bitvec::prelude::BitVec;
use cgmath::{Point3, Vector3};
use noise::{NoiseFn, Perlin};

use super::{
    region::Region,
    voxel::{Material, MaterialSize, Voxel},
};
use crate::engine_state::error::DisplayError;

/// Read access to a voxel volume anchored at the origin.
///
/// The displayer never mutates a volume; it only asks for its extent at construction and
/// for voxels while regenerating blocks.
pub trait VoxelVolume {
    /// Size of the volume per axis. Valid coordinates are `[0, extent)`.
    fn extent(&self) -> Vector3<i32>;

    /// The voxel at `point`. Coordinates outside the volume read as empty.
    fn voxel(&self, point: Point3<i32>) -> Voxel;

    /// Whether the voxel at `point` is occupied.
    fn is_solid(&self, point: Point3<i32>) -> bool {
        self.voxel(point).is_solid()
    }

    /// Region covering the whole volume.
    fn full_region(&self) -> Region {
        Region::from_extent(self.extent())
    }
}

/// Threshold above which cave noise carves a voxel out of the terrain.
pub const CAVE_THRESHOLD: f64 = 0.55;
/// Scaling factor applied to world coordinates when sampling the height noise.
pub const HEIGHT_SCALE_FACTOR: f64 = 0.025;
/// Scaling factor applied to world coordinates when sampling the cave noise.
pub const CAVE_SCALE_FACTOR: f64 = 0.06;
/// Depth of the dirt layer below the surface voxel.
const DIRT_DEPTH: i32 = 3;

struct VoxelMapData {
    solid_array: BitVec,
    materials: Vec<MaterialSize>,
}

/// Dense voxel volume.
///
/// # Examples
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use voxel_map_displayer::{Material, Voxel, VoxelMap, VoxelVolume};
///
/// let map = VoxelMap::new(Vector3::new(32, 16, 16));
/// map.set_voxel(Point3::new(3, 4, 5), Voxel::new(Material::STONE)).unwrap();
/// assert!(map.is_solid(Point3::new(3, 4, 5)));
/// assert!(!map.is_solid(Point3::new(99, 4, 5)));
/// ```
pub struct VoxelMap {
    extent: Vector3<i32>,
    data: RwLock<VoxelMapData>,
}

impl VoxelMap {
    /// Creates an all-empty map. Negative extents are treated as zero.
    pub fn new(extent: Vector3<i32>) -> Self {
        let extent = Vector3::new(extent.x.max(0), extent.y.max(0), extent.z.max(0));
        let len = extent.x as usize * extent.y as usize * extent.z as usize;

        let mut solid_array = BitVec::with_capacity(len);
        solid_array.resize(len, false);

        Self {
            extent,
            data: RwLock::new(VoxelMapData {
                solid_array,
                materials: vec![Material::EMPTY as MaterialSize; len],
            }),
        }
    }

    /// Generates rolling terrain with caves using Perlin noise.
    ///
    /// The surface height comes from 2D noise over x/z; below it the column is filled with a
    /// surface material, a few voxels of dirt and stone. 3D noise carves caves. Columns whose
    /// surface sits under the sea level are topped up with water. A map with a zero axis is
    /// returned empty.
    pub fn terrain(extent: Vector3<i32>, seed: u32) -> Self {
        let map = Self::new(extent);
        if map.full_region().is_empty() {
            return map;
        }
        let height_noise = Perlin::new(seed);
        let cave_noise = Perlin::new(seed.wrapping_add(1));

        let extent = map.extent;
        let base_height = extent.y as f64 * 0.45;
        let amplitude = extent.y as f64 * 0.3;
        let sea_level = (extent.y as f64 * 0.3) as i32;
        let snow_line = (extent.y as f64 * 0.7) as i32;

        {
            let mut data = map.write();
            for z in 0..extent.z {
                for x in 0..extent.x {
                    let sample = height_noise.get([
                        x as f64 * HEIGHT_SCALE_FACTOR,
                        z as f64 * HEIGHT_SCALE_FACTOR,
                    ]);
                    let height = ((base_height + amplitude * sample) as i32).clamp(1, extent.y);
                    let surface = height - 1;

                    for y in 0..extent.y {
                        let point = Point3::new(x, y, z);
                        let material = if y > surface {
                            if y < sea_level {
                                Material::WATER
                            } else {
                                Material::EMPTY
                            }
                        } else {
                            let cave = cave_noise.get([
                                x as f64 * CAVE_SCALE_FACTOR,
                                y as f64 * CAVE_SCALE_FACTOR,
                                z as f64 * CAVE_SCALE_FACTOR,
                            ]);
                            if y > 0 && cave > CAVE_THRESHOLD {
                                Material::EMPTY
                            } else if y == surface {
                                if surface >= snow_line {
                                    Material::SNOW
                                } else if surface <= sea_level {
                                    Material::SAND
                                } else {
                                    Material::GRASS
                                }
                            } else if y > surface - DIRT_DEPTH {
                                Material::DIRT
                            } else {
                                Material::STONE
                            }
                        };

                        if let Some(index) = map.index_of(point) {
                            Self::store(&mut data, index, Voxel::new(material));
                        }
                    }
                }
            }
        }

        map
    }

    /// Flat index of `point`, or `None` when it lies outside the map.
    fn index_of(&self, point: Point3<i32>) -> Option<usize> {
        if point.x < 0
            || point.y < 0
            || point.z < 0
            || point.x >= self.extent.x
            || point.y >= self.extent.y
            || point.z >= self.extent.z
        {
            return None;
        }
        Some(
            point.x as usize
                + self.extent.x as usize * point.y as usize
                + self.extent.x as usize * self.extent.y as usize * point.z as usize,
        )
    }

    fn read(&self) -> RwLockReadGuard<'_, VoxelMapData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VoxelMapData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(data: &mut VoxelMapData, index: usize, voxel: Voxel) {
        data.solid_array.set(index, voxel.is_solid());
        data.materials[index] = voxel.material;
    }

    /// Writes one voxel and returns the region that changed.
    ///
    /// # Errors
    /// `ContractViolation` when `point` lies outside the map.
    pub fn set_voxel(&self, point: Point3<i32>, voxel: Voxel) -> Result<Region, DisplayError> {
        let index = self.index_of(point).ok_or_else(|| {
            DisplayError::contract(format!(
                "voxel {:?} outside volume extent {:?}",
                point, self.extent
            ))
        })?;
        Self::store(&mut self.write(), index, voxel);
        Ok(Region::single(point))
    }

    /// Fills `region` (clipped to the map) with `voxel` and returns the clipped region.
    pub fn fill_region(&self, region: &Region, voxel: Voxel) -> Region {
        let clipped = self.full_region().intersection(region);
        let mut data = self.write();
        for point in clipped.points() {
            if let Some(index) = self.index_of(point) {
                Self::store(&mut data, index, voxel);
            }
        }
        clipped
    }

    /// Fills every voxel whose centre lies within `radius` of `center` and returns the
    /// bounding region of the sphere, clipped to the map.
    pub fn fill_sphere(&self, center: Point3<i32>, radius: i32, voxel: Voxel) -> Region {
        let radius = radius.max(0);
        let bounds = Region::single(center).grown(radius);
        let clipped = self.full_region().intersection(&bounds);
        let radius_squared = i64::from(radius) * i64::from(radius);

        let mut data = self.write();
        for point in clipped.points() {
            let axis = |p: i32, c: i32| (i64::from(p) - i64::from(c)).pow(2);
            let distance_squared =
                axis(point.x, center.x) + axis(point.y, center.y) + axis(point.z, center.z);
            if distance_squared > radius_squared {
                continue;
            }
            if let Some(index) = self.index_of(point) {
                Self::store(&mut data, index, voxel);
            }
        }
        clipped
    }

    /// Number of occupied voxels.
    pub fn solid_count(&self) -> usize {
        self.read().solid_array.count_ones()
    }
}

impl VoxelVolume for VoxelMap {
    fn extent(&self) -> Vector3<i32> {
        self.extent
    }

    fn voxel(&self, point: Point3<i32>) -> Voxel {
        match self.index_of(point) {
            Some(index) => Voxel {
                material: self.read().materials[index],
            },
            None => Voxel::EMPTY,
        }
    }

    fn is_solid(&self, point: Point3<i32>) -> bool {
        match self.index_of(point) {
            Some(index) => self.read().solid_array[index],
            None => false,
        }
    }
}
