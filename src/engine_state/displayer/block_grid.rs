//! # Block Grid
//!
//! Pure coordinate math mapping voxel coordinates and regions onto a grid of fixed-size
//! blocks.
//!
//! The grid covers `[0, extent)` on every axis with `ceil(extent / buffer_size)` blocks per
//! axis. The last block on an axis is truncated to the volume, never padded. Every lookup
//! that falls outside the volume or the grid is a `ContractViolation`.

use cgmath::{Point3, Vector3};

use crate::engine_state::{error::DisplayError, voxels::region::Region};

/// Position of a block in the block grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex {
    /// Block column along x
    pub x: u32,
    /// Block row along y
    pub y: u32,
    /// Block layer along z
    pub z: u32,
}

impl BlockIndex {
    /// Creates a block index.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl From<[u32; 3]> for BlockIndex {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// A box of block indices, `[min, max)` per axis. Iteration visits x fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    min: BlockIndex,
    max: BlockIndex,
}

impl BlockRange {
    /// The range containing no blocks.
    pub const EMPTY: BlockRange = BlockRange {
        min: BlockIndex::new(0, 0, 0),
        max: BlockIndex::new(0, 0, 0),
    };

    /// Number of blocks in the range.
    pub fn len(&self) -> usize {
        (self.max.x.saturating_sub(self.min.x) as usize)
            * (self.max.y.saturating_sub(self.min.y) as usize)
            * (self.max.z.saturating_sub(self.min.z) as usize)
    }

    /// True when the range holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `block` lies inside the range.
    pub fn contains(&self, block: &BlockIndex) -> bool {
        block.x >= self.min.x
            && block.x < self.max.x
            && block.y >= self.min.y
            && block.y < self.max.y
            && block.z >= self.min.z
            && block.z < self.max.z
    }

    /// Iterates over the blocks in the range.
    pub fn iter(&self) -> impl Iterator<Item = BlockIndex> {
        let BlockRange { min, max } = *self;
        (min.z..max.z)
            .flat_map(move |z| (min.y..max.y).map(move |y| (y, z)))
            .flat_map(move |(y, z)| (min.x..max.x).map(move |x| BlockIndex::new(x, y, z)))
    }
}

/// Block grid laid over a volume.
///
/// # Examples
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use voxel_map_displayer::{BlockGrid, BlockIndex, Region};
///
/// let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
/// assert_eq!(grid.dims(), Vector3::new(2, 1, 1));
///
/// let touched = grid
///     .blocks_touching(&Region::new(Point3::new(15, 0, 0), Point3::new(17, 16, 16)))
///     .unwrap();
/// let touched: Vec<_> = touched.iter().collect();
/// assert_eq!(touched, vec![BlockIndex::new(0, 0, 0), BlockIndex::new(1, 0, 0)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    buffer_size: u32,
    extent: Vector3<i32>,
    dims: Vector3<u32>,
}

impl BlockGrid {
    /// Lays a grid of `buffer_size`-wide blocks over a volume of the given extent.
    ///
    /// # Errors
    /// `ContractViolation` for a zero block size or a negative extent.
    pub fn new(extent: Vector3<i32>, buffer_size: u32) -> Result<Self, DisplayError> {
        if buffer_size == 0 || buffer_size > i32::MAX as u32 {
            return Err(DisplayError::contract(format!(
                "block size {} must be in 1..={}",
                buffer_size,
                i32::MAX
            )));
        }
        if extent.x < 0 || extent.y < 0 || extent.z < 0 {
            return Err(DisplayError::contract(format!(
                "volume extent {:?} has a negative axis",
                extent
            )));
        }

        let blocks_along = |size: i32| (size as u32).div_ceil(buffer_size);
        Ok(Self {
            buffer_size,
            extent,
            dims: Vector3::new(
                blocks_along(extent.x),
                blocks_along(extent.y),
                blocks_along(extent.z),
            ),
        })
    }

    /// Edge length of a block in voxels.
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// Extent of the volume the grid covers.
    pub fn extent(&self) -> Vector3<i32> {
        self.extent
    }

    /// Number of blocks per axis.
    pub fn dims(&self) -> Vector3<u32> {
        self.dims
    }

    /// Total number of blocks in the grid.
    pub fn block_count(&self) -> usize {
        self.dims.x as usize * self.dims.y as usize * self.dims.z as usize
    }

    /// Region covering the whole volume.
    pub fn volume_region(&self) -> Region {
        Region::from_extent(self.extent)
    }

    /// True if `block` is a valid index in this grid.
    pub fn contains_block(&self, block: &BlockIndex) -> bool {
        block.x < self.dims.x && block.y < self.dims.y && block.z < self.dims.z
    }

    /// Checks that `region` is well formed and lies inside the volume.
    ///
    /// Empty regions are accepted wherever they sit.
    pub fn validate_region(&self, region: &Region) -> Result<(), DisplayError> {
        if region.is_inverted() {
            return Err(DisplayError::contract(format!(
                "region {:?}..{:?} is inverted",
                region.min, region.max
            )));
        }
        if !self.volume_region().contains_region(region) {
            return Err(DisplayError::contract(format!(
                "region {:?}..{:?} exceeds volume extent {:?}",
                region.min, region.max, self.extent
            )));
        }
        Ok(())
    }

    /// Block containing the voxel at `point`.
    pub fn block_of(&self, point: Point3<i32>) -> Result<BlockIndex, DisplayError> {
        if !self.volume_region().contains_point(point) {
            return Err(DisplayError::contract(format!(
                "voxel {:?} outside volume extent {:?}",
                point, self.extent
            )));
        }
        let size = self.buffer_size;
        Ok(BlockIndex::new(
            point.x as u32 / size,
            point.y as u32 / size,
            point.z as u32 / size,
        ))
    }

    /// Blocks whose bounds intersect `region`.
    ///
    /// This is `block_of(region.min)` through `block_of(region.max - 1)` per axis, so a
    /// region ending exactly on a block edge does not pull in the next block.
    pub fn blocks_touching(&self, region: &Region) -> Result<BlockRange, DisplayError> {
        self.validate_region(region)?;
        if region.is_empty() {
            return Ok(BlockRange::EMPTY);
        }

        let first = self.block_of(region.min)?;
        let last = self.block_of(Point3::new(
            region.max.x - 1,
            region.max.y - 1,
            region.max.z - 1,
        ))?;
        Ok(BlockRange {
            min: first,
            max: BlockIndex::new(last.x + 1, last.y + 1, last.z + 1),
        })
    }

    /// Voxel-space bounds of `block`, truncated to the volume on the last block of each axis.
    pub fn bounds_of(&self, block: BlockIndex) -> Result<Region, DisplayError> {
        self.check_block(&block)?;
        let size = self.buffer_size as i64;
        let axis = |b: u32, extent: i32| {
            let start = b as i64 * size;
            let end = (start + size).min(extent as i64);
            (start as i32, end as i32)
        };

        let (min_x, max_x) = axis(block.x, self.extent.x);
        let (min_y, max_y) = axis(block.y, self.extent.y);
        let (min_z, max_z) = axis(block.z, self.extent.z);
        Ok(Region::new(
            Point3::new(min_x, min_y, min_z),
            Point3::new(max_x, max_y, max_z),
        ))
    }

    /// World-space offset of the block's local origin, `block * buffer_size`.
    pub fn translation_of(&self, block: BlockIndex) -> Vector3<f32> {
        let size = self.buffer_size as f32;
        Vector3::new(
            block.x as f32 * size,
            block.y as f32 * size,
            block.z as f32 * size,
        )
    }

    /// Slot number of `block` in a flat array of all blocks, x fastest.
    pub fn flatten(&self, block: BlockIndex) -> Result<usize, DisplayError> {
        self.check_block(&block)?;
        Ok(block.x as usize
            + self.dims.x as usize * (block.y as usize + self.dims.y as usize * block.z as usize))
    }

    /// Inverse of `flatten`.
    pub fn unflatten(&self, slot: usize) -> Option<BlockIndex> {
        if slot >= self.block_count() {
            return None;
        }
        let dim_x = self.dims.x as usize;
        let dim_y = self.dims.y as usize;
        Some(BlockIndex::new(
            (slot % dim_x) as u32,
            ((slot / dim_x) % dim_y) as u32,
            (slot / (dim_x * dim_y)) as u32,
        ))
    }

    fn check_block(&self, block: &BlockIndex) -> Result<(), DisplayError> {
        if self.contains_block(block) {
            Ok(())
        } else {
            Err(DisplayError::contract(format!(
                "block {:?} outside grid of {:?} blocks",
                block, self.dims
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(min: [i32; 3], max: [i32; 3]) -> Region {
        Region::new(min.into(), max.into())
    }

    fn touched(grid: &BlockGrid, r: Region) -> Vec<BlockIndex> {
        grid.blocks_touching(&r).unwrap().iter().collect()
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
        assert_eq!(grid.dims(), Vector3::new(2, 1, 1));
        assert_eq!(grid.block_count(), 2);

        let grid = BlockGrid::new(Vector3::new(33, 1, 17), 16).unwrap();
        assert_eq!(grid.dims(), Vector3::new(3, 1, 2));
    }

    #[test]
    fn test_zero_block_size_is_rejected() {
        let err = BlockGrid::new(Vector3::new(8, 8, 8), 0).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_two_block_scenario() {
        let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
        assert_eq!(
            touched(&grid, region([0, 0, 0], [16, 16, 16])),
            vec![BlockIndex::new(0, 0, 0)]
        );
        assert_eq!(
            touched(&grid, region([15, 0, 0], [17, 16, 16])),
            vec![BlockIndex::new(0, 0, 0), BlockIndex::new(1, 0, 0)]
        );
    }

    #[test]
    fn test_one_voxel_region_on_block_edge_touches_one_block() {
        let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
        assert_eq!(
            touched(&grid, region([16, 0, 0], [17, 16, 16])),
            vec![BlockIndex::new(1, 0, 0)]
        );
        assert_eq!(
            touched(&grid, region([15, 3, 3], [16, 4, 4])),
            vec![BlockIndex::new(0, 0, 0)]
        );
    }

    #[test]
    fn test_empty_region_touches_nothing() {
        let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
        assert!(grid
            .blocks_touching(&region([4, 4, 4], [4, 9, 9]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_out_of_volume_inputs_are_contract_violations() {
        let grid = BlockGrid::new(Vector3::new(32, 16, 16), 16).unwrap();
        assert!(grid.block_of(Point3::new(32, 0, 0)).is_err());
        assert!(grid.block_of(Point3::new(-1, 0, 0)).is_err());
        assert!(grid.blocks_touching(&region([0, 0, 0], [33, 1, 1])).is_err());
        assert!(grid.blocks_touching(&region([5, 0, 0], [2, 1, 1])).is_err());
        assert!(grid.bounds_of(BlockIndex::new(2, 0, 0)).is_err());
        assert!(grid.flatten(BlockIndex::new(0, 1, 0)).is_err());
    }

    #[test]
    fn test_last_block_is_truncated() {
        let grid = BlockGrid::new(Vector3::new(40, 16, 5), 16).unwrap();
        assert_eq!(
            grid.bounds_of(BlockIndex::new(2, 0, 0)).unwrap(),
            region([32, 0, 0], [40, 16, 5])
        );
        assert_eq!(
            grid.bounds_of(BlockIndex::new(1, 0, 0)).unwrap(),
            region([16, 0, 0], [32, 16, 5])
        );
    }

    #[test]
    fn test_every_voxel_maps_back_to_its_block() {
        let grid = BlockGrid::new(Vector3::new(20, 9, 7), 4).unwrap();
        for slot in 0..grid.block_count() {
            let block = grid.unflatten(slot).unwrap();
            assert_eq!(grid.flatten(block).unwrap(), slot);
            for point in grid.bounds_of(block).unwrap().points() {
                assert_eq!(grid.block_of(point).unwrap(), block);
            }
        }
        assert_eq!(grid.unflatten(grid.block_count()), None);
    }

    #[test]
    fn test_touching_is_monotonic_in_region() {
        let grid = BlockGrid::new(Vector3::new(24, 24, 24), 5).unwrap();
        let outer = region([2, 3, 4], [19, 12, 21]);
        let outer_blocks = grid.blocks_touching(&outer).unwrap();
        let inner_regions = [
            region([2, 3, 4], [3, 4, 5]),
            region([10, 5, 6], [19, 12, 21]),
            region([4, 4, 4], [15, 11, 20]),
            region([18, 11, 20], [19, 12, 21]),
        ];
        for inner in inner_regions {
            assert!(outer.contains_region(&inner));
            for block in grid.blocks_touching(&inner).unwrap().iter() {
                assert!(outer_blocks.contains(&block), "{:?} missing", block);
            }
        }
    }

    #[test]
    fn test_translation_is_block_times_size() {
        let grid = BlockGrid::new(Vector3::new(64, 64, 64), 16).unwrap();
        assert_eq!(
            grid.translation_of(BlockIndex::new(1, 2, 3)),
            Vector3::new(16.0, 32.0, 48.0)
        );
    }
}
