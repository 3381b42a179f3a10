//! # Region Module
//!
//! Axis-aligned integer boxes in voxel space.
//!
//! A `Region` is half-open on every axis: `[min.x, max.x) x [min.y, max.y) x [min.z, max.z)`.
//! A region with `min == max` on any axis contains no voxels and means "nothing to update".

use cgmath::{Point3, Vector3};

/// Half-open axis-aligned box of voxel coordinates.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_map_displayer::Region;
///
/// let region = Region::new(Point3::new(0, 0, 0), Point3::new(16, 16, 16));
/// assert!(region.contains_point(Point3::new(15, 0, 3)));
/// assert!(!region.contains_point(Point3::new(16, 0, 3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Inclusive lower corner
    pub min: Point3<i32>,
    /// Exclusive upper corner
    pub max: Point3<i32>,
}

impl Region {
    /// Creates a region from its inclusive lower and exclusive upper corners.
    pub fn new(min: Point3<i32>, max: Point3<i32>) -> Self {
        Self { min, max }
    }

    /// Region covering `[0, extent)` on every axis.
    pub fn from_extent(extent: Vector3<i32>) -> Self {
        Self {
            min: Point3::new(0, 0, 0),
            max: Point3::new(extent.x, extent.y, extent.z),
        }
    }

    /// Region containing exactly one voxel.
    pub fn single(point: Point3<i32>) -> Self {
        Self {
            min: point,
            max: Point3::new(point.x + 1, point.y + 1, point.z + 1),
        }
    }

    /// True when any axis has `max < min`.
    pub fn is_inverted(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// True when the region contains no voxels.
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
    }

    /// Size of the region per axis, zero for empty axes.
    pub fn size(&self) -> Vector3<i32> {
        Vector3::new(
            (self.max.x - self.min.x).max(0),
            (self.max.y - self.min.y).max(0),
            (self.max.z - self.min.z).max(0),
        )
    }

    /// Number of voxels inside the region.
    pub fn volume(&self) -> u64 {
        let size = self.size();
        size.x as u64 * size.y as u64 * size.z as u64
    }

    /// True if `point` lies inside the region.
    pub fn contains_point(&self, point: Point3<i32>) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }

    /// True if every voxel of `other` lies inside `self`. Empty regions are contained everywhere.
    pub fn contains_region(&self, other: &Region) -> bool {
        if other.is_empty() {
            return true;
        }
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
            && other.min.z >= self.min.z
            && other.max.z <= self.max.z
    }

    /// Overlap of two regions. The result may be empty.
    pub fn intersection(&self, other: &Region) -> Region {
        let min = Point3::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
        );
        let max = Point3::new(
            self.max.x.min(other.max.x).max(min.x),
            self.max.y.min(other.max.y).max(min.y),
            self.max.z.min(other.max.z).max(min.z),
        );
        Region { min, max }
    }

    /// Region expanded by `margin` voxels on every side.
    ///
    /// Editing a voxel can expose or hide faces of its neighbours, so callers usually grow an
    /// edit region by one before handing it to `Displayer::update`. Coordinates saturate at
    /// the `i32` range.
    pub fn grown(&self, margin: i32) -> Region {
        Region {
            min: self.min.map(|c| c.saturating_sub(margin)),
            max: self.max.map(|c| c.saturating_add(margin)),
        }
    }

    /// Iterates over every voxel coordinate, x fastest then y then z.
    pub fn points(&self) -> impl Iterator<Item = Point3<i32>> {
        let Region { min, max } = *self;
        (min.z..max.z)
            .flat_map(move |z| (min.y..max.y).map(move |y| (y, z)))
            .flat_map(move |(y, z)| (min.x..max.x).map(move |x| Point3::new(x, y, z)))
    }
}
