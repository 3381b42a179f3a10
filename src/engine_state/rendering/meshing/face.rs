//! # Face Module
//!
//! Quad faces of a single voxel and the six directions they can point in.

use cgmath::{Point3, Vector3};

use crate::engine_state::rendering::vertex::Vertex;

/// Indices of the two triangles making up a face, relative to its first vertex.
///
/// Vertices are emitted as `[ll, lr, ul, ur]`; both triangles wind counter-clockwise when
/// seen from outside the voxel.
pub const FACE_INDICES: [u32; 6] = [0, 1, 3, 0, 3, 2];

/// The six faces of a voxel.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum VoxelFace {
    /// Facing negative X
    FRONT = 0,
    /// Facing positive X
    BACK = 1,
    /// Facing negative Y
    BOTTOM = 2,
    /// Facing positive Y
    TOP = 3,
    /// Facing negative Z
    LEFT = 4,
    /// Facing positive Z
    RIGHT = 5,
}

impl VoxelFace {
    /// All six faces in a consistent order.
    pub fn all() -> [VoxelFace; 6] {
        [
            VoxelFace::FRONT,
            VoxelFace::BACK,
            VoxelFace::BOTTOM,
            VoxelFace::TOP,
            VoxelFace::LEFT,
            VoxelFace::RIGHT,
        ]
    }

    /// Offset from a voxel to the neighbour this face looks at.
    pub fn offset(&self) -> Vector3<i32> {
        match self {
            VoxelFace::FRONT => Vector3::new(-1, 0, 0),
            VoxelFace::BACK => Vector3::new(1, 0, 0),
            VoxelFace::BOTTOM => Vector3::new(0, -1, 0),
            VoxelFace::TOP => Vector3::new(0, 1, 0),
            VoxelFace::LEFT => Vector3::new(0, 0, -1),
            VoxelFace::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// Outward unit normal.
    pub fn normal(&self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }
}

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right, upper-left)
/// in block-local coordinates, plus the direction it faces and its colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner
    pub ll: Point3<i32>,
    /// Lower-right corner
    pub lr: Point3<i32>,
    /// Upper-left corner
    pub ul: Point3<i32>,
    /// Upper-right corner
    pub ur: Point3<i32>,
    /// Which side of the voxel this face represents
    pub side: VoxelFace,
    /// RGBA colour of the voxel
    pub color: [f32; 4],
}

impl Face {
    /// Creates the face on `side` of the voxel whose minimum corner is `(i, j, k)`.
    pub fn new(i: i32, j: i32, k: i32, side: VoxelFace, color: [f32; 4]) -> Self {
        let (ll, lr, ul, ur) = match side {
            VoxelFace::FRONT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
            ),
            VoxelFace::BACK => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
            VoxelFace::BOTTOM => (
                Point3::new(i, j, k + 1),
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
            ),
            VoxelFace::TOP => (
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ),
            VoxelFace::LEFT => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            VoxelFace::RIGHT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            side,
            color,
        }
    }

    /// The four corners as vertices, in `[ll, lr, ul, ur]` order.
    pub fn vertices(&self) -> [Vertex; 4] {
        let normal = self.side.normal();
        let corner = |p: Point3<i32>| Vertex::new([p.x as f32, p.y as f32, p.z as f32], normal, self.color);
        [
            corner(self.ll),
            corner(self.lr),
            corner(self.ul),
            corner(self.ur),
        ]
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    fn as_vector(p: [f32; 3]) -> Vector3<f32> {
        Vector3::new(p[0], p[1], p[2])
    }

    #[test]
    fn test_triangles_wind_towards_normal() {
        for side in VoxelFace::all() {
            let vertices = Face::new(2, 3, 4, side, [1.0; 4]).vertices();
            let normal = as_vector(side.normal());
            for triangle in FACE_INDICES.chunks(3) {
                let a = as_vector(vertices[triangle[0] as usize].position);
                let b = as_vector(vertices[triangle[1] as usize].position);
                let c = as_vector(vertices[triangle[2] as usize].position);
                let winding = (b - a).cross(c - a).normalize();
                assert_eq!(winding, normal, "{:?}", side);
            }
        }
    }

    #[test]
    fn test_face_lies_on_voxel_boundary() {
        let face = Face::new(0, 0, 0, VoxelFace::TOP, [1.0; 4]);
        for corner in [face.ll, face.lr, face.ul, face.ur] {
            assert_eq!(corner.y, 1);
        }
        let face = Face::new(0, 0, 0, VoxelFace::FRONT, [1.0; 4]);
        for corner in [face.ll, face.lr, face.ul, face.ur] {
            assert_eq!(corner.x, 0);
        }
    }
}
