//! # Voxel Module
//!
//! The per-voxel payload stored in a volume: a compact material id, from which occupancy and
//! display colour are derived.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The underlying integer type used to store materials.
pub type MaterialSize = u8;

/// Colour per material, indexed by `Material as usize`. RGBA in linear space.
pub static MATERIAL_COLORS: [[f32; 4]; 7] = [
    [0.0, 0.0, 0.0, 0.0],    // EMPTY
    [0.50, 0.50, 0.52, 1.0], // STONE
    [0.45, 0.30, 0.18, 1.0], // DIRT
    [0.30, 0.62, 0.22, 1.0], // GRASS
    [0.86, 0.80, 0.55, 1.0], // SAND
    [0.95, 0.96, 0.98, 1.0], // SNOW
    [0.18, 0.38, 0.80, 1.0], // WATER
];

/// Enumerates the materials a voxel can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Material {
    /// No matter. The only non-solid material.
    EMPTY,
    /// Bare rock
    STONE,
    /// Soil below the surface
    DIRT,
    /// Surface soil
    GRASS,
    /// Beach and low ground
    SAND,
    /// High ground
    SNOW,
    /// Opaque water, rendered as a solid
    WATER,
}

impl Material {
    /// Converts a stored id back into a `Material`. Unknown ids map to `STONE` so that
    /// corrupted data still renders as something visible.
    pub fn from_id(id: MaterialSize) -> Self {
        Material::from_u8(id).unwrap_or(Material::STONE)
    }

    /// Picks a random solid material.
    pub fn random_solid() -> Self {
        Material::from_u8(fastrand::u8(1..MATERIAL_COLORS.len() as u8)).unwrap_or(Material::STONE)
    }
}

/// A single voxel.
///
/// `#[repr(C)]` and `Pod` so volumes can be copied around as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Voxel {
    /// The material, encoded as a `MaterialSize`
    pub material: MaterialSize,
}

impl Voxel {
    /// The empty voxel.
    pub const EMPTY: Voxel = Voxel { material: 0 };

    /// Creates a voxel of the given material.
    pub fn new(material: Material) -> Self {
        Voxel {
            material: material as MaterialSize,
        }
    }

    /// The voxel's material.
    pub fn material(&self) -> Material {
        Material::from_id(self.material)
    }

    /// Whether the voxel is occupied.
    pub fn is_solid(&self) -> bool {
        self.material != Material::EMPTY as MaterialSize
    }

    /// Display colour of the voxel.
    pub fn color(&self) -> [f32; 4] {
        MATERIAL_COLORS[self.material() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_follows_material() {
        assert!(!Voxel::EMPTY.is_solid());
        assert!(!Voxel::default().is_solid());
        assert!(Voxel::new(Material::GRASS).is_solid());
    }

    #[test]
    fn test_unknown_material_id_renders_as_stone() {
        let voxel = Voxel { material: 200 };
        assert_eq!(voxel.material(), Material::STONE);
        assert!(voxel.is_solid());
        assert_eq!(voxel.color(), MATERIAL_COLORS[Material::STONE as usize]);
    }

    #[test]
    fn test_random_solid_is_never_empty() {
        for _ in 0..64 {
            assert_ne!(Material::random_solid(), Material::EMPTY);
        }
    }
}
