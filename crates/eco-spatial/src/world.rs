//! Voxel world access.
//!
//! The engine never owns terrain.  It reads the world through the
//! [`VoxelQuery`] trait for exactly one tick batch, during which the host
//! must not mutate it.  Changes the engine wants to make (grazing consumes
//! foliage) are returned as [`WorldEdit`] records and applied by the host
//! after the batch.

use bitflags::bitflags;
use glam::IVec3;

use eco_core::{CoreError, chebyshev};

use crate::SpatialResult;

// ── Material ──────────────────────────────────────────────────────────────────

/// Coarse material class of one voxel.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Material {
    /// Air.
    #[default]
    Gas,
    /// Water or any other swimmable fluid.
    Liquid,
    /// Rock, soil, anything impassable.
    Solid,
    /// Grazeable ground cover.  Impassable like `Solid`, but edible.
    Foliage,
}

impl Material {
    /// The single-bit mask for this material.
    #[inline]
    pub fn mask(self) -> MaterialMask {
        match self {
            Material::Gas     => MaterialMask::GAS,
            Material::Liquid  => MaterialMask::LIQUID,
            Material::Solid   => MaterialMask::SOLID,
            Material::Foliage => MaterialMask::FOLIAGE,
        }
    }
}

bitflags! {
    /// A set of [`Material`]s.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct MaterialMask: u8 {
        const GAS     = 1 << 0;
        const LIQUID  = 1 << 1;
        const SOLID   = 1 << 2;
        const FOLIAGE = 1 << 3;

        /// Anything a body can't pass through.
        const GROUND = Self::SOLID.bits() | Self::FOLIAGE.bits();
        /// Anything a body can pass through.
        const FLUID  = Self::GAS.bits() | Self::LIQUID.bits();
    }
}

impl MaterialMask {
    #[inline]
    pub fn admits(self, material: Material) -> bool {
        self.contains(material.mask())
    }
}

// ── VoxelQuery ────────────────────────────────────────────────────────────────

/// Read-only access to the voxel world.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: the intent phase may query the
/// world from many worker threads at once.
pub trait VoxelQuery: Send + Sync {
    /// Material of voxel `cell`.
    fn material(&self, cell: IVec3) -> Material;

    /// Nearest voxel within `radius` (Chebyshev) of `center` whose material
    /// is in `mask`.
    ///
    /// Searches shell by shell outward so the first hit is at the smallest
    /// lattice distance; inside a shell, the smallest Euclidean distance
    /// wins and the first voxel in scan order breaks exact ties.
    fn find_nearest(&self, center: IVec3, radius: i32, mask: MaterialMask) -> Option<IVec3> {
        if mask.admits(self.material(center)) {
            return Some(center);
        }
        for r in 1..=radius.max(0) {
            let mut best: Option<(i32, IVec3)> = None;
            for x in -r..=r {
                for y in -r..=r {
                    for z in -r..=r {
                        let offset = IVec3::new(x, y, z);
                        if chebyshev(offset, IVec3::ZERO) != r {
                            continue;
                        }
                        let cell = center + offset;
                        if !mask.admits(self.material(cell)) {
                            continue;
                        }
                        let d2 = offset.length_squared();
                        if best.is_none_or(|(bd, _)| d2 < bd) {
                            best = Some((d2, cell));
                        }
                    }
                }
            }
            if let Some((_, cell)) = best {
                return Some(cell);
            }
        }
        None
    }
}

// ── WorldEdit ─────────────────────────────────────────────────────────────────

/// A change the engine asks the host to make to the world after a batch.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldEdit {
    /// Foliage at `cell` was eaten; the host usually turns it into bare ground.
    Consume { cell: IVec3 },
}

// ── VoxelGrid ─────────────────────────────────────────────────────────────────

/// Dense, bounded voxel storage.
///
/// Voxels outside the grid read as `outside` (typically `Solid` for a sealed
/// arena or `Gas` for open sky).  Good enough for demos and tests; production
/// hosts implement [`VoxelQuery`] over their own chunk store.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    min:     IVec3,
    size:    IVec3,
    cells:   Vec<Material>,
    outside: Material,
}

impl VoxelGrid {
    /// A grid covering `min .. min + size`, filled with `fill`.
    pub fn new(min: IVec3, size: IVec3, fill: Material, outside: Material) -> SpatialResult<Self> {
        if size.min_element() <= 0 {
            return Err(CoreError::Config(format!("voxel grid size must be positive, got {size}")).into());
        }
        let count = (size.x as usize) * (size.y as usize) * (size.z as usize);
        Ok(Self { min, size, cells: vec![fill; count], outside })
    }

    pub fn min(&self) -> IVec3 {
        self.min
    }

    /// Exclusive upper corner.
    pub fn max(&self) -> IVec3 {
        self.min + self.size
    }

    #[inline]
    fn slot(&self, cell: IVec3) -> Option<usize> {
        let local = cell - self.min;
        if local.min_element() < 0 || (local - self.size).max_element() >= 0 {
            return None;
        }
        Some(((local.x * self.size.y + local.y) * self.size.z + local.z) as usize)
    }

    /// Overwrite one voxel.  Writes outside the grid are ignored.
    pub fn set(&mut self, cell: IVec3, material: Material) {
        if let Some(i) = self.slot(cell) {
            self.cells[i] = material;
        }
    }

    /// Fill the inclusive box `a ..= b` (corners in any order).
    pub fn fill_box(&mut self, a: IVec3, b: IVec3, material: Material) {
        let lo = a.min(b);
        let hi = a.max(b);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    self.set(IVec3::new(x, y, z), material);
                }
            }
        }
    }

    /// Apply an edit produced by the engine.
    pub fn apply(&mut self, edit: WorldEdit) {
        match edit {
            WorldEdit::Consume { cell } => {
                if self.material(cell) == Material::Foliage {
                    self.set(cell, Material::Solid);
                }
            }
        }
    }
}

impl VoxelQuery for VoxelGrid {
    fn material(&self, cell: IVec3) -> Material {
        match self.slot(cell) {
            Some(i) => self.cells[i],
            None    => self.outside,
        }
    }
}
