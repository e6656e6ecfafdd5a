//! Movement profiles: the locomotion domain of a body.
//!
//! A profile answers one question: "may a body of this kind stand with its
//! feet in voxel `c`?"  Every voxel of the body box must be in `occupy`, and
//! when `support` is non-empty the voxel directly below the feet must be in
//! `support`.  Pathfinding only ever moves through voxels the profile admits,
//! and the path adapter re-checks the next voxel every tick to notice the
//! world changing under a standing path.

use glam::IVec3;

use crate::world::{MaterialMask, VoxelQuery};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveProfile {
    /// Body extent in voxels (x, y, z), each at least 1.
    pub size:      IVec3,
    /// Materials every body voxel may be in.
    pub occupy:    MaterialMask,
    /// Materials the voxel below the feet must be in.  Empty means the body
    /// needs no support (swimming, flying).
    pub support:   MaterialMask,
    /// How far (Chebyshev voxels) the body may drift from the expected path
    /// position before the path is considered lost.
    pub tolerance: i32,
}

impl MoveProfile {
    /// Walks on ground, may wade through shallow liquid.
    pub const fn walker() -> Self {
        Self {
            size:      IVec3::ONE,
            occupy:    MaterialMask::FLUID,
            support:   MaterialMask::GROUND,
            tolerance: 1,
        }
    }

    /// Moves freely inside liquid only.
    pub const fn swimmer() -> Self {
        Self {
            size:      IVec3::ONE,
            occupy:    MaterialMask::LIQUID,
            support:   MaterialMask::empty(),
            tolerance: 1,
        }
    }

    /// Moves freely through air only.
    pub const fn flyer() -> Self {
        Self {
            size:      IVec3::ONE,
            occupy:    MaterialMask::GAS,
            support:   MaterialMask::empty(),
            tolerance: 2,
        }
    }

    /// Head in air: used as the goal profile when surfacing.
    pub const fn breathing() -> Self {
        Self {
            size:      IVec3::ONE,
            occupy:    MaterialMask::GAS,
            support:   MaterialMask::empty(),
            tolerance: 1,
        }
    }

    /// The same body moving through any fluid without support.  Used to
    /// follow a surfacing path that starts in liquid and ends in air.
    pub const fn surfacing(self) -> Self {
        Self {
            occupy:  MaterialMask::FLUID,
            support: MaterialMask::empty(),
            ..self
        }
    }

    /// Same profile with a different body size.
    pub const fn with_size(mut self, size: IVec3) -> Self {
        self.size = size;
        self
    }

    /// `true` if a body with its feet in `cell` is admissible.
    pub fn is_valid(&self, world: &dyn VoxelQuery, cell: IVec3) -> bool {
        if !self.support.is_empty() && !self.support.admits(world.material(cell - IVec3::Y)) {
            return false;
        }
        let size = self.size.max(IVec3::ONE);
        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    if !self.occupy.admits(world.material(cell + IVec3::new(x, y, z))) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl Default for MoveProfile {
    fn default() -> Self {
        Self::walker()
    }
}
