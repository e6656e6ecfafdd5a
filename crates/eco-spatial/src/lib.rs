//! `eco-spatial` — voxel world, movement profiles, pathfinding, and the
//! neighbour index.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`world`]      | `Material`, `MaterialMask`, `VoxelQuery` trait, `VoxelGrid`, `WorldEdit` |
//! | [`profile`]    | `MoveProfile` — which voxels a body may occupy / stand on  |
//! | [`pathfinder`] | `Pathfinder` trait, `PathPlan`, `GridPathfinder` (bounded A*) |
//! | [`neighbors`]  | `NeighborIndex` (R-tree over agent positions)              |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                         |
//!
//! The behaviour core only ever talks to the world and the pathfinder through
//! the `VoxelQuery` and `Pathfinder` traits, so hosts plug in their own chunk
//! storage and search without touching the state machine.

pub mod error;
pub mod neighbors;
pub mod pathfinder;
pub mod profile;
pub mod world;


pub use error::{SpatialError, SpatialResult};
pub use neighbors::NeighborIndex;
pub use pathfinder::{GridPathfinder, PathPlan, Pathfinder};
pub use profile::MoveProfile;
pub use world::{Material, MaterialMask, VoxelGrid, VoxelQuery, WorldEdit};
