//! Read-only state passed to every task function.

use eco_core::Tick;
use eco_spatial::{Pathfinder, VoxelQuery};

use crate::{Snapshot, SpeciesTable};

/// Everything a task may read during one tick's intent phase.
///
/// Built once per tick by `eco-sim` and shared immutably across all agents.
/// The world must not be edited while a `TickContext` is alive.
pub struct TickContext<'a> {
    pub tick:       Tick,
    /// Seconds this tick represents.
    pub dt:         f32,
    pub species:    &'a SpeciesTable,
    pub snapshot:   &'a Snapshot,
    pub world:      &'a dyn VoxelQuery,
    pub pathfinder: &'a dyn Pathfinder,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(
        tick:       Tick,
        dt:         f32,
        species:    &'a SpeciesTable,
        snapshot:   &'a Snapshot,
        world:      &'a dyn VoxelQuery,
        pathfinder: &'a dyn Pathfinder,
    ) -> Self {
        Self { tick, dt, species, snapshot, world, pathfinder }
    }
}
