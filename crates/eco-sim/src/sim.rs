//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use glam::IVec3;
use rustc_hash::FxHashSet;
use tracing::{info, trace};

use eco_agent::{AgentRngs, AgentStore, Task};
use eco_behavior::{Effect, Snapshot, SpeciesTable, TickContext, tick_agent};
use eco_core::{AgentId, SimClock, SimConfig, Tick};
use eco_spatial::{Pathfinder, VoxelQuery, WorldEdit};

use crate::{SimObserver, TickStats};

// ── Per-agent output of the intent phase ──────────────────────────────────────

/// What one agent's tick produced.  Collected in ascending id order so the
/// apply phase sees the same sequence whether or not the intent phase ran
/// in parallel.
struct Ticked {
    id:      AgentId,
    before:  Task,
    after:   Task,
    effects: Vec<Effect>,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<W, P>` holds all simulation state and drives the two-phase tick:
///
/// 1. **Intent phase** (optionally parallel with the `parallel` feature):
///    capture a [`Snapshot`] of every agent, then run
///    [`eco_behavior::tick_agent`] once per agent.  Each call mutates only
///    its own agent and records cross-agent changes as [`Effect`]s.
/// 2. **Apply phase** (sequential, ascending `AgentId` for determinism):
///    every effect is re-checked against live state and applied or dropped.
///
/// Movement is the host's business: after a tick, read each agent's
/// `intent`, integrate it, then report the new pose and surrounding medium
/// back through the host API before the next tick.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: VoxelQuery, P: Pathfinder> {
    /// Global configuration (seed, tick length, total ticks, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and maps to simulated time.
    pub clock: SimClock,

    /// Species parameters and relationships.  Shared read-only with every
    /// agent's tick.
    pub species: Arc<SpeciesTable>,

    /// Live creatures.
    pub agents: AgentStore,

    /// Per-agent deterministic RNGs, separated for the split-borrow pattern.
    pub rngs: AgentRngs,

    /// The voxel world.  Must not change while a tick is running.
    pub world: W,

    /// Route search used by every path request.
    pub pathfinder: P,

    /// World changes requested by applied effects, waiting for the host.
    pub(crate) pending_edits: Vec<WorldEdit>,

    /// Cells named by `pending_edits`, so a second claim on a cell is
    /// rejected without scanning the queue.
    pub(crate) pending_cells: FxHashSet<IVec3>,

    /// Dedicated intent-phase pool when `config.num_threads` is set.
    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<W: VoxelQuery, P: Pathfinder> Sim<W, P> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        info!(
            agents = self.agents.len(),
            from   = %self.clock.current_tick,
            to     = %self.config.end_tick(),
            "simulation started"
        );
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        info!(agents = self.agents.len(), at = %self.clock, "simulation finished");
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and for hosts that interleave their own movement
    /// integration with behaviour ticks.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Process one tick and advance the clock.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> TickStats {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let stats = self.process_tick(now, observer);
        observer.on_tick_end(now, &stats);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.agents);
        }
        self.clock.advance();
        stats
    }

    /// Drain the world edits produced since the last call.  The host applies
    /// them to its own world representation between ticks.
    ///
    /// The queue only shrinks here, so a host that never drains it keeps
    /// every edit of the run in memory.
    pub fn take_world_edits(&mut self) -> Vec<WorldEdit> {
        self.pending_cells.clear();
        std::mem::take(&mut self.pending_edits)
    }

    /// World edits waiting for the host.
    pub fn pending_world_edits(&self) -> &[WorldEdit] {
        &self.pending_edits
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> TickStats {
        // ── Phase 1: freeze a view of every agent ─────────────────────────
        //
        // Recognition, flocking and target checks all read this snapshot, so
        // an agent ticked early in the batch looks the same to everyone.
        let snapshot = Snapshot::capture(&self.agents);

        // ── Phase 2: intent phase (produce) ───────────────────────────────
        let ticked = self.compute_intents(now, &snapshot);

        let mut stats = TickStats { ticked: ticked.len(), ..TickStats::default() };
        for t in &ticked {
            if t.before != t.after {
                stats.transitions += 1;
                observer.on_task_change(now, t.id, t.before, t.after);
            }
        }

        // ── Phase 3: apply phase (consume) ────────────────────────────────
        //
        // Effects arrive grouped by source agent in ascending id order.
        for effect in ticked.into_iter().flat_map(|t| t.effects) {
            stats.effects += 1;
            let applied = self.apply_effect(now, &effect, observer, &mut stats);
            if applied {
                stats.applied += 1;
            } else {
                trace!(tick = %now, ?effect, "effect rejected");
            }
            observer.on_effect(now, &effect, applied);
        }

        stats
    }

    /// Tick every agent.
    ///
    /// With the `parallel` Cargo feature the batch runs on Rayon: on the
    /// sim's own pool when `num_threads` is set, otherwise on the global
    /// one.  Each worker gets one disjoint `(&mut Agent, &mut AgentRng)`
    /// pair and shares the context immutably.
    fn compute_intents(&mut self, now: Tick, snapshot: &Snapshot) -> Vec<Ticked> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let species    = &*self.species;
        let world      = &self.world;
        let pathfinder = &self.pathfinder;
        let slots      = self.agents.slots_mut();
        let rngs       = self.rngs.inner.as_mut_slice();

        let ctx = TickContext::new(now, self.config.tick_secs, species, snapshot, world, pathfinder);

        #[cfg(not(feature = "parallel"))]
        {
            slots
                .iter_mut()
                .zip(rngs.iter_mut())
                .filter_map(|(slot, rng)| slot.as_mut().map(|agent| (agent, rng)))
                .map(|(agent, rng)| {
                    let before = agent.task;
                    let mut effects = Vec::new();
                    tick_agent(agent, rng, &ctx, &mut effects);
                    Ticked { id: agent.id, before, after: agent.task, effects }
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let batch = || -> Vec<Ticked> {
                slots
                    .par_iter_mut()
                    .zip(rngs.par_iter_mut())
                    .filter_map(|(slot, rng)| slot.as_mut().map(|agent| (agent, rng)))
                    .map(|(agent, rng)| {
                        let before = agent.task;
                        let mut effects = Vec::new();
                        tick_agent(agent, rng, &ctx, &mut effects);
                        Ticked { id: agent.id, before, after: agent.task, effects }
                    })
                    .collect()
            };
            match &self.pool {
                Some(pool) => pool.install(batch),
                None => batch(),
            }
        }
    }
}
