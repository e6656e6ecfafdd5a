//! Saving and restoring a running simulation.
//!
//! The format is `serde_json` over [`SavedState`].  Per-agent RNGs are not
//! stored; they are re-derived from the seed, the agent id and the saved
//! tick, so a restored run is deterministic but not a bit-exact
//! continuation of the original.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use eco_agent::{Agent, AgentRngs, AgentStore};
use eco_core::{AgentId, AgentRng, SimConfig, Tick};
use eco_path::PathState;
use eco_spatial::{Pathfinder, VoxelQuery, WorldEdit};

use crate::{Sim, SimError, SimResult};

/// Bumped whenever [`SavedState`] changes shape.
pub const SAVE_VERSION: u32 = 1;

/// Everything needed to resume a run against the same world and species.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedState {
    pub version:       u32,
    pub tick:          Tick,
    pub config:        SimConfig,
    pub agents:        Vec<Agent>,
    /// Slots ever allocated.  Despawned ids below this stay retired after a
    /// restore, so a later spawn never repeats an id (or its genome).
    #[serde(default)]
    pub next_id:       u32,
    /// Edits the host had not yet drained when the state was saved.
    #[serde(default)]
    pub pending_edits: Vec<WorldEdit>,
}

impl<W: VoxelQuery, P: Pathfinder> Sim<W, P> {
    /// Capture the current state.
    pub fn save(&self) -> SavedState {
        SavedState {
            version:       SAVE_VERSION,
            tick:          self.clock.current_tick,
            config:        self.config.clone(),
            agents:        self.agents.iter().cloned().collect(),
            next_id:       self.agents.next_id().0,
            pending_edits: self.pending_edits.clone(),
        }
    }

    pub fn save_json<Wr: Write>(&self, writer: Wr) -> SimResult<()> {
        serde_json::to_writer(writer, &self.save())?;
        Ok(())
    }

    /// Replace the population with a saved one.
    ///
    /// Every agent must belong to a registered species.  Paths that fail
    /// validation are dropped (the agent replans).  Targets that no longer
    /// resolve are cleared.  Returns how many targets were cleared.
    pub fn restore(&mut self, state: SavedState) -> SimResult<usize> {
        if state.version != SAVE_VERSION {
            return Err(SimError::Version { expected: SAVE_VERSION, got: state.version });
        }
        let seed = state.config.seed;
        let mut agents = AgentStore::new();
        let mut rngs = AgentRngs::new();
        for mut agent in state.agents {
            if self.species.get(agent.species).is_none() {
                return Err(SimError::UnknownSpecies(agent.species));
            }
            if let Err(e) = agent.path.validate() {
                debug!(id = %agent.id, error = %e, "dropping invalid saved path");
                agent.path = PathState::none();
            }
            let id = agent.id;
            agents.restore(agent)?;
            rngs.install(seed, id, AgentRng::resume(seed, id, state.tick.0));
        }
        agents.reserve_ids(AgentId(state.next_id));
        while rngs.len() < agents.capacity() {
            let id = AgentId(rngs.len() as u32);
            rngs.install(seed, id, AgentRng::new(seed, id));
        }
        let cleared = agents.clear_stale_targets();

        self.config = state.config;
        self.clock = self.config.make_clock();
        self.clock.current_tick = state.tick;
        self.agents = agents;
        self.rngs = rngs;
        self.pending_cells = state
            .pending_edits
            .iter()
            .map(|edit| match *edit {
                WorldEdit::Consume { cell } => cell,
            })
            .collect();
        self.pending_edits = state.pending_edits;
        info!(agents = self.agents.len(), tick = %state.tick, cleared, "state restored");
        Ok(cleared)
    }

    pub fn load_json<R: Read>(&mut self, reader: R) -> SimResult<usize> {
        let state: SavedState = serde_json::from_reader(reader)?;
        self.restore(state)
    }
}
