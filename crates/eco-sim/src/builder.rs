//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use rustc_hash::FxHashSet;

use eco_agent::{AgentRngs, AgentStore};
use eco_behavior::SpeciesTable;
use eco_core::{AgentId, AgentRng, SimConfig};
use eco_spatial::{Pathfinder, VoxelQuery};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<W, P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: seed, tick duration, total ticks, genetic variance
/// - [`SpeciesTable`]: every species agents may belong to
/// - `W: VoxelQuery`: the world the creatures live in
/// - `P: Pathfinder`: route search (e.g. [`eco_spatial::GridPathfinder`])
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                         |
/// |--------------------|---------------------------------|
/// | `.agents(s, r)`    | Empty registry, no RNGs         |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, species, grid, GridPathfinder::default())
///     .build()?;
/// let deer = sim.spawn(deer_id, Vec3::new(4.5, 1.0, 4.5))?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<W: VoxelQuery, P: Pathfinder> {
    config:     SimConfig,
    species:    Arc<SpeciesTable>,
    world:      W,
    pathfinder: P,
    agents:     Option<(AgentStore, AgentRngs)>,
}

impl<W: VoxelQuery, P: Pathfinder> SimBuilder<W, P> {
    /// Create a builder with all required inputs.
    pub fn new(
        config:     SimConfig,
        species:    impl Into<Arc<SpeciesTable>>,
        world:      W,
        pathfinder: P,
    ) -> Self {
        Self { config, species: species.into(), world, pathfinder, agents: None }
    }

    /// Start from an existing population.  Slots without an RNG get one
    /// seeded from the config seed and their id.
    pub fn agents(mut self, agents: AgentStore, rngs: AgentRngs) -> Self {
        self.agents = Some((agents, rngs));
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<W, P>> {
        let c = &self.config;
        if !(c.tick_secs.is_finite() && c.tick_secs > 0.0) {
            return Err(SimError::Config(format!("tick_secs must be positive, got {}", c.tick_secs)));
        }
        if !(0.0..=0.95).contains(&c.genetic_variance) {
            return Err(SimError::Config(format!(
                "genetic_variance must lie in [0, 0.95], got {}",
                c.genetic_variance
            )));
        }
        if c.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }
        for (_, species) in self.species.iter() {
            species.validate()?;
        }

        let (agents, mut rngs) = self.agents.unwrap_or_default();
        for agent in agents.iter() {
            if self.species.get(agent.species).is_none() {
                return Err(SimError::UnknownSpecies(agent.species));
            }
        }
        while rngs.len() < agents.capacity() {
            let id = AgentId(rngs.len() as u32);
            rngs.install(self.config.seed, id, AgentRng::new(self.config.seed, id));
        }

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("intent thread pool: {e}")))?,
            ),
            None => None,
        };

        Ok(Sim {
            clock:         self.config.make_clock(),
            config:        self.config,
            species:       self.species,
            agents,
            rngs,
            world:         self.world,
            pathfinder:    self.pathfinder,
            pending_edits: Vec::new(),
            pending_cells: FxHashSet::default(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
