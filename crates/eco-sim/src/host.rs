//! Calls the host makes between ticks: populating the world, feeding back
//! the results of locomotion, and driving mounts.

use glam::Vec3;
use tracing::debug;

use eco_agent::{Agent, GeneTrait, Genetics, Medium, MoveIntent, RideState, Task, Vitality};
use eco_behavior::Capabilities;
use eco_core::{AgentId, AgentRng, SpeciesId, genome_seed};
use eco_spatial::{Pathfinder, VoxelGrid, VoxelQuery};

use crate::{Sim, SimError, SimResult};

impl<W: VoxelQuery, P: Pathfinder> Sim<W, P> {
    // ── Population ────────────────────────────────────────────────────────

    /// Create a fresh adult of `species` at `position`.
    ///
    /// Its genome is rolled from the run seed and its new id, so the same
    /// seed and spawn order always produce the same individuals.
    pub fn spawn(&mut self, species: SpeciesId, position: Vec3) -> SimResult<AgentId> {
        let cfg = self.species.get(species).ok_or(SimError::UnknownSpecies(species))?;
        let seed = self.config.seed;
        let variance = self.config.genetic_variance;

        let id = self.agents.spawn(|id| {
            let genetics = Genetics::new(genome_seed(seed, id), variance);
            let vitality = Vitality::new(genetics.get(GeneTrait::MaxHealth, cfg.max_health), cfg.remains);
            Agent::new(id, species, position, vitality, genetics)
        });
        let mut rng = AgentRng::new(seed, id);
        if let Some(agent) = self.agents.get_mut(id) {
            agent.task_timer = rng.reroll(cfg.average_idle_time);
        }
        self.rngs.install(seed, id, rng);
        debug!(%id, species = %cfg.name, "spawned");
        Ok(id)
    }

    /// Remove an agent outside the tick, e.g. one the host killed off.
    pub fn despawn(&mut self, id: AgentId) -> Option<Agent> {
        let gone = self.agents.despawn(id)?;
        debug!(%id, "despawned by host");
        Some(gone)
    }

    // ── Locomotion feedback ───────────────────────────────────────────────

    /// What agent `id` wants to do this tick.
    pub fn intent(&self, id: AgentId) -> Option<MoveIntent> {
        self.agents.get(id).map(|a| a.intent)
    }

    /// Record where the integrator moved agent `id`.  The body turns to face
    /// the direction its last intent asked for.
    pub fn set_motion(&mut self, id: AgentId, position: Vec3, velocity: Vec3) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        agent.pose.position = position;
        agent.velocity = velocity;
        if let Some(dir) = agent.intent.face {
            agent.pose.face(dir);
        }
        Ok(())
    }

    /// Tell agent `id` what it is immersed in and how densely.  Updates the
    /// breath debt and returns any suffocation damage taken.
    pub fn report_environment(&mut self, id: AgentId, medium: Medium, density: f32) -> SimResult<f32> {
        let dt = self.config.tick_secs;
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        let cfg = self.species.get(agent.species).ok_or(SimError::UnknownSpecies(agent.species))?;
        let params = cfg.breath_params(&agent.genetics);
        let v = &mut agent.vitality;
        let damage = match medium {
            Medium::Solid  => v.process_in_solid(density, dt, &params),
            Medium::Liquid => v.process_in_liquid(density, dt, &params),
            Medium::Gas    => v.process_in_gas(density, dt, &params),
        };
        Ok(damage)
    }

    /// Heal agent `id`, e.g. from host-side feeding.  Healing a corpse
    /// brings it back; it leaves `Death` on its next tick.
    pub fn heal(&mut self, id: AgentId, amount: f32) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        agent.vitality.heal(amount);
        Ok(())
    }

    // ── Riding ────────────────────────────────────────────────────────────

    /// Put host entity `rider` on agent `id`.  The mount drops whatever it
    /// was doing and follows the rider's steering from its next tick.
    pub fn mount(&mut self, id: AgentId, rider: u64) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        let cfg = self.species.get(agent.species).ok_or(SimError::UnknownSpecies(agent.species))?;
        if !cfg.has(Capabilities::RIDEABLE) {
            return Err(SimError::NotRideable(id));
        }
        if agent.is_dead() {
            return Err(SimError::Dead(id));
        }
        if agent.ride.is_some() {
            return Err(SimError::AlreadyRidden(id));
        }
        agent.ride = Some(RideState { rider, steer: Vec3::ZERO, sprint: false });
        agent.reset_task(Task::FollowRider, 0.0);
        debug!(%id, rider, "mounted");
        Ok(())
    }

    /// Update the rider's steering input.
    pub fn steer(&mut self, id: AgentId, steer: Vec3, sprint: bool) -> SimResult<()> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        let ride = agent.ride.as_mut().ok_or(SimError::NotRidden(id))?;
        ride.steer = steer;
        ride.sprint = sprint;
        Ok(())
    }

    /// Take the rider off agent `id`.  Returns the rider, if there was one.
    pub fn dismount(&mut self, id: AgentId) -> SimResult<Option<u64>> {
        let agent = self.agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
        let Some(ride) = agent.ride.take() else {
            return Ok(None);
        };
        if agent.task == Task::FollowRider {
            let idle = self.species.get(agent.species).map_or(0.0, |c| c.average_idle_time);
            let timer = self.rngs.get_mut(id).map_or(idle, |r| r.reroll(idle));
            agent.reset_task(Task::Idle, timer);
        }
        debug!(%id, rider = ride.rider, "dismounted");
        Ok(Some(ride.rider))
    }
}

impl<P: Pathfinder> Sim<VoxelGrid, P> {
    /// Apply every pending world edit to the built-in grid.  Returns how
    /// many were applied.
    pub fn apply_world_edits(&mut self) -> usize {
        let edits = self.take_world_edits();
        for edit in &edits {
            self.world.apply(*edit);
        }
        edits.len()
    }
}
