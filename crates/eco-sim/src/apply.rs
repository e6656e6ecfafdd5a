//! The apply phase: deferred effects checked against live state.
//!
//! Every effect was produced from the start-of-tick snapshot.  By the time
//! it is applied, earlier effects in the same batch may have killed,
//! despawned or committed the agents involved, so each arm re-validates
//! before touching anything and reports whether it went through.

use glam::IVec3;
use tracing::debug;

use eco_agent::{Agent, Task, Vitality};
use eco_behavior::{Effect, MateCandidate, SpeciesConfig, SpeciesTable, can_mate_with, mate_with};
use eco_core::{AgentId, AgentRng, Tick};
use eco_spatial::{Material, Pathfinder, VoxelQuery, WorldEdit};

use crate::{Sim, SimObserver, TickStats};

/// Agents whose task an effect may change.
fn touched(effect: &Effect) -> [Option<AgentId>; 2] {
    match *effect {
        Effect::Attack { attacker, target, .. }   => [Some(attacker), Some(target)],
        Effect::Collect { collector, .. }         => [Some(collector), None],
        Effect::Graze { agent, .. }               => [Some(agent), None],
        Effect::Mate { initiator, partner }       => [Some(initiator), Some(partner)],
        Effect::Spawn { .. }
        | Effect::Despawn { .. }
        | Effect::Dismount { .. }                 => [None, None],
    }
}

/// A feeder that has eaten its fill stops and idles.
fn settle_if_full(agent: &mut Agent, cfg: &SpeciesConfig, rng: Option<&mut AgentRng>) {
    if !agent.vitality.stop_hunting(&cfg.thresholds) {
        return;
    }
    if matches!(agent.task, Task::Attack | Task::ChasePrey | Task::AttackTarget | Task::ChaseTarget) {
        let timer = rng.map_or(cfg.average_idle_time, |r| r.reroll(cfg.average_idle_time));
        agent.reset_task(Task::Idle, timer);
    }
}

/// Turn on an attacker, if the victim's current task allows the
/// interruption and it is not already dealing with that attacker.
fn provoke(victim: &mut Agent, attacker: AgentId, species: &SpeciesTable) {
    let Some(cfg) = species.get(victim.species) else {
        return;
    };
    if victim.is_dead() || !cfg.overrides.predator.contains(victim.task) {
        return;
    }
    let engaged = victim.target == Some(attacker)
        && matches!(victim.task, Task::RunFromTarget | Task::ChaseTarget | Task::AttackTarget);
    if engaged {
        return;
    }
    let task = if cfg.diet.eats_agents() { Task::ChaseTarget } else { Task::RunFromTarget };
    victim.reset_task(task, 0.0);
    victim.target = Some(attacker);
}

impl<W: VoxelQuery, P: Pathfinder> Sim<W, P> {
    /// Apply one effect.  Returns whether it was applied.
    pub(crate) fn apply_effect<O: SimObserver>(
        &mut self,
        now:      Tick,
        effect:   &Effect,
        observer: &mut O,
        stats:    &mut TickStats,
    ) -> bool {
        let watched = touched(effect);
        let before = watched.map(|id| id.and_then(|id| self.agents.get(id)).map(|a| a.task));

        let applied = match *effect {
            Effect::Attack { attacker, target, damage } => self.apply_attack(attacker, target, damage),
            Effect::Collect { collector, target, bite } => self.apply_collect(collector, target, bite),
            Effect::Graze { agent, cell, nutrition }    => self.apply_graze(agent, cell, nutrition),
            Effect::Mate { initiator, partner }         => self.apply_mate(initiator, partner),
            Effect::Spawn { parent, species, position } => match self.spawn(species, position) {
                Ok(child) => {
                    stats.spawned += 1;
                    debug!(tick = %now, %parent, %child, "offspring born");
                    true
                }
                Err(e) => {
                    debug!(tick = %now, %parent, error = %e, "spawn rejected");
                    false
                }
            },
            Effect::Despawn { agent } => match self.agents.despawn(agent) {
                Some(gone) => {
                    stats.despawned += 1;
                    debug!(tick = %now, agent = %gone.id, "despawned");
                    observer.on_despawn(now, &gone);
                    true
                }
                None => false,
            },
            Effect::Dismount { agent, rider } => {
                // The rider is already off; this only tells the host.
                if let Some(mount) = self.agents.get_mut(agent) {
                    mount.ride = None;
                }
                debug!(tick = %now, %agent, rider, "rider thrown");
                true
            }
        };

        for (id, from) in watched.into_iter().zip(before) {
            let (Some(id), Some(from)) = (id, from) else {
                continue;
            };
            let Some(to) = self.agents.get(id).map(|a| a.task) else {
                continue;
            };
            if to != from {
                stats.transitions += 1;
                observer.on_task_change(now, id, from, to);
            }
        }
        applied
    }

    fn apply_attack(&mut self, attacker: AgentId, target: AgentId, damage: f32) -> bool {
        let Some((a, t)) = self.agents.pair_mut(attacker, target) else {
            return false;
        };
        if a.is_dead() || !Vitality::attack(&mut t.vitality, damage) {
            return false;
        }
        provoke(t, attacker, &self.species);
        true
    }

    fn apply_collect(&mut self, collector: AgentId, target: AgentId, bite: f32) -> bool {
        let Some((c, t)) = self.agents.pair_mut(collector, target) else {
            return false;
        };
        if c.is_dead() || !t.is_dead() {
            return false;
        }
        let taken = t.vitality.consume_remains(bite);
        if taken <= 0.0 {
            return false;
        }
        c.vitality.heal(taken);
        if let Some(cfg) = self.species.get(c.species) {
            settle_if_full(c, cfg, self.rngs.get_mut(collector));
        }
        true
    }

    fn apply_graze(&mut self, agent: AgentId, cell: IVec3, nutrition: f32) -> bool {
        if self.world.material(cell) != Material::Foliage || self.pending_cells.contains(&cell) {
            return false;
        }
        let Some(a) = self.agents.get_mut(agent) else {
            return false;
        };
        if a.is_dead() {
            return false;
        }
        a.vitality.heal(nutrition);
        if let Some(cfg) = self.species.get(a.species) {
            settle_if_full(a, cfg, self.rngs.get_mut(agent));
        }
        self.pending_cells.insert(cell);
        self.pending_edits.push(WorldEdit::Consume { cell });
        true
    }

    /// Both sides of a proposal may arrive in the same batch; whichever is
    /// applied second finds both agents already committed and is rejected.
    fn apply_mate(&mut self, initiator: AgentId, partner: AgentId) -> bool {
        let species = &*self.species;
        let Some((a, b)) = self.agents.pair_mut(initiator, partner) else {
            return false;
        };
        if !can_mate_with(MateCandidate::from(&*a), MateCandidate::from(&*b), species) {
            return false;
        }
        mate_with(a, partner, true, species);
        mate_with(b, initiator, false, species);
        true
    }
}
