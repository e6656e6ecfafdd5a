//! Deferred cross-agent effects.
//!
//! A task may only mutate its own agent.  Anything that touches another
//! agent, the registry or the world is recorded as an [`Effect`] and applied
//! after the whole batch has been ticked, in ascending order of the agent
//! that produced it.  The apply phase re-checks every effect against live
//! state, so an effect whose preconditions no longer hold is dropped.

use glam::{IVec3, Vec3};

use eco_core::{AgentId, SpeciesId};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Damage `target`.
    Attack { attacker: AgentId, target: AgentId, damage: f32 },
    /// Feed on the remains of a dead `target`.
    Collect { collector: AgentId, target: AgentId, bite: f32 },
    /// Eat the foliage voxel `cell`.
    Graze { agent: AgentId, cell: IVec3, nutrition: f32 },
    /// Commit `initiator` and `partner` to reproduction.
    Mate { initiator: AgentId, partner: AgentId },
    /// Create a new agent.
    Spawn { parent: AgentId, species: SpeciesId, position: Vec3 },
    /// Remove an agent from the registry.
    Despawn { agent: AgentId },
    /// Throw the rider off `agent`.
    Dismount { agent: AgentId, rider: u64 },
}

impl Effect {
    /// The agent whose tick produced this effect.
    pub fn source(&self) -> AgentId {
        match *self {
            Effect::Attack { attacker, .. }   => attacker,
            Effect::Collect { collector, .. } => collector,
            Effect::Graze { agent, .. }       => agent,
            Effect::Mate { initiator, .. }    => initiator,
            Effect::Spawn { parent, .. }      => parent,
            Effect::Despawn { agent }         => agent,
            Effect::Dismount { agent, .. }    => agent,
        }
    }
}
