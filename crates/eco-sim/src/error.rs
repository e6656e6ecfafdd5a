use eco_agent::AgentError;
use eco_behavior::BehaviorError;
use eco_core::{AgentId, SpeciesId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("species {0} is not registered")]
    UnknownSpecies(SpeciesId),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("agent {0} cannot be ridden")]
    NotRideable(AgentId),

    #[error("agent {0} has no rider")]
    NotRidden(AgentId),

    #[error("agent {0} already has a rider")]
    AlreadyRidden(AgentId),

    #[error("agent {0} is dead")]
    Dead(AgentId),

    #[error("saved state version {got} is not supported (expected {expected})")]
    Version { expected: u32, got: u32 },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error("persistence error: {0}")]
    Persist(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
