//! Agent-registry error type.

use eco_core::{AgentId, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("slot {0} is already occupied")]
    SlotOccupied(AgentId),

    #[error("agent {id} is invalid: {reason}")]
    Invalid { id: AgentId, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AgentResult<T> = Result<T, AgentError>;
