//! `eco-agent` — creature records and the live-agent registry.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`task`]       | `Task` (ordered behaviour states), `TaskSet`                 |
//! | [`vitality`]   | `Vitality` — health, breath, mating cooldown, corpse remains |
//! | [`genetics`]   | `Genetics`, `GeneTrait` — per-individual stat multipliers    |
//! | [`agent`]      | `Agent`, `MoveIntent`, `RideState`                           |
//! | [`store`]      | `AgentStore` (slab registry), `AgentRngs` (per-agent RNG)    |
//! | [`error`]      | `AgentError`, `AgentResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                 |
//! |---------|--------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types. |

pub mod agent;
pub mod error;
pub mod genetics;
pub mod store;
pub mod task;
pub mod vitality;

#[cfg(test)]
mod tests;

pub use agent::{Agent, MoveIntent, RideState};
pub use error::{AgentError, AgentResult};
pub use genetics::{GeneTrait, Genetics};
pub use store::{AgentRngs, AgentStore};
pub use task::{Task, TaskSet};
pub use vitality::{BreathParams, Medium, Thresholds, Vitality};
