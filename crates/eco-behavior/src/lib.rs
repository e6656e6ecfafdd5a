//! `eco-behavior` — the creature behaviour core.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`config`]      | `SpeciesConfig`, `Capabilities`, `Diet`, `OverrideTable`, `SpeciesTable`, `Relation` |
//! | [`loader`]      | CSV loading of species and relationship tables                  |
//! | [`snapshot`]    | `Snapshot`, `AgentView` — start-of-tick read-only world of agents |
//! | [`context`]     | `TickContext<'a>` — everything a task may read during a tick    |
//! | [`effect`]      | `Effect` — deferred cross-agent mutations                       |
//! | [`recognition`] | nearest predator / prey / mate queries                          |
//! | [`flocking`]    | separation / alignment / cohesion heading                       |
//! | [`mate`]        | `can_mate_with`, `mate_with`                                    |
//! | [`machine`]     | per-agent tick: dispatch table + priority overrides             |
//! | [`tasks`]       | one transition function per `Task`                              |
//! | [`error`]       | `BehaviorError`, `BehaviorResult<T>`                            |
//!
//! # Design notes
//!
//! The tick loop in `eco-sim` runs in two phases:
//!
//! 1. **Intent phase** (parallel): [`machine::tick_agent`] runs once per
//!    living agent.  It mutates only that agent.  Every read of another
//!    agent goes through the [`Snapshot`] taken at the start of the tick, and
//!    every change to another agent is pushed as an [`Effect`].
//!
//! 2. **Apply phase** (sequential): effects are applied in ascending agent
//!    order, re-validating each one against live state.
//!
//! Iteration order within the intent phase is therefore unobservable.

pub mod config;
pub mod context;
pub mod effect;
pub mod error;
pub mod flocking;
pub mod loader;
pub mod machine;
pub mod mate;
pub mod recognition;
pub mod snapshot;
pub mod tasks;


pub use config::{Capabilities, Diet, FlockConfig, OverrideTable, Relation, SpeciesConfig, SpeciesTable};
pub use context::TickContext;
pub use effect::Effect;
pub use error::{BehaviorError, BehaviorResult};
pub use flocking::{Neighbor, calculate_boid_direction};
pub use loader::{load_relations_reader, load_species_csv, load_species_reader};
pub use machine::{TaskEnv, TaskFn, task_fn, tick_agent};
pub use mate::{MateCandidate, can_mate_with, mate_with};
pub use recognition::{find_closest_mate, find_closest_predator, find_closest_prey};
pub use snapshot::{AgentView, Snapshot};
