//! `eco-sim` — tick loop orchestrator for the eco engine.
//!
//! # Two-phase tick loop
//!
//! ```text
//! for tick in clock..config.total_ticks:
//!   ① Snapshot — freeze position, species, task and vitality of every agent
//!                and index them in an R-tree.
//!   ② Intents  — tick_agent for each agent (parallel with `parallel`):
//!                upkeep, task function, death / environment / predator
//!                overrides.  Cross-agent changes become Effects.
//!   ③ Apply    — for each effect in ascending source-AgentId order,
//!                re-validate against live state, then:
//!                  Attack   → damage, provoke the victim
//!                  Collect  → eat from a corpse
//!                  Graze    → eat foliage, queue a WorldEdit
//!                  Mate     → commit both partners
//!                  Spawn    → new agent
//!                  Despawn  → remove agent
//!                  Dismount → tell the host
//! ```
//!
//! Between ticks the host integrates each agent's `intent`, then reports the
//! new pose ([`Sim::set_motion`]) and medium ([`Sim::report_environment`]).
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the intent phase on Rayon's thread pool.          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use eco_behavior::{SpeciesConfig, SpeciesTable};
//! use eco_core::SimConfig;
//! use eco_sim::{NoopObserver, SimBuilder};
//! use eco_spatial::GridPathfinder;
//!
//! let mut table = SpeciesTable::new();
//! let deer = table.add(SpeciesConfig::herbivore("deer"))?;
//! let mut sim = SimBuilder::new(config, table, grid, GridPathfinder::default()).build()?;
//! sim.spawn(deer, Vec3::new(4.5, 1.0, 4.5))?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod apply;
pub mod builder;
pub mod error;
pub mod host;
pub mod observer;
pub mod persist;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickStats};
pub use persist::{SAVE_VERSION, SavedState};
pub use sim::Sim;
