//! `eco-core` — foundational types for the `eco` creature-behavior engine.
//!
//! This crate is a dependency of every other `eco-*` crate.  It has no
//! `eco-*` dependencies and few external ones (`glam`, `rand`, `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                   |
//! |-----------|------------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `SpeciesId`                                     |
//! | [`math`]  | `Step` (26 neighbours + stay), `Pose`, voxel helpers       |
//! | [`time`]  | `Tick`, `SimClock`, `SimConfig`                            |
//! | [`rng`]   | `AgentRng` (per-agent, deterministic), genome seeding      |
//! | [`error`] | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use glam::{IVec3, Quat, Vec3};
pub use ids::{AgentId, SpeciesId};
pub use math::{DEFAULT_HEADING, Pose, Step, chebyshev, voxel_center, voxel_of};
pub use rng::{AgentRng, genome_seed};
pub use time::{SimClock, SimConfig, Tick};
