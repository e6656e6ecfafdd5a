//! `eco-path` — the path lifecycle adapter.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`state`]   | `PathState` — an agent's standing path, `PathKind`              |
//! | [`adapter`] | `PathRequest`, `request_path`, `step`, `step_dynamic`, `StepOutcome` |
//! | [`error`]   | `PathError`, `PathResult<T>`                                    |
//!
//! # Lifecycle
//!
//! 1. A task calls [`request_path`] with a [`Pathfinder`][eco_spatial::Pathfinder]
//!    and gets back a `PathState` (inactive if the search failed).
//! 2. Every tick the task calls [`step`] (fixed route) or [`step_dynamic`]
//!    (pursuit of a moving target) with the agent's actual position.
//! 3. The adapter consumes a step only when the agent has entered the next
//!    voxel, and reports `Arrived` when the last step is consumed or
//!    `Blocked` when the path was lost (world changed, agent knocked off
//!    course, target moved away).  A blocked or arrived path is inactive and
//!    must be re-requested.

pub mod adapter;
pub mod error;
pub mod state;

#[cfg(test)]
mod tests;

pub use adapter::{PathRequest, StepOutcome, request_path, step, step_dynamic, try_request_path};
pub use error::{PathError, PathResult};
pub use state::{PathKind, PathState};
