//! Per-agent path state.

use glam::{IVec3, Vec3};

use eco_core::{Step, voxel_center};
use eco_spatial::PathPlan;

use crate::{PathError, PathResult};

/// How a path is followed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathKind {
    /// A fixed route (wandering, fleeing, surfacing).
    #[default]
    Static,
    /// Pursuit of a moving target; `target` is the voxel the target occupied
    /// when the path was requested.
    Dynamic { target: IVec3 },
}

/// The standing path of one agent.
///
/// When [`is_active`](Self::is_active) is `false` the step sequence and
/// index are stale; every accessor that reads them returns `None`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathState {
    has_path: bool,
    origin:   IVec3,
    steps:    Vec<Step>,
    index:    usize,
    reached:  bool,
    kind:     PathKind,
}

impl PathState {
    /// No path.
    pub fn none() -> Self {
        Self::default()
    }

    /// Take ownership of a search result.
    pub fn from_plan(plan: PathPlan, kind: PathKind) -> Self {
        Self {
            has_path: true,
            origin:   plan.origin,
            steps:    plan.steps,
            index:    0,
            reached:  plan.reached,
            kind,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.has_path
    }

    /// Drop the path.  The step buffer is released with it.
    pub fn invalidate(&mut self) {
        self.has_path = false;
        self.steps = Vec::new();
        self.index = 0;
    }

    /// Whether the last plan actually reaches its goal, or only approaches it.
    ///
    /// Stays readable after the path has been consumed so tasks can tell an
    /// exhausted truncated path from a completed one.
    #[inline]
    pub fn reached(&self) -> bool {
        self.reached
    }

    #[inline]
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn origin(&self) -> Option<IVec3> {
        self.has_path.then_some(self.origin)
    }

    /// Number of steps not yet consumed.
    pub fn remaining(&self) -> usize {
        if self.has_path { self.steps.len().saturating_sub(self.index) } else { 0 }
    }

    /// The voxel the agent should be in right now.
    pub fn current_cell(&self) -> Option<IVec3> {
        self.has_path.then(|| {
            self.steps[..self.index.min(self.steps.len())]
                .iter()
                .fold(self.origin, |c, s| c + s.offset())
        })
    }

    /// The voxel the agent is heading into, `None` once every step is used.
    pub fn next_cell(&self) -> Option<IVec3> {
        let step = self.steps.get(self.index).filter(|_| self.has_path)?;
        self.current_cell().map(|c| c + step.offset())
    }

    /// World-space point to steer toward.
    pub fn waypoint(&self) -> Option<Vec3> {
        self.next_cell().map(voxel_center)
    }

    /// Where the path ends: origin advanced by every step.
    pub fn destination(&self) -> Option<IVec3> {
        self.has_path
            .then(|| self.steps.iter().fold(self.origin, |c, s| c + s.offset()))
    }

    /// Consume one step.  Returns `true` when that was the last one.
    pub(crate) fn advance(&mut self) -> bool {
        self.index += 1;
        self.index >= self.steps.len()
    }

    /// Check a state that came from storage.
    pub fn validate(&self) -> PathResult<()> {
        if self.has_path && self.index > self.steps.len() {
            return Err(PathError::IndexOutOfRange { index: self.index, len: self.steps.len() });
        }
        Ok(())
    }
}
