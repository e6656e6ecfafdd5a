//! Request and step paths.
//!
//! Per-agent path failures are never errors to the caller of the tick: a
//! failed request yields an inactive [`PathState`] and a lost path yields
//! [`StepOutcome::Blocked`].  Both are logged at `trace` level.

use glam::{IVec3, Vec3};
use tracing::trace;

use eco_core::{chebyshev, voxel_center, voxel_of};
use eco_spatial::{MoveProfile, Pathfinder, VoxelQuery};

use crate::{PathKind, PathResult, PathState};

// ── Requests ──────────────────────────────────────────────────────────────────

/// What to search for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathRequest {
    /// Exactly this voxel.
    To(IVec3),
    /// This voxel, or the reachable voxel closest to it.
    Approach(IVec3),
    /// Along a direction.
    Ray(Vec3),
    /// Along a direction until a voxel satisfying `goal` is found.
    Match { goal: MoveProfile, direction: Vec3 },
}

/// Run a path search and wrap the result.
pub fn try_request_path(
    pathfinder: &dyn Pathfinder,
    world:      &dyn VoxelQuery,
    profile:    &MoveProfile,
    origin:     IVec3,
    request:    PathRequest,
    max_steps:  u32,
    kind:       PathKind,
) -> PathResult<PathState> {
    let plan = match request {
        PathRequest::To(to) => pathfinder.find_path(world, profile, origin, to, max_steps)?,
        PathRequest::Approach(to) => {
            pathfinder.find_path_or_approach(world, profile, origin, to, max_steps)?
        }
        PathRequest::Ray(dir) => {
            pathfinder.find_path_along_ray(world, profile, origin, dir, max_steps)?
        }
        PathRequest::Match { goal, direction } => {
            pathfinder.find_match_along_ray(world, profile, &goal, origin, direction, max_steps)?
        }
    };
    Ok(PathState::from_plan(plan, kind))
}

/// [`try_request_path`], degrading any failure to an inactive path.
pub fn request_path(
    pathfinder: &dyn Pathfinder,
    world:      &dyn VoxelQuery,
    profile:    &MoveProfile,
    origin:     IVec3,
    request:    PathRequest,
    max_steps:  u32,
    kind:       PathKind,
) -> PathState {
    match try_request_path(pathfinder, world, profile, origin, request, max_steps, kind) {
        Ok(path) => path,
        Err(e) => {
            trace!(%origin, ?request, error = %e, "path request failed");
            PathState::none()
        }
    }
}

// ── Stepping ──────────────────────────────────────────────────────────────────

/// Result of stepping a path for one tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Keep moving toward `waypoint` (centre of the next voxel).
    Continue { waypoint: Vec3 },
    /// The last step was consumed.  The path is now inactive.
    Arrived,
    /// There is no usable path.  The path is now inactive.
    Blocked,
}

/// Follow a fixed route for one tick.
///
/// A step is consumed only when the agent's voxel equals the next voxel of
/// the route; otherwise the agent holds its place in the sequence.  The path
/// is invalidated when the next voxel no longer satisfies `profile` or when
/// the agent is further than `profile.tolerance` from both the current and
/// the next voxel.
pub fn step(
    path:     &mut PathState,
    world:    &dyn VoxelQuery,
    profile:  &MoveProfile,
    position: Vec3,
) -> StepOutcome {
    if !path.is_active() {
        return StepOutcome::Blocked;
    }
    let (Some(current), Some(next)) = (path.current_cell(), path.next_cell()) else {
        // Every step already consumed (or an empty plan).
        path.invalidate();
        return StepOutcome::Arrived;
    };

    if !profile.is_valid(world, next) {
        trace!(%next, "path invalidated: next voxel no longer fits the profile");
        path.invalidate();
        return StepOutcome::Blocked;
    }

    let actual = voxel_of(position);
    let drift = chebyshev(actual, current).min(chebyshev(actual, next));
    if drift > profile.tolerance {
        trace!(%actual, %current, drift, "path invalidated: agent drifted off the path");
        path.invalidate();
        return StepOutcome::Blocked;
    }

    if actual == next && path.advance() {
        path.invalidate();
        return StepOutcome::Arrived;
    }

    match path.waypoint() {
        Some(waypoint) => StepOutcome::Continue { waypoint },
        None => StepOutcome::Continue { waypoint: voxel_center(next) },
    }
}

/// Follow a pursuit path for one tick.
///
/// Like [`step`], but the path is also abandoned once the pursued target has
/// moved more than `retarget_tolerance` voxels away from where it was when
/// the path was planned.  Static paths are stepped as with [`step`].
pub fn step_dynamic(
    path:               &mut PathState,
    world:              &dyn VoxelQuery,
    profile:            &MoveProfile,
    position:           Vec3,
    target_position:    Vec3,
    retarget_tolerance: i32,
) -> StepOutcome {
    if let (true, PathKind::Dynamic { target }) = (path.is_active(), path.kind()) {
        let moved = chebyshev(voxel_of(target_position), target);
        if moved > retarget_tolerance {
            trace!(%target, moved, "path invalidated: target moved");
            path.invalidate();
            return StepOutcome::Blocked;
        }
    }
    step(path, world, profile, position)
}
