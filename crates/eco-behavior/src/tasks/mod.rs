//! Task transition functions, grouped by behaviour.
//!
//! Every function has the shape `fn(&mut Agent, &mut TaskEnv)` and is wired
//! into the dispatch table in [`machine`](crate::machine).  A function may
//! switch the agent's task before returning; the new task's function runs on
//! the next tick.
//!
//! Lost targets are never errors.  A target id that no longer resolves in the
//! snapshot, or resolves to something no longer eligible, sends the agent back
//! to a search or to `Idle`.

pub mod combat;
pub mod courtship;
pub mod death;
pub mod environment;
pub mod hunt;
pub mod locomotion;
pub mod ride;

use glam::{IVec3, Vec3};

use eco_agent::{Agent, MoveIntent, Task};
use eco_core::{DEFAULT_HEADING, voxel_center, voxel_of};
use eco_path::{PathKind, PathRequest, StepOutcome, step, step_dynamic};

use crate::config::Capabilities;
use crate::machine::TaskEnv;

// ── Transitions ───────────────────────────────────────────────────────────────

/// Idle with a freshly rolled timer, dropping any target.
pub(crate) fn go_idle(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    let timer = env.idle_time();
    agent.reset_task(Task::Idle, timer);
}

/// Start wandering: alone, or with the flock.
pub(crate) fn start_locomotion(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    let timer = env.idle_time();
    let task = if env.cfg.has(Capabilities::FLOCKING) { Task::FollowFlock } else { Task::RandomPath };
    agent.reset_task(task, timer);
}

/// Switch to `FindPrey` when hungry.  Returns whether it did.
pub(crate) fn seek_food(agent: &mut Agent, env: &TaskEnv<'_>) -> bool {
    if agent.vitality.begin_hunting(&env.cfg.thresholds) {
        agent.reset_task(Task::FindPrey, 0.0);
        true
    } else {
        false
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

/// Head for `point` at `speed`, updating the travel heading.
pub(crate) fn move_toward(agent: &mut Agent, point: Vec3, speed: f32) {
    agent.intent = MoveIntent::toward(agent.position(), point, speed);
    if let Some(dir) = agent.intent.face {
        agent.heading = dir;
    }
}

/// Stand still facing `point`.
pub(crate) fn face(agent: &mut Agent, point: Vec3) {
    let dir = (point - agent.position()).normalize_or_zero();
    agent.intent = MoveIntent { velocity: Vec3::ZERO, face: (dir != Vec3::ZERO).then_some(dir) };
}

/// Step the agent's fixed route and move along it.  Returns the step outcome.
pub(crate) fn follow_path(agent: &mut Agent, env: &TaskEnv<'_>, speed: f32) -> StepOutcome {
    let position = agent.position();
    let outcome = step(&mut agent.path, env.ctx.world, &env.cfg.profile, position);
    if let StepOutcome::Continue { waypoint } = outcome {
        move_toward(agent, waypoint, speed);
    }
    outcome
}

/// Step a pursuit path toward a target currently at `target`, planning one
/// first if needed.  `None` means no route could be planned.
pub(crate) fn pursue(agent: &mut Agent, env: &TaskEnv<'_>, target: Vec3, speed: f32) -> Option<StepOutcome> {
    if !agent.path.is_active() {
        let cell = voxel_of(target);
        let kind = PathKind::Dynamic { target: cell };
        if !env.plan(agent, PathRequest::Approach(cell), env.cfg.chase_steps, kind) {
            return None;
        }
    }
    let position = agent.position();
    let outcome = step_dynamic(
        &mut agent.path,
        env.ctx.world,
        &env.cfg.profile,
        position,
        target,
        env.cfg.retarget_tolerance,
    );
    match outcome {
        StepOutcome::Continue { waypoint } => move_toward(agent, waypoint, speed),
        // Route done but not yet in reach: close the last stretch directly.
        StepOutcome::Arrived if agent.path.reached() => move_toward(agent, target, speed),
        _ => {}
    }
    Some(outcome)
}

/// Plan a flight path directly away from `threat` and start running.
/// Returns whether a path was found.
pub(crate) fn flee_from(agent: &mut Agent, env: &mut TaskEnv<'_>, threat: Vec3) -> bool {
    let mut dir = env.flatten(agent.position() - threat);
    if dir.length_squared() < 1e-6 {
        dir = if env.cfg.is_volumetric() { env.rng.unit_vec3() } else { env.rng.unit_vec3_flat() };
    }
    let dir = dir.try_normalize().unwrap_or(DEFAULT_HEADING);
    let speed = env.run_speed(agent);
    let found = env.plan(agent, PathRequest::Ray(dir), env.cfg.flee_steps, PathKind::Static);
    if found {
        follow_path(agent, env, speed);
    } else {
        agent.intent = MoveIntent::along(dir, speed);
        agent.heading = dir;
    }
    found
}

/// The voxel a grazer stands in to eat `food`.
pub(crate) fn grazing_cell(env: &TaskEnv<'_>, food: IVec3) -> IVec3 {
    if env.cfg.is_volumetric() { food } else { food + IVec3::Y }
}

/// Close enough to a foliage voxel to eat it.
pub(crate) fn can_graze(agent: &Agent, env: &TaskEnv<'_>, food: IVec3) -> bool {
    agent.pose.voxel() == grazing_cell(env, food) || in_reach(agent, env, voxel_center(food))
}

#[inline]
pub(crate) fn in_reach(agent: &Agent, env: &TaskEnv<'_>, point: Vec3) -> bool {
    agent.position().distance(point) <= env.attack_distance(agent)
}
