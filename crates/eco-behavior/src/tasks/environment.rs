//! Getting back into a breathable medium.

use glam::Vec3;

use eco_agent::{Agent, Medium, MoveIntent};
use eco_core::voxel_center;
use eco_path::{PathKind, PathRequest, StepOutcome, request_path, step};
use eco_spatial::{MaterialMask, MoveProfile};

use crate::machine::TaskEnv;

use super::{go_idle, move_toward};

/// Head up to air.  The route is searched with the body's profile relaxed
/// to any fluid and ends at the first voxel a breathing body fits.  Without
/// a route the agent just swims straight up.
pub fn surface(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if agent.vitality.medium == Medium::Gas {
        go_idle(agent, env);
        return;
    }
    let body = env.cfg.profile.surfacing();
    let speed = env.run_speed(agent);
    if !agent.path.is_active() {
        agent.path = request_path(
            env.ctx.pathfinder,
            env.ctx.world,
            &body,
            agent.pose.voxel(),
            PathRequest::Match { goal: MoveProfile::breathing(), direction: Vec3::Y },
            env.cfg.chase_steps,
            PathKind::Static,
        );
    }
    let position = agent.position();
    match step(&mut agent.path, env.ctx.world, &body, position) {
        StepOutcome::Continue { waypoint } => move_toward(agent, waypoint, speed),
        StepOutcome::Arrived | StepOutcome::Blocked => {
            agent.intent = MoveIntent::along(Vec3::Y, speed);
        }
    }
}

/// Stranded in gas: hop toward the nearest liquid, or about at random when
/// none is near.  The timer spaces out the random hops.
pub fn flop_on_ground(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if agent.vitality.medium == Medium::Liquid {
        go_idle(agent, env);
        return;
    }
    let speed = env.walk_speed(agent);
    let water = env.ctx.world.find_nearest(agent.pose.voxel(), env.cfg.forage_radius, MaterialMask::LIQUID);
    if let Some(cell) = water {
        move_toward(agent, voxel_center(cell), speed);
        return;
    }
    agent.task_timer -= env.dt();
    if agent.task_timer <= 0.0 {
        let dir = env.rng.unit_vec3_flat();
        agent.intent = MoveIntent::along(dir, speed * 0.5);
        agent.heading = dir;
        agent.task_timer = env.rng.reroll(1.0);
    }
}
