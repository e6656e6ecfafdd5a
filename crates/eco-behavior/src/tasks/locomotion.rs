//! Idling and goal-less wandering.

use eco_agent::{Agent, Task};
use eco_path::{PathKind, PathRequest, StepOutcome};

use crate::flocking::{Neighbor, calculate_boid_direction};
use crate::machine::TaskEnv;

use super::{follow_path, go_idle, seek_food, start_locomotion};

/// Stand still until the timer runs out, then wander.  Hunger, then
/// readiness to mate, interrupt idling on any tick.
pub fn idle(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if seek_food(agent, env) {
        return;
    }
    if agent.vitality.begin_mating(&env.cfg.thresholds) {
        agent.reset_task(Task::FindMate, 0.0);
        return;
    }
    agent.task_timer -= env.dt();
    if agent.task_timer <= 0.0 {
        start_locomotion(agent, env);
    }
}

/// Walk (swim, fly) a short random leg, then idle.
pub fn random_path(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if seek_food(agent, env) {
        return;
    }
    agent.task_timer -= env.dt();
    if agent.task_timer <= 0.0 {
        go_idle(agent, env);
        return;
    }
    if !agent.path.is_active() {
        let dir = if env.cfg.is_volumetric() { env.rng.unit_vec3() } else { env.rng.unit_vec3_flat() };
        if !env.plan(agent, PathRequest::Ray(dir), env.cfg.wander_steps, PathKind::Static) {
            go_idle(agent, env);
            return;
        }
    }
    let speed = env.walk_speed(agent);
    match follow_path(agent, env, speed) {
        StepOutcome::Continue { .. } => {}
        StepOutcome::Arrived | StepOutcome::Blocked => go_idle(agent, env),
    }
}

/// Wander in short legs whose direction is the flock's boid heading.  A
/// finished leg is replaced by a new one; only a failed plan or the end of
/// the wander timer returns the agent to `Idle`.
pub fn follow_flock(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if seek_food(agent, env) {
        return;
    }
    agent.task_timer -= env.dt();
    if agent.task_timer <= 0.0 {
        go_idle(agent, env);
        return;
    }
    if !agent.path.is_active() {
        let position = agent.position();
        let flock = env.cfg.flock;
        let neighbors: Vec<Neighbor> = env
            .ctx
            .snapshot
            .within(position, flock.radius)
            .filter(|v| v.id != agent.id && v.species == agent.species && !v.is_dead())
            .map(|v| Neighbor { position: v.position, heading: v.heading })
            .collect();
        let dir = calculate_boid_direction(position, agent.heading, &neighbors, &flock);
        let dir = env.flatten(dir).try_normalize().unwrap_or_else(|| env.rng.unit_vec3_flat());
        agent.heading = dir;
        if !env.plan(agent, PathRequest::Ray(dir), flock.leg_steps, PathKind::Static) {
            go_idle(agent, env);
            return;
        }
    }
    let speed = env.walk_speed(agent);
    follow_path(agent, env, speed);
}
