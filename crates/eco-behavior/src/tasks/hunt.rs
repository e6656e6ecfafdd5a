//! Feeding: find food, get to it, eat.
//!
//! Herbivores feed on foliage voxels (`Agent::forage`), everything else on
//! other agents (`Agent::target`).  Scavengers only take bodies that are
//! already dead.  All three tasks stop as soon as the agent is satiated.

use glam::IVec3;

use eco_agent::{Agent, Task};
use eco_core::{AgentId, voxel_center};
use eco_path::{PathKind, PathRequest, StepOutcome};
use eco_spatial::{Material, MaterialMask};

use crate::config::Diet;
use crate::machine::TaskEnv;
use crate::recognition::find_closest_prey;
use crate::{AgentView, Effect};

use super::{can_graze, face, follow_path, go_idle, grazing_cell, in_reach, pursue, start_locomotion};

fn satiated(agent: &Agent, env: &TaskEnv<'_>) -> bool {
    agent.vitality.stop_hunting(&env.cfg.thresholds)
}

/// Whether `view` is still food for this species.
fn edible(diet: Diet, view: &AgentView) -> bool {
    match diet {
        Diet::Scavenger => view.is_dead() && view.is_attackable(),
        _ => view.is_attackable(),
    }
}

/// The current prey as seen in the snapshot, if it is still food and in
/// sight.
fn prey_view<'s>(agent: &Agent, env: &TaskEnv<'s>) -> Option<&'s AgentView> {
    let view = env.ctx.snapshot.try_get(agent.target?)?;
    let in_sight = view.position.distance(agent.position()) <= env.sight(agent);
    (edible(env.cfg.diet, view) && in_sight).then_some(view)
}

/// Look for the nearest food and start toward it.  Nothing in range means
/// wandering to look elsewhere.
pub fn find_prey(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if satiated(agent, env) {
        go_idle(agent, env);
        return;
    }
    match env.cfg.diet {
        Diet::Herbivore => {
            let food = env.ctx.world.find_nearest(
                agent.pose.voxel(),
                env.cfg.forage_radius,
                MaterialMask::FOLIAGE,
            );
            match food {
                Some(cell) => {
                    agent.reset_task(Task::ChasePrey, 0.0);
                    agent.forage = Some(cell);
                }
                None => start_locomotion(agent, env),
            }
        }
        Diet::Carnivore | Diet::Scavenger => {
            let sight = env.sight(agent);
            let found: Option<AgentId> = if env.cfg.diet == Diet::Scavenger {
                let dead = |v: &AgentView| v.is_dead();
                find_closest_prey(env.ctx, agent, sight, Some(&dead))
            } else {
                find_closest_prey(env.ctx, agent, sight, None)
            };
            match found {
                Some(prey) => {
                    agent.reset_task(Task::ChasePrey, 0.0);
                    agent.target = Some(prey);
                }
                None => start_locomotion(agent, env),
            }
        }
    }
}

/// Close in on the chosen food.  A path that runs out short of reach means
/// the food cannot be got at; the pursuit is dropped instead of retried.
pub fn chase_prey(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if satiated(agent, env) {
        go_idle(agent, env);
        return;
    }
    if let Some(cell) = agent.forage {
        chase_foliage(agent, env, cell);
        return;
    }
    let Some(prey) = prey_view(agent, env) else {
        agent.reset_task(Task::FindPrey, 0.0);
        return;
    };
    let position = prey.position;
    if in_reach(agent, env, position) {
        agent.set_task(Task::Attack, 0.0);
        face(agent, position);
        return;
    }
    let speed = env.run_speed(agent);
    match pursue(agent, env, position, speed) {
        // Exhausted short of the prey, or no route at all: give up.
        None => start_locomotion(agent, env),
        Some(StepOutcome::Arrived) if !agent.path.reached() => start_locomotion(agent, env),
        Some(_) => {}
    }
}

fn chase_foliage(agent: &mut Agent, env: &mut TaskEnv<'_>, cell: IVec3) {
    if env.ctx.world.material(cell) != Material::Foliage {
        agent.reset_task(Task::FindPrey, 0.0);
        return;
    }
    if can_graze(agent, env, cell) {
        agent.set_task(Task::Attack, 0.0);
        agent.forage = Some(cell);
        face(agent, voxel_center(cell));
        return;
    }
    if !agent.path.is_active() {
        let stand = grazing_cell(env, cell);
        if !env.plan(agent, PathRequest::Approach(stand), env.cfg.chase_steps, PathKind::Static) {
            start_locomotion(agent, env);
            return;
        }
    }
    let speed = env.walk_speed(agent);
    match follow_path(agent, env, speed) {
        StepOutcome::Continue { .. } | StepOutcome::Blocked => {}
        StepOutcome::Arrived if can_graze(agent, env, cell) => {
            agent.set_task(Task::Attack, 0.0);
            agent.forage = Some(cell);
        }
        StepOutcome::Arrived => start_locomotion(agent, env),
    }
}

/// Bite the food every `attack_cooldown` seconds.  Living prey is
/// attacked; a body or a foliage voxel is eaten.  Both go through the
/// effect queue.
pub fn attack(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if satiated(agent, env) {
        go_idle(agent, env);
        return;
    }
    if let Some(cell) = agent.forage {
        graze(agent, env, cell);
        return;
    }
    let Some(prey) = prey_view(agent, env) else {
        agent.reset_task(Task::FindPrey, 0.0);
        return;
    };
    let (target, position, dead) = (prey.id, prey.position, prey.is_dead());
    if !in_reach(agent, env, position) {
        agent.set_task(Task::ChasePrey, 0.0);
        return;
    }
    face(agent, position);
    agent.task_timer -= env.dt();
    if agent.task_timer > 0.0 {
        return;
    }
    env.effects.push(if dead {
        Effect::Collect { collector: agent.id, target, bite: env.cfg.bite }
    } else {
        Effect::Attack { attacker: agent.id, target, damage: env.attack_damage(agent) }
    });
    agent.task_timer = env.attack_cooldown(agent);
}

fn graze(agent: &mut Agent, env: &mut TaskEnv<'_>, cell: IVec3) {
    if env.ctx.world.material(cell) != Material::Foliage {
        agent.reset_task(Task::FindPrey, 0.0);
        return;
    }
    if !can_graze(agent, env, cell) {
        agent.set_task(Task::ChasePrey, 0.0);
        agent.forage = Some(cell);
        return;
    }
    face(agent, voxel_center(cell));
    agent.task_timer -= env.dt();
    if agent.task_timer > 0.0 {
        return;
    }
    env.effects.push(Effect::Graze { agent: agent.id, cell, nutrition: env.cfg.bite });
    agent.task_timer = env.attack_cooldown(agent);
}
