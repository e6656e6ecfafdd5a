//! Reacting to a specific other agent: running from it, or fighting it.
//!
//! `RunFromTarget`, `ChaseTarget` and `AttackTarget` are entered from the
//! apply phase when an agent is attacked.  `RunFromPredator` is entered by the
//! predator override.  Both flee tasks drop the threat once it is gone or out
//! of sight.

use eco_agent::{Agent, Task};
use eco_path::StepOutcome;

use crate::machine::TaskEnv;
use crate::{AgentView, Effect};

use super::{face, flee_from, follow_path, go_idle, in_reach, pursue};

/// The target as seen in the snapshot, if it still exists and is in sight.
fn visible_target<'s>(agent: &Agent, env: &TaskEnv<'s>) -> Option<&'s AgentView> {
    let view = env.ctx.snapshot.try_get(agent.target?)?;
    (view.position.distance(agent.position()) <= env.sight(agent)).then_some(view)
}

fn flee(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    let Some(threat) = visible_target(agent, env).filter(|v| !v.is_dead()).map(|v| v.position) else {
        go_idle(agent, env);
        return;
    };
    if !agent.path.is_active() {
        flee_from(agent, env, threat);
        return;
    }
    let speed = env.run_speed(agent);
    match follow_path(agent, env, speed) {
        StepOutcome::Continue { .. } => {}
        // Leg finished or lost while the threat is still in sight: next leg.
        StepOutcome::Arrived | StepOutcome::Blocked => {
            flee_from(agent, env, threat);
        }
    }
}

/// Run from whoever attacked us.
pub fn run_from_target(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    flee(agent, env);
}

/// Run from a predator spotted by the predator override.
pub fn run_from_predator(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    flee(agent, env);
}

/// Go after whoever attacked us.
pub fn chase_target(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    let Some(position) = visible_target(agent, env).filter(|v| v.is_attackable()).map(|v| v.position)
    else {
        go_idle(agent, env);
        return;
    };
    if in_reach(agent, env, position) {
        agent.set_task(Task::AttackTarget, 0.0);
        face(agent, position);
        return;
    }
    let speed = env.run_speed(agent);
    match pursue(agent, env, position, speed) {
        None => go_idle(agent, env),
        Some(StepOutcome::Arrived) if !agent.path.reached() => go_idle(agent, env),
        Some(_) => {}
    }
}

/// Fight the target.  Once it is dead, feed on it until satiated or until
/// nothing is left.
pub fn attack_target(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    let Some(view) = visible_target(agent, env).filter(|v| v.is_attackable()) else {
        go_idle(agent, env);
        return;
    };
    let (target, position, dead) = (view.id, view.position, view.is_dead());
    if !in_reach(agent, env, position) {
        agent.set_task(Task::ChaseTarget, 0.0);
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
