//! Finding a mate and carrying a pregnancy.

use glam::Vec3;

use eco_agent::{Agent, Task};
use eco_core::AgentId;
use eco_path::StepOutcome;

use crate::machine::TaskEnv;
use crate::mate::{MateCandidate, can_mate_with};
use crate::recognition::find_closest_mate;
use crate::{AgentView, Effect};

use super::{face, go_idle, in_reach, pursue, start_locomotion};

/// Still courting: healthy enough and off cooldown.
fn keen(agent: &Agent, env: &TaskEnv<'_>) -> bool {
    !agent.vitality.stop_mating(&env.cfg.thresholds) && agent.vitality.mate_cooldown <= 0.0
}

pub fn find_mate(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if !keen(agent, env) {
        go_idle(agent, env);
        return;
    }
    let sight = env.sight(agent);
    let species = env.ctx.species;
    let me = MateCandidate::from(&*agent);
    let eligible = |v: &AgentView| can_mate_with(me, MateCandidate::from(v), species);
    let found = find_closest_mate(env.ctx, agent, sight, Some(&eligible));
    match found {
        Some(mate) => {
            agent.reset_task(Task::ChaseMate, 0.0);
            agent.target = Some(mate);
        }
        None => start_locomotion(agent, env),
    }
}

/// Approach the chosen partner; once in reach, propose.  The proposal is an
/// [`Effect::Mate`] checked again against live state when applied, so two
/// suitors converging on the same partner cannot both succeed.
pub fn chase_mate(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if !keen(agent, env) {
        go_idle(agent, env);
        return;
    }
    let partner: Option<(Vec3, AgentId)> = agent.target.and_then(|id| {
        let view = env.ctx.snapshot.try_get(id)?;
        let me = MateCandidate::from(&*agent);
        let in_sight = view.position.distance(agent.position()) <= env.sight(agent);
        (in_sight && can_mate_with(me, view.into(), env.ctx.species)).then_some((view.position, id))
    });
    let Some((position, partner)) = partner else {
        agent.reset_task(Task::FindMate, 0.0);
        return;
    };
    if in_reach(agent, env, position) {
        face(agent, position);
        env.effects.push(Effect::Mate { initiator: agent.id, partner });
        return;
    }
    let speed = env.walk_speed(agent);
    match pursue(agent, env, position, speed) {
        None => start_locomotion(agent, env),
        Some(StepOutcome::Arrived) if !agent.path.reached() => start_locomotion(agent, env),
        Some(_) => {}
    }
}

/// Wait out the pregnancy, then release the litter.  Hunger and courtship
/// do not interrupt this task; only the override table decides what may.
pub fn reproduce(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    agent.task_timer -= env.dt();
    if agent.task_timer > 0.0 {
        return;
    }
    for _ in 0..agent.vitality.gestating {
        env.effects.push(Effect::Spawn {
            parent:   agent.id,
            species:  agent.species,
            position: agent.position(),
        });
    }
    agent.vitality.gestating = 0;
    go_idle(agent, env);
}
