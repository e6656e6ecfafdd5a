//! Decomposition.

use eco_agent::Agent;

use crate::Effect;
use crate::machine::TaskEnv;

use super::go_idle;

/// Count the decomposition timer down and ask for removal when it runs out.
/// A body healed back to life before then goes back to `Idle`.
pub fn death(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    if !agent.is_dead() {
        go_idle(agent, env);
        return;
    }
    agent.task_timer -= env.dt();
    if agent.task_timer <= 0.0 {
        env.effects.push(Effect::Despawn { agent: agent.id });
    }
}
