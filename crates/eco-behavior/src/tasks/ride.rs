//! Carrying a rider.

use eco_agent::{Agent, MoveIntent};

use crate::machine::TaskEnv;

use super::go_idle;

/// Turn the rider's steering into movement.  A mount whose rider has gone
/// returns to `Idle`.
pub fn follow_rider(agent: &mut Agent, env: &mut TaskEnv<'_>) {
    let Some(ride) = agent.ride else {
        go_idle(agent, env);
        return;
    };
    let dir = env.flatten(ride.steer);
    if dir.length_squared() < 1e-6 {
        return;
    }
    let speed = if ride.sprint { env.run_speed(agent) } else { env.walk_speed(agent) };
    agent.intent = MoveIntent::along(dir, speed);
    if let Some(face) = agent.intent.face {
        agent.heading = face;
    }
}
