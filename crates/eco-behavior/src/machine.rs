//! The per-agent tick: upkeep, task dispatch, priority overrides.
//!
//! # Order
//!
//! 1. Upkeep: metabolism and cooldowns, movement intent reset to "halt".
//! 2. The function mapped to the current [`Task`] runs.  It may switch task.
//! 3. Overrides run in fixed order, each able to overwrite what step 2 chose:
//!    death, then environment (surface / flop), then predator.
//!
//! Every override is idempotent: running the tick twice on an agent already
//! in the overriding task changes nothing further.

use glam::Vec3;
use tracing::trace;

use eco_agent::{Agent, GeneTrait, Medium, MoveIntent, Task};
use eco_core::{AgentRng, voxel_of};
use eco_path::{PathKind, PathRequest, request_path};

use crate::config::{Capabilities, SpeciesConfig};
use crate::recognition::find_closest_predator;
use crate::{Effect, TickContext, tasks};

// ── TaskEnv ───────────────────────────────────────────────────────────────────

/// Everything a task function gets besides its own agent.
pub struct TaskEnv<'a> {
    pub ctx:     &'a TickContext<'a>,
    /// The agent's species.
    pub cfg:     &'a SpeciesConfig,
    pub rng:     &'a mut AgentRng,
    /// Deferred effects produced this tick.
    pub effects: &'a mut Vec<Effect>,
}

impl TaskEnv<'_> {
    #[inline]
    pub fn dt(&self) -> f32 {
        self.ctx.dt
    }

    pub fn sight(&self, agent: &Agent) -> f32 {
        agent.genetics.get(GeneTrait::SightDistance, self.cfg.sight_distance)
    }

    pub fn walk_speed(&self, agent: &Agent) -> f32 {
        agent.genetics.get(GeneTrait::WalkSpeed, self.cfg.walk_speed)
    }

    pub fn run_speed(&self, agent: &Agent) -> f32 {
        agent.genetics.get(GeneTrait::RunSpeed, self.cfg.run_speed)
    }

    pub fn attack_distance(&self, agent: &Agent) -> f32 {
        agent.genetics.get(GeneTrait::AttackDistance, self.cfg.attack_distance)
    }

    pub fn attack_damage(&self, agent: &Agent) -> f32 {
        agent.genetics.get(GeneTrait::AttackDamage, self.cfg.attack_damage)
    }

    pub fn attack_cooldown(&self, agent: &Agent) -> f32 {
        agent.genetics.get(GeneTrait::AttackCooldown, self.cfg.attack_cooldown)
    }

    /// A fresh idle or wander duration, `average_idle_time * U(0, 2)`.
    pub fn idle_time(&mut self) -> f32 {
        self.rng.reroll(self.cfg.average_idle_time)
    }

    /// Flatten a direction onto the horizontal plane for ground species.
    pub fn flatten(&self, dir: Vec3) -> Vec3 {
        if self.cfg.is_volumetric() { dir } else { Vec3::new(dir.x, 0.0, dir.z) }
    }

    /// Replace the agent's path with a fresh plan.  Returns whether a usable
    /// path came back.
    pub fn plan(&self, agent: &mut Agent, request: PathRequest, max_steps: u32, kind: PathKind) -> bool {
        agent.path = request_path(
            self.ctx.pathfinder,
            self.ctx.world,
            &self.cfg.profile,
            agent.pose.voxel(),
            request,
            max_steps,
            kind,
        );
        agent.path.is_active()
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// One transition function per task.
pub type TaskFn = fn(&mut Agent, &mut TaskEnv<'_>);

/// Indexed by [`Task::index`].
const DISPATCH: [TaskFn; Task::COUNT] = [
    tasks::locomotion::idle,
    tasks::locomotion::random_path,
    tasks::locomotion::follow_flock,
    tasks::hunt::find_prey,
    tasks::hunt::chase_prey,
    tasks::hunt::attack,
    tasks::courtship::find_mate,
    tasks::courtship::chase_mate,
    tasks::courtship::reproduce,
    tasks::ride::follow_rider,
    tasks::combat::run_from_target,
    tasks::combat::chase_target,
    tasks::combat::attack_target,
    tasks::environment::surface,
    tasks::environment::flop_on_ground,
    tasks::combat::run_from_predator,
    tasks::death::death,
];

/// Transition function for `task`.
pub fn task_fn(task: Task) -> TaskFn {
    DISPATCH[task.index()]
}

/// Advance one agent by one tick.
///
/// Mutates only `agent` and `rng`; anything that must touch another agent,
/// the registry or the world is pushed onto `effects`.
pub fn tick_agent(
    agent:   &mut Agent,
    rng:     &mut AgentRng,
    ctx:     &TickContext<'_>,
    effects: &mut Vec<Effect>,
) {
    let Some(cfg) = ctx.species.get(agent.species) else {
        trace!(agent = %agent.id, species = %agent.species, "skipping agent of unknown species");
        return;
    };
    let before = agent.task;
    let mut env = TaskEnv { ctx, cfg, rng, effects };

    // ── Upkeep ────────────────────────────────────────────────────────────
    agent.intent = MoveIntent::halt();
    if agent.task != Task::Death {
        let metabolism = agent.genetics.get(GeneTrait::Metabolism, cfg.metabolism);
        agent.vitality.update(env.dt(), metabolism);
    }

    task_fn(agent.task)(agent, &mut env);

    // ── Overrides ─────────────────────────────────────────────────────────
    if !death_override(agent, &mut env) {
        environment_override(agent, &mut env);
        predator_override(agent, &mut env);
    }

    if agent.task != before {
        trace!(agent = %agent.id, from = %before, to = %agent.task, "task transition");
    }
}

// ── Overrides ─────────────────────────────────────────────────────────────────

/// Force `Death` on a dead agent.  Returns `true` while the agent is dead,
/// in which case no other override may run.
pub fn death_override(agent: &mut Agent, env: &mut TaskEnv<'_>) -> bool {
    if !agent.is_dead() {
        return false;
    }
    if agent.task != Task::Death {
        let decompose = agent.genetics.get(GeneTrait::DecomposeTime, env.cfg.decompose_time);
        agent.reset_task(Task::Death, decompose);
        if let Some(ride) = agent.ride.take() {
            env.effects.push(Effect::Dismount { agent: agent.id, rider: ride.rider });
            if env.cfg.despawn_ridden_corpse {
                env.effects.push(Effect::Despawn { agent: agent.id });
            }
        }
    }
    agent.intent = MoveIntent::halt();
    agent.velocity = Vec3::ZERO;
    true
}

/// Send a suffocating diver to the surface, or a stranded swimmer flopping.
/// Returns whether the task was replaced.
pub fn environment_override(agent: &mut Agent, env: &mut TaskEnv<'_>) -> bool {
    if !env.cfg.overrides.environment.contains(agent.task) {
        return false;
    }
    let medium = agent.vitality.medium;
    let next = if env.cfg.has(Capabilities::AQUATIC) {
        (medium == Medium::Gas).then_some(Task::FlopOnGround)
    } else {
        let hold = agent.genetics.get(GeneTrait::HoldBreath, env.cfg.hold_breath);
        let needs_air = agent.vitality.needs_air(hold * env.cfg.surface_at);
        (medium != Medium::Gas && needs_air).then_some(Task::Surface)
    };
    match next {
        Some(task) => {
            agent.reset_task(task, 0.0);
            true
        }
        None => false,
    }
}

/// Flee the nearest living predator in sight.  Returns whether the task was
/// replaced.
pub fn predator_override(agent: &mut Agent, env: &mut TaskEnv<'_>) -> bool {
    if !env.cfg.overrides.predator.contains(agent.task) {
        return false;
    }
    let sight = env.sight(agent);
    let Some(predator) = find_closest_predator(env.ctx, agent, sight, None) else {
        return false;
    };
    let Some(threat) = env.ctx.snapshot.try_get(predator).map(|v| v.position) else {
        return false;
    };
    agent.reset_task(Task::RunFromPredator, 0.0);
    agent.target = Some(predator);
    tasks::flee_from(agent, env, threat);
    trace!(agent = %agent.id, %predator, cell = %voxel_of(threat), "predator spotted");
    true
}
