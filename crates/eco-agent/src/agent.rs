//! One simulated creature.

use glam::{IVec3, Vec3};

use eco_core::{AgentId, DEFAULT_HEADING, Pose, SpeciesId};
use eco_path::PathState;

use crate::{Genetics, Task, Vitality};

/// Movement the behaviour core wants this tick.  The host's locomotion
/// integrator turns it into the next pose.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct MoveIntent {
    /// Desired velocity in world units per second.
    pub velocity: Vec3,
    /// Direction to face, if the task cares.
    pub face:     Option<Vec3>,
}

impl MoveIntent {
    /// Stand still.
    pub fn halt() -> Self {
        Self::default()
    }

    /// Move toward `point` from `from` at `speed`, facing the direction of
    /// travel.
    pub fn toward(from: Vec3, point: Vec3, speed: f32) -> Self {
        let dir = (point - from).normalize_or_zero();
        Self {
            velocity: dir * speed,
            face:     (dir != Vec3::ZERO).then_some(dir),
        }
    }

    /// Move along `dir` at `speed`.
    pub fn along(dir: Vec3, speed: f32) -> Self {
        let dir = dir.normalize_or_zero();
        Self {
            velocity: dir * speed,
            face:     (dir != Vec3::ZERO).then_some(dir),
        }
    }
}

/// A host entity riding this creature.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RideState {
    /// Host-side id of the rider.
    pub rider:  u64,
    /// Latest steering input, in world space.  Zero means "stand".
    pub steer:  Vec3,
    pub sprint: bool,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id:         AgentId,
    pub species:    SpeciesId,
    pub pose:       Pose,
    pub velocity:   Vec3,

    // ── Behaviour ─────────────────────────────────────────────────────────
    pub task:       Task,
    /// Meaning depends on the task: idle time left, attack cooldown,
    /// pregnancy time left, decomposition time left.
    pub task_timer: f32,
    /// Another creature this task is about.  May no longer exist.
    pub target:     Option<AgentId>,
    /// Food voxel a grazer is heading for.
    pub forage:     Option<IVec3>,
    /// Smoothed travel direction, used by flocking.
    pub heading:    Vec3,

    // ── Owned state ───────────────────────────────────────────────────────
    pub vitality:   Vitality,
    pub genetics:   Genetics,
    pub path:       PathState,
    pub ride:       Option<RideState>,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub intent:     MoveIntent,
}

impl Agent {
    /// A fresh creature: full health, idle, standing still.
    pub fn new(
        id:       AgentId,
        species:  SpeciesId,
        position: Vec3,
        vitality: Vitality,
        genetics: Genetics,
    ) -> Self {
        Self {
            id,
            species,
            pose: Pose::at(position),
            velocity: Vec3::ZERO,
            task: Task::Idle,
            task_timer: 0.0,
            target: None,
            forage: None,
            heading: DEFAULT_HEADING,
            vitality,
            genetics,
            path: PathState::none(),
            ride: None,
            intent: MoveIntent::halt(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.vitality.is_dead()
    }

    /// Switch task, resetting the per-task fields.  Leaves `target` alone so
    /// callers can carry it across (Find → Chase).
    pub fn set_task(&mut self, task: Task, timer: f32) {
        self.task = task;
        self.task_timer = timer;
        self.path.invalidate();
        self.forage = None;
    }

    /// Switch task and drop the target.
    pub fn reset_task(&mut self, task: Task, timer: f32) {
        self.set_task(task, timer);
        self.target = None;
    }
}
