//! Behaviour states.

use std::fmt;

/// One named behaviour mode.
///
/// Declaration order is significant: it is the task index used by
/// [`TaskSet`] and by guards such as "cannot start mating at or after
/// `Reproduce`".
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Task {
    #[default]
    Idle,
    RandomPath,
    FollowFlock,
    FindPrey,
    ChasePrey,
    Attack,
    FindMate,
    ChaseMate,
    Reproduce,
    FollowRider,
    RunFromTarget,
    ChaseTarget,
    AttackTarget,
    Surface,
    FlopOnGround,
    RunFromPredator,
    Death,
}

impl Task {
    pub const COUNT: usize = 17;

    /// Every task in index order.
    pub const ALL: [Task; Self::COUNT] = [
        Task::Idle,
        Task::RandomPath,
        Task::FollowFlock,
        Task::FindPrey,
        Task::ChasePrey,
        Task::Attack,
        Task::FindMate,
        Task::ChaseMate,
        Task::Reproduce,
        Task::FollowRider,
        Task::RunFromTarget,
        Task::ChaseTarget,
        Task::AttackTarget,
        Task::Surface,
        Task::FlopOnGround,
        Task::RunFromPredator,
        Task::Death,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Task> {
        Self::ALL.get(i).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Task::Idle            => "idle",
            Task::RandomPath      => "random_path",
            Task::FollowFlock     => "follow_flock",
            Task::FindPrey        => "find_prey",
            Task::ChasePrey       => "chase_prey",
            Task::Attack          => "attack",
            Task::FindMate        => "find_mate",
            Task::ChaseMate       => "chase_mate",
            Task::Reproduce       => "reproduce",
            Task::FollowRider     => "follow_rider",
            Task::RunFromTarget   => "run_from_target",
            Task::ChaseTarget     => "chase_target",
            Task::AttackTarget    => "attack_target",
            Task::Surface         => "surface",
            Task::FlopOnGround    => "flop_on_ground",
            Task::RunFromPredator => "run_from_predator",
            Task::Death           => "death",
        }
    }

    /// Looking for or pursuing a mate.
    pub const fn is_courting(self) -> bool {
        matches!(self, Task::FindMate | Task::ChaseMate)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── TaskSet ───────────────────────────────────────────────────────────────────

/// A set of tasks, one bit per task index.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TaskSet(u32);

impl TaskSet {
    pub const EMPTY: TaskSet = TaskSet(0);
    pub const ALL: TaskSet = TaskSet((1 << Task::COUNT) - 1);

    pub const fn of(tasks: &[Task]) -> TaskSet {
        let mut bits: u32 = 0;
        let mut i = 0;
        while i < tasks.len() {
            bits |= 1u32 << tasks[i].index();
            i += 1;
        }
        TaskSet(bits)
    }

    #[inline]
    pub const fn contains(self, task: Task) -> bool {
        self.0 & (1 << task.index()) != 0
    }

    #[must_use]
    pub const fn with(self, task: Task) -> TaskSet {
        TaskSet(self.0 | (1 << task.index()))
    }

    #[must_use]
    pub const fn without(self, task: Task) -> TaskSet {
        TaskSet(self.0 & !(1 << task.index()))
    }

    #[must_use]
    pub const fn difference(self, other: TaskSet) -> TaskSet {
        TaskSet(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Task> {
        Task::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}
