//! Plain data row types written by output backends.

/// One agent's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub species:  u16,
    /// `Task::name()` of the current task.
    pub task:     &'static str,
    pub x:        f32,
    pub y:        f32,
    pub z:        f32,
    /// Fraction of maximum health, `0.0..=1.0`.
    pub health:   f32,
    /// Signed breath balance; negative while holding breath.
    pub breath:   f32,
}

/// A task transition, as an animation layer would consume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskChangeRow {
    pub tick:     u64,
    pub agent_id: u32,
    pub from:     &'static str,
    pub to:       &'static str,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:          u64,
    pub elapsed_secs:  f64,
    pub ticked_agents: u64,
    pub effects:       u64,
    pub applied:       u64,
    pub spawned:       u64,
    pub despawned:     u64,
}
