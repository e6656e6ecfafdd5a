//! Simulation observer trait for progress reporting and data collection.

use eco_agent::{Agent, AgentStore, Task};
use eco_behavior::Effect;
use eco_core::{AgentId, Tick};

/// Counters for one processed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Agents whose task function ran.
    pub ticked:      usize,
    /// Effects produced by the intent phase.
    pub effects:     usize,
    /// Effects that still held against live state and were applied.
    pub applied:     usize,
    pub spawned:     usize,
    pub despawned:   usize,
    /// Task changes, including those made while applying effects.
    pub transitions: usize,
}

impl TickStats {
    /// Effects dropped because their preconditions no longer held.
    pub fn rejected(&self) -> usize {
        self.effects - self.applied
    }
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] and
/// [`Sim::step`][crate::Sim::step] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: rider bookkeeping
///
/// ```rust,ignore
/// struct Riders(HashMap<u64, AgentId>);
///
/// impl SimObserver for Riders {
///     fn on_effect(&mut self, _tick: Tick, effect: &Effect, applied: bool) {
///         if let (Effect::Dismount { rider, .. }, true) = (effect, applied) {
///             self.0.remove(rider);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after every effect has been applied.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// An agent's task changed, either in its own tick or as the result of
    /// another agent's effect.
    fn on_task_change(&mut self, _tick: Tick, _agent: AgentId, _from: Task, _to: Task) {}

    /// An effect was processed.  `applied` is false when it was rejected.
    fn on_effect(&mut self, _tick: Tick, _effect: &Effect, _applied: bool) {}

    /// An agent was removed from the registry.  Called with the final state.
    fn on_despawn(&mut self, _tick: Tick, _agent: &Agent) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks` ticks).
    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
