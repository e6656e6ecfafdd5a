//! `SimOutputObserver<W>` bridges `SimObserver` to an `OutputWriter`.

use eco_agent::{AgentStore, Task};
use eco_core::{AgentId, SimConfig, Tick};
use eco_sim::{SimObserver, TickStats};

use crate::OutputError;
use crate::row::{AgentSnapshotRow, TaskChangeRow, TickSummaryRow};
use crate::writer::OutputWriter;

/// A [`SimObserver`] that writes agent snapshots, task changes and tick
/// summaries to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    tick_secs:  f32,
    /// Task changes seen this tick, written at tick end.
    changes:    Vec<TaskChangeRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for simulated
    /// time.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_secs:  config.tick_secs,
            changes:    Vec::new(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_task_change(&mut self, tick: Tick, agent: AgentId, from: Task, to: Task) {
        self.changes.push(TaskChangeRow {
            tick:     tick.0,
            agent_id: agent.0,
            from:     from.name(),
            to:       to.name(),
        });
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        if !self.changes.is_empty() {
            let changes = std::mem::take(&mut self.changes);
            let result = self.writer.write_task_changes(&changes);
            self.store_err(result);
        }
        let row = TickSummaryRow {
            tick:          tick.0,
            elapsed_secs:  tick.0 as f64 * self.tick_secs as f64,
            ticked_agents: stats.ticked as u64,
            effects:       stats.effects as u64,
            applied:       stats.applied as u64,
            spawned:       stats.spawned as u64,
            despawned:     stats.despawned as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore) {
        let rows: Vec<AgentSnapshotRow> = agents
            .iter()
            .map(|a| {
                let p = a.position();
                AgentSnapshotRow {
                    agent_id: a.id.0,
                    tick:     tick.0,
                    species:  a.species.0,
                    task:     a.task.name(),
                    x:        p.x,
                    y:        p.y,
                    z:        p.z,
                    health:   a.vitality.fraction(),
                    breath:   a.vitality.breath,
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
