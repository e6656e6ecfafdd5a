//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `task_changes.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TaskChangeRow, TickSummaryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    changes:   Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(["agent_id", "tick", "species", "task", "x", "y", "z", "health", "breath"])?;

        let mut changes = Writer::from_path(dir.join("task_changes.csv"))?;
        changes.write_record(["tick", "agent_id", "from", "to"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "elapsed_secs",
            "ticked_agents",
            "effects",
            "applied",
            "spawned",
            "despawned",
        ])?;

        Ok(Self { snapshots, changes, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.species.to_string(),
                row.task.to_string(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                format!("{:.3}", row.z),
                format!("{:.4}", row.health),
                format!("{:.3}", row.breath),
            ])?;
        }
        Ok(())
    }

    fn write_task_changes(&mut self, rows: &[TaskChangeRow]) -> OutputResult<()> {
        for row in rows {
            self.changes.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.from.to_string(),
                row.to.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.ticked_agents.to_string(),
            row.effects.to_string(),
            row.applied.to_string(),
            row.spawned.to_string(),
            row.despawned.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.changes.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
