//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `agent_snapshots`, `task_changes` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TaskChangeRow, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 agent_id INTEGER NOT NULL,
                 tick     INTEGER NOT NULL,
                 species  INTEGER NOT NULL,
                 task     TEXT    NOT NULL,
                 x        REAL    NOT NULL,
                 y        REAL    NOT NULL,
                 z        REAL    NOT NULL,
                 health   REAL    NOT NULL,
                 breath   REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS task_changes (
                 tick     INTEGER NOT NULL,
                 agent_id INTEGER NOT NULL,
                 from_task TEXT   NOT NULL,
                 to_task   TEXT   NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick          INTEGER PRIMARY KEY,
                 elapsed_secs  REAL    NOT NULL,
                 ticked_agents INTEGER NOT NULL,
                 effects       INTEGER NOT NULL,
                 applied       INTEGER NOT NULL,
                 spawned       INTEGER NOT NULL,
                 despawned     INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (agent_id, tick, species, task, x, y, z, health, breath) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick,
                    row.species,
                    row.task,
                    row.x,
                    row.y,
                    row.z,
                    row.health,
                    row.breath,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_task_changes(&mut self, rows: &[TaskChangeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO task_changes (tick, agent_id, from_task, to_task) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick, row.agent_id, row.from, row.to])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, elapsed_secs, ticked_agents, effects, applied, spawned, despawned) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                row.tick,
                row.elapsed_secs,
                row.ticked_agents,
                row.effects,
                row.applied,
                row.spawned,
                row.despawned,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
