//! `eco-output` — simulation output writers for the eco engine.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend     | Files created                                                  |
//! |-----------|-------------|----------------------------------------------------------------|
//! | *(none)*  | CSV         | `agent_snapshots.csv`, `task_changes.csv`, `tick_summaries.csv` |
//! | `sqlite`  | SQLite      | `output.db`                                                    |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `eco_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eco_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentSnapshotRow, TaskChangeRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
