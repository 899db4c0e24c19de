//! `amr-output`: simulation output writers for the rust_amr fleet
//! simulator.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                           |
//! |-----------|---------|---------------------------------------------------------|
//! | *(none)*  | CSV     | `robot_status.csv`, `tick_summaries.csv`, `events.csv`  |
//! | `sqlite`  | SQLite  | `output.db`                                             |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `amr_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use amr_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &sim.layout, config.sim.tick_ms);
//! sim.run(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
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
pub use row::{EventKind, EventRow, RobotStatusRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
