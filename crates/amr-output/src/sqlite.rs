//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `robot_status`, `tick_summaries`, and `events`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, RobotStatusRow, TickSummaryRow};

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
             CREATE TABLE IF NOT EXISTS robot_status (
                 tick          INTEGER NOT NULL,
                 time_ms       INTEGER NOT NULL,
                 robot         TEXT    NOT NULL,
                 x             REAL    NOT NULL,
                 y             REAL    NOT NULL,
                 heading       REAL    NOT NULL,
                 location      TEXT    NOT NULL,
                 next_location TEXT    NOT NULL,
                 target        TEXT    NOT NULL,
                 stop          INTEGER NOT NULL,
                 max_speed     REAL    NOT NULL,
                 carried       TEXT    NOT NULL,
                 battery       INTEGER NOT NULL,
                 priority      INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick    INTEGER PRIMARY KEY,
                 time_ms INTEGER NOT NULL,
                 moving  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS events (
                 time_ms INTEGER NOT NULL,
                 robot   TEXT    NOT NULL,
                 event   TEXT    NOT NULL,
                 detail  TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_status(&mut self, rows: &[RobotStatusRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO robot_status \
                 (tick, time_ms, robot, x, y, heading, location, next_location, target, \
                  stop, max_speed, carried, battery, priority) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.time_ms as i64,
                    row.robot,
                    row.x,
                    row.y,
                    row.heading,
                    row.location,
                    row.next_location,
                    row.target,
                    row.stop as i64,
                    row.max_speed,
                    row.carried,
                    row.battery,
                    row.priority,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries (tick, time_ms, moving) VALUES (?1, ?2, ?3)",
            rusqlite::params![row.tick as i64, row.time_ms as i64, row.moving as i64],
        )?;
        Ok(())
    }

    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO events (time_ms, robot, event, detail) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![row.time_ms as i64, row.robot, row.kind.as_str(), row.detail],
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
