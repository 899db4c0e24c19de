//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `robot_status.csv`
//! - `tick_summaries.csv`
//! - `events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, RobotStatusRow, TickSummaryRow};

pub const STATUS_HEADER: [&str; 14] = [
    "tick",
    "time_ms",
    "robot",
    "x",
    "y",
    "heading",
    "Location",
    "NextLocation",
    "Target",
    "Stop",
    "MaxSpeed",
    "CarriedProduct",
    "BatteryLevel",
    "Priority",
];

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    status:    Writer<File>,
    summaries: Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut status = Writer::from_path(dir.join("robot_status.csv"))?;
        status.write_record(STATUS_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "time_ms", "moving"])?;

        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(["time_ms", "robot", "event", "detail"])?;

        Ok(Self { status, summaries, events, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_status(&mut self, rows: &[RobotStatusRow]) -> OutputResult<()> {
        for row in rows {
            self.status.write_record(&[
                row.tick.to_string(),
                row.time_ms.to_string(),
                row.robot.clone(),
                format!("{:.1}", row.x),
                format!("{:.1}", row.y),
                format!("{:.1}", row.heading),
                row.location.clone(),
                row.next_location.clone(),
                row.target.clone(),
                row.stop.to_string(),
                format!("{:.1}", row.max_speed),
                row.carried.clone(),
                row.battery.to_string(),
                row.priority.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries
            .write_record(&[row.tick.to_string(), row.time_ms.to_string(), row.moving.to_string()])?;
        Ok(())
    }

    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.time_ms.to_string(),
            row.robot.clone(),
            row.kind.as_str().to_string(),
            row.detail.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.status.flush()?;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
