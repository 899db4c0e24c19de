//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use amr_core::{ItemId, RobotId, SegmentId, SimTime, Tick};
use amr_fleet::{ItemStore, RobotStore};
use amr_sim::SimObserver;
use amr_spatial::Layout;
use tracing::warn;

use crate::row::{EventKind, EventRow, RobotStatusRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes robot status snapshots, tick summaries, and
/// fleet events to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    tick_ms:    u64,
    /// Segment names, indexed by `SegmentId`, for event details.
    segments:   Vec<String>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, layout: &Layout, tick_ms: u32) -> Self {
        Self {
            writer,
            tick_ms: u64::from(tick_ms),
            segments: layout.ids().map(|s| layout.name(s).to_string()).collect(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    fn segment(&self, id: SegmentId) -> &str {
        self.segments.get(id.index()).map_or("", String::as_str)
    }

    fn event(&mut self, now: SimTime, robot: RobotId, kind: EventKind, detail: String) {
        let row = EventRow::new(now, robot, kind, detail);
        let result = self.writer.write_event(&row);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, moving: usize) {
        let row = TickSummaryRow { tick: tick.0, time_ms: tick.0 * self.tick_ms, moving: moving as u64 };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_route_planned(&mut self, robot: RobotId, path: &[SegmentId], conveyor: Option<SegmentId>, now: SimTime) {
        let detail = path
            .iter()
            .chain(conveyor.iter())
            .map(|&s| self.segment(s))
            .collect::<Vec<_>>()
            .join(" > ");
        self.event(now, robot, EventKind::RoutePlanned, detail);
    }

    fn on_planning_failed(&mut self, robot: RobotId, goal: SegmentId, now: SimTime) {
        let detail = self.segment(goal).to_string();
        self.event(now, robot, EventKind::PlanningFailed, detail);
    }

    fn on_arrival(&mut self, robot: RobotId, location: Option<SegmentId>, now: SimTime) {
        let detail = location.map_or_else(String::new, |s| self.segment(s).to_string());
        self.event(now, robot, EventKind::Arrived, detail);
    }

    fn on_pickup(&mut self, robot: RobotId, _item: ItemId, conveyor: SegmentId, now: SimTime) {
        let detail = self.segment(conveyor).to_string();
        self.event(now, robot, EventKind::PickedUp, detail);
    }

    fn on_drop_off(&mut self, robot: RobotId, _item: ItemId, conveyor: SegmentId, now: SimTime) {
        let detail = self.segment(conveyor).to_string();
        self.event(now, robot, EventKind::DroppedOff, detail);
    }

    fn on_episode_started(&mut self, robot: RobotId, partner: RobotId, now: SimTime) {
        self.event(now, robot, EventKind::EpisodeStarted, partner.instance_name());
    }

    fn on_episode_ended(&mut self, robot: RobotId, now: SimTime) {
        self.event(now, robot, EventKind::EpisodeEnded, String::new());
    }

    fn on_backup_started(&mut self, robot: RobotId, now: SimTime) {
        self.event(now, robot, EventKind::BackupStarted, String::new());
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, layout: &Layout, robots: &RobotStore, items: &ItemStore) {
        let rows = RobotStatusRow::capture(tick, now, layout, robots, items);
        if !rows.is_empty() {
            let result = self.writer.write_status(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
