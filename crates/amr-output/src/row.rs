//! Plain data row types written by output backends.

use amr_core::{RobotId, SimTime, Tick};
use amr_fleet::{ItemStore, RobotStore};
use amr_spatial::Layout;

/// One robot's externally visible state at a snapshot tick.
///
/// Segment and item references are written by name; an empty string means
/// none.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotStatusRow {
    pub tick:          u64,
    pub time_ms:       u64,
    /// Host instance name, e.g. `Mobile Robot Resource #2`.
    pub robot:         String,
    pub x:             f64,
    pub y:             f64,
    /// Heading in degrees, 0° = +x.
    pub heading:       f64,
    pub location:      String,
    pub next_location: String,
    pub target:        String,
    pub stop:          bool,
    pub max_speed:     f64,
    pub carried:       String,
    pub battery:       i32,
    pub priority:      i32,
}

impl RobotStatusRow {
    /// Snapshot every robot in `robots`, in index order.
    pub fn capture(tick: Tick, now: SimTime, layout: &Layout, robots: &RobotStore, items: &ItemStore) -> Vec<Self> {
        let segment = |s: Option<amr_core::SegmentId>| s.map_or_else(String::new, |s| layout.name(s).to_string());
        robots
            .ids()
            .map(|r| {
                let i = r.index();
                let pos = robots.position[i];
                RobotStatusRow {
                    tick:          tick.0,
                    time_ms:       now.as_millis(),
                    robot:         r.instance_name(),
                    x:             pos.x,
                    y:             pos.y,
                    heading:       robots.heading[i].heading_deg(),
                    location:      segment(robots.location[i]),
                    next_location: segment(robots.next_location[i]),
                    target:        segment(robots.target[i]),
                    stop:          robots.stop[i],
                    max_speed:     robots.max_speed[i],
                    carried:       robots.carried[i].map_or_else(String::new, |it| items.name(it).to_string()),
                    battery:       robots.battery[i],
                    priority:      robots.priority[i],
                }
            })
            .collect()
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:    u64,
    pub time_ms: u64,
    /// Robots with an active journey at the end of the tick.
    pub moving:  u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RoutePlanned,
    PlanningFailed,
    Arrived,
    PickedUp,
    DroppedOff,
    EpisodeStarted,
    EpisodeEnded,
    BackupStarted,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RoutePlanned   => "route_planned",
            EventKind::PlanningFailed => "planning_failed",
            EventKind::Arrived        => "arrived",
            EventKind::PickedUp       => "picked_up",
            EventKind::DroppedOff     => "dropped_off",
            EventKind::EpisodeStarted => "episode_started",
            EventKind::EpisodeEnded   => "episode_ended",
            EventKind::BackupStarted  => "backup_started",
        }
    }
}

/// One fleet event.  `detail` names the segment, item, or partner involved.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub time_ms: u64,
    pub robot:   String,
    pub kind:    EventKind,
    pub detail:  String,
}

impl EventRow {
    pub fn new(now: SimTime, robot: RobotId, kind: EventKind, detail: impl Into<String>) -> Self {
        Self { time_ms: now.as_millis(), robot: robot.instance_name(), kind, detail: detail.into() }
    }
}
