//! Per-robot motion state.

use std::time::Duration;

use amr_core::{Cadence, RobotId, SegmentId, SimTime, Vec3};

/// Deadlock recovery in progress: the robot is reversing and its target is
/// parked until `started + backup_ms`.
#[derive(Clone, Debug, PartialEq)]
pub struct Backup {
    pub started:      SimTime,
    pub stashed_goal: Option<SegmentId>,
}

/// Displacement watchdog and refresh cadence for the conveyor approach leg.
#[derive(Clone, Debug)]
pub struct ApproachWatch {
    pub last_position: Option<Vec3>,
    /// Time accumulated while moving less than the stall displacement per tick.
    pub stuck_for:     Duration,
    pub refresh:       Cadence,
}

impl ApproachWatch {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { last_position: None, stuck_for: Duration::ZERO, refresh: Cadence::new(refresh_interval) }
    }

    pub fn reset(&mut self) {
        self.last_position = None;
        self.stuck_for = Duration::ZERO;
        self.refresh.reset();
    }
}

/// Everything the motion engine tracks for one robot between ticks.
///
/// A robot is **Idle** when `!moving`.  While moving, `index` walks through
/// `path`; `index == path.len()` means the pathway legs are done and the
/// robot is approaching `conveyor` (or finishing, if there is none).  The
/// stop, coordination, and backup fields overlay that progression.
#[derive(Clone, Debug)]
pub struct MotionState {
    pub moving:             bool,
    pub path:               Vec<SegmentId>,
    pub index:              usize,
    pub conveyor:           Option<SegmentId>,

    /// A vehicle command for the current leg is in force.  Cleared to
    /// request re-issue on the next step.
    pub command_issued:     bool,
    pub elapsed:            Duration,
    /// Vehicle-reported duration of the current command.
    pub command_time:       Duration,

    // ── Coordination ──────────────────────────────────────────────────────
    /// Set by the collision engine: compute a fresh coordinated offset.
    pub coordinate:         bool,
    pub partner:            Option<RobotId>,
    pub in_coordination:    bool,
    pub episode_start:      Option<SimTime>,
    /// Offset held for the whole episode.
    pub stable_offset:      Option<Vec3>,
    pub bypass_target:      Option<RobotId>,

    // ── Stop handling ─────────────────────────────────────────────────────
    pub stopped_since:      Option<SimTime>,
    pub forced_resumptions: u32,
    pub backup:             Option<Backup>,

    pub approach:           ApproachWatch,
}

impl MotionState {
    /// An idle robot with no journey.
    pub fn idle(refresh_interval: Duration) -> Self {
        Self {
            moving:             false,
            path:               Vec::new(),
            index:              0,
            conveyor:           None,
            command_issued:     false,
            elapsed:            Duration::ZERO,
            command_time:       Duration::ZERO,
            coordinate:         false,
            partner:            None,
            in_coordination:    false,
            episode_start:      None,
            stable_offset:      None,
            bypass_target:      None,
            stopped_since:      None,
            forced_resumptions: 0,
            backup:             None,
            approach:           ApproachWatch::new(refresh_interval),
        }
    }

    /// Current pathway, if the robot is still on a pathway leg.
    #[inline]
    pub fn current(&self) -> Option<SegmentId> {
        if self.moving { self.path.get(self.index).copied() } else { None }
    }

    #[inline]
    pub fn is_backing_up(&self) -> bool {
        self.backup.is_some()
    }

    /// Request a fresh vehicle command on the next step.
    #[inline]
    pub fn invalidate(&mut self) {
        self.command_issued = false;
    }

    /// Drop every coordination marker, ending any episode.
    pub fn clear_coordination(&mut self) {
        self.coordinate = false;
        self.partner = None;
        self.in_coordination = false;
        self.episode_start = None;
        self.stable_offset = None;
        self.bypass_target = None;
    }
}
