//! The external command channel.
//!
//! A [`Controller`] stands in for the plant controller that writes robot
//! properties.  Each tick the sim asks it for [`Command`]s and applies them
//! before any robot is processed.

use std::collections::{BTreeMap, BTreeSet};

use amr_core::{RobotId, SegmentId, SegmentKind, SimTime, Tick};
use amr_fleet::{ItemStore, RobotRngs, RobotStore};
use amr_motion::MotionStore;
use amr_spatial::Layout;

// ── Command ───────────────────────────────────────────────────────────────────

/// One write to a robot's controller-owned properties.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replace the target.  A robot already on a journey abandons it.
    SetTarget { robot: RobotId, target: Option<SegmentId> },
    SetPriority { robot: RobotId, priority: i32 },
    /// Holds only until the next collision pass rewrites the flag.
    SetStop { robot: RobotId, stop: bool },
    SetBattery { robot: RobotId, level: i32 },
}

impl Command {
    pub fn robot(&self) -> RobotId {
        match *self {
            Command::SetTarget { robot, .. }
            | Command::SetPriority { robot, .. }
            | Command::SetStop { robot, .. }
            | Command::SetBattery { robot, .. } => robot,
        }
    }
}

// ── Controller trait ──────────────────────────────────────────────────────────

/// Read-only view handed to a [`Controller`].
pub struct ControlContext<'a> {
    pub tick:   Tick,
    pub now:    SimTime,
    pub layout: &'a Layout,
    pub robots: &'a RobotStore,
    pub items:  &'a ItemStore,
    pub motion: &'a MotionStore,
}

pub trait Controller {
    /// Commands to apply this tick, in order.  Random choices draw from the
    /// robot's own stream in `rngs`.
    fn commands(&mut self, ctx: &ControlContext<'_>, rngs: &mut RobotRngs) -> Vec<Command>;
}

/// Never issues a command.
pub struct NoopController;

impl Controller for NoopController {
    fn commands(&mut self, _ctx: &ControlContext<'_>, _rngs: &mut RobotRngs) -> Vec<Command> {
        Vec::new()
    }
}

// ── ScriptedController ────────────────────────────────────────────────────────

/// Replays commands at fixed ticks.  Commands scheduled for a tick that has
/// already passed are issued on the next call.
#[derive(Default)]
pub struct ScriptedController {
    script: BTreeMap<Tick, Vec<Command>>,
}

impl ScriptedController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, tick: Tick, command: Command) -> Self {
        self.push(tick, command);
        self
    }

    pub fn push(&mut self, tick: Tick, command: Command) {
        self.script.entry(tick).or_default().push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl Controller for ScriptedController {
    fn commands(&mut self, ctx: &ControlContext<'_>, _rngs: &mut RobotRngs) -> Vec<Command> {
        let later = self.script.split_off(&ctx.tick.offset(1));
        let due = std::mem::replace(&mut self.script, later);
        due.into_values().flatten().collect()
    }
}

// ── RandomDispatcher ──────────────────────────────────────────────────────────

/// Idle-location name reserved for `robot`: `"Idle Location"` for robot 1,
/// `"Idle Location #N"` otherwise.
pub fn idle_location_name(robot: RobotId) -> String {
    match robot.number() {
        1 => "Idle Location".to_string(),
        n => format!("Idle Location #{n}"),
    }
}

/// Job dispatcher for demos.
///
/// - An input conveyor with an unowned item waiting, and no robot already
///   sent there, gets the closest available robot (idle or parked, empty).
/// - A robot carrying an item with no target, or still targeting an input
///   conveyor, is sent to a random output conveyor.
/// - An empty robot left at an output conveyor returns to its idle location.
pub struct RandomDispatcher {
    /// Items farther than this from an input conveyor are not waiting there.
    pub pickup_radius: f64,
}

impl Default for RandomDispatcher {
    fn default() -> Self {
        Self { pickup_radius: 8_000.0 }
    }
}

impl RandomDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pickup_radius(mut self, radius: f64) -> Self {
        self.pickup_radius = radius;
        self
    }

    fn is_available(ctx: &ControlContext<'_>, robot: RobotId) -> bool {
        let i = robot.index();
        let st = ctx.motion.state(robot);
        let parked = match ctx.robots.target[i] {
            None => true,
            Some(t) => ctx.layout.kind(t) == SegmentKind::IdleLocation,
        };
        parked && !st.moving && !st.is_backing_up() && !ctx.robots.is_carrying(robot)
    }

    fn idle_location(ctx: &ControlContext<'_>, robot: RobotId) -> Option<SegmentId> {
        ctx.layout.lookup(&idle_location_name(robot)).or_else(|| {
            let pos = ctx.robots.position[robot.index()];
            ctx.layout
                .of_kind(SegmentKind::IdleLocation)
                .min_by(|&a, &b| {
                    let da = ctx.layout.position(a).planar_distance(pos);
                    let db = ctx.layout.position(b).planar_distance(pos);
                    da.total_cmp(&db)
                })
        })
    }
}

impl Controller for RandomDispatcher {
    fn commands(&mut self, ctx: &ControlContext<'_>, rngs: &mut RobotRngs) -> Vec<Command> {
        let mut out = Vec::new();
        let mut assigned = BTreeSet::new();

        for conveyor in ctx.layout.of_kind(SegmentKind::InputConveyor) {
            let dock = ctx.layout.position(conveyor);
            if ctx.items.nearest_unowned(dock, self.pickup_radius).is_none() {
                continue;
            }
            let already_sent = ctx
                .robots
                .ids()
                .any(|r| ctx.robots.target[r.index()] == Some(conveyor) && !ctx.robots.is_carrying(r));
            if already_sent {
                continue;
            }
            let closest = ctx
                .robots
                .ids()
                .filter(|&r| !assigned.contains(&r) && Self::is_available(ctx, r))
                .min_by(|&a, &b| {
                    let da = ctx.robots.position[a.index()].planar_distance(dock);
                    let db = ctx.robots.position[b.index()].planar_distance(dock);
                    da.total_cmp(&db)
                });
            if let Some(robot) = closest {
                assigned.insert(robot);
                out.push(Command::SetTarget { robot, target: Some(conveyor) });
            }
        }

        let outputs: Vec<SegmentId> = ctx.layout.of_kind(SegmentKind::OutputConveyor).collect();
        for robot in ctx.robots.ids().filter(|r| !assigned.contains(r)) {
            let i = robot.index();
            let target = ctx.robots.target[i];
            if ctx.robots.is_carrying(robot) {
                let needs_drop = target.is_none_or(|t| ctx.layout.kind(t) == SegmentKind::InputConveyor);
                if needs_drop {
                    if let Some(&drop) = rngs.get_mut(robot).choose(&outputs) {
                        out.push(Command::SetTarget { robot, target: Some(drop) });
                    }
                }
                continue;
            }
            let at_output = ctx.robots.location[i].is_some_and(|l| ctx.layout.kind(l) == SegmentKind::OutputConveyor);
            if at_output && target.is_none() && !ctx.motion.is_moving(robot) {
                if let Some(idle) = Self::idle_location(ctx, robot) {
                    out.push(Command::SetTarget { robot, target: Some(idle) });
                }
            }
        }
        out
    }
}
