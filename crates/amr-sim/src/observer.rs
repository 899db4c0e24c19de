//! Simulation observer trait for progress reporting and data collection.

use amr_core::{ItemId, RobotId, SegmentId, SimTime, Tick};
use amr_fleet::{ItemStore, RobotStore};
use amr_spatial::Layout;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example
///
/// ```rust,ignore
/// struct Arrivals(usize);
///
/// impl SimObserver for Arrivals {
///     fn on_arrival(&mut self, _robot: RobotId, _at: Option<SegmentId>, _now: SimTime) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before commands are applied.
    fn on_tick_start(&mut self, _tick: Tick, _now: SimTime) {}

    /// Called at the end of each tick.  `moving` is the number of robots
    /// on a journey once the tick's vehicles have been driven.
    fn on_tick_end(&mut self, _tick: Tick, _moving: usize) {}

    /// A route was found and leased.  `path` holds the traversable
    /// segments; `conveyor` is the terminal conveyor, if any.
    fn on_route_planned(
        &mut self,
        _robot:    RobotId,
        _path:     &[SegmentId],
        _conveyor: Option<SegmentId>,
        _now:      SimTime,
    ) {}

    /// No route to `goal`, or its leases were refused.  The robot stops and
    /// retries next tick.
    fn on_planning_failed(&mut self, _robot: RobotId, _goal: SegmentId, _now: SimTime) {}

    fn on_arrival(&mut self, _robot: RobotId, _location: Option<SegmentId>, _now: SimTime) {}

    fn on_pickup(&mut self, _robot: RobotId, _item: ItemId, _conveyor: SegmentId, _now: SimTime) {}

    fn on_drop_off(&mut self, _robot: RobotId, _item: ItemId, _conveyor: SegmentId, _now: SimTime) {}

    fn on_episode_started(&mut self, _robot: RobotId, _partner: RobotId, _now: SimTime) {}

    fn on_episode_ended(&mut self, _robot: RobotId, _now: SimTime) {}

    fn on_backup_started(&mut self, _robot: RobotId, _now: SimTime) {}

    /// Called at snapshot intervals (every `sim.output_interval_ticks` ticks).
    ///
    /// Provides read-only access to the fleet and cargo so output writers can
    /// record a status row without the sim knowing about any output format.
    fn on_snapshot(
        &mut self,
        _tick:   Tick,
        _now:    SimTime,
        _layout: &Layout,
        _robots: &RobotStore,
        _items:  &ItemStore,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
