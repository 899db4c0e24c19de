//! Fleet configuration.
//!
//! Every tunable distance (layout units), speed (units per second), and time
//! span (milliseconds) used by the simulator lives here, grouped by the
//! subsystem that reads it.  Defaults reproduce the reference factory cell.
//!
//! Typically loaded from a JSON file by the application crate (feature
//! `serde`); missing fields take their defaults.

use std::time::Duration;

use crate::{AmrError, AmrResult, SimClock};

#[inline]
fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

// ── FleetConfig ───────────────────────────────────────────────────────────────

/// Top-level configuration passed to `SimBuilder`.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    pub sim:          SimConfig,
    pub planner:      PlannerConfig,
    pub reservation:  ReservationConfig,
    pub motion:       MotionConfig,
    pub coordination: CoordinationConfig,
    pub cargo:        CargoConfig,
}

impl FleetConfig {
    /// Reject settings the tick loop cannot run with.
    ///
    /// # Errors
    ///
    /// [`AmrError::Config`] naming the first offending field.
    pub fn validate(&self) -> AmrResult<()> {
        let err = |msg: &str| Err(AmrError::Config(msg.to_string()));
        if self.sim.tick_ms == 0 {
            return err("sim.tick_ms must be positive");
        }
        if self.sim.collision_interval_ms == 0 {
            return err("sim.collision_interval_ms must be positive");
        }
        if self.sim.max_robots == 0 {
            return err("sim.max_robots must be positive");
        }
        if self.motion.nominal_speed <= 0.0 {
            return err("motion.nominal_speed must be positive");
        }
        if self.planner.max_adjacency <= 0.0 {
            return err("planner.max_adjacency must be positive");
        }
        Ok(())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Order in which robots are processed within a tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IterationOrder {
    /// Ascending robot index every tick.
    #[default]
    Fixed,
    /// The first robot processed advances by one slot each tick.
    Rotating,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated milliseconds per control-loop tick.
    pub tick_ms:               u32,
    /// Period of the collision and coordination pass.
    pub collision_interval_ms: u64,
    /// Total ticks to simulate.
    pub total_ticks:           u64,
    /// Master RNG seed for dispatchers and spawn jitter.
    pub seed:                  u64,
    /// Upper bound on the declared robot quantity.
    pub max_robots:            usize,
    /// Emit a status snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
    /// Attempts made while waiting for the declared robot quantity.
    pub startup_attempts:      u32,
    /// Wait between startup attempts.
    pub startup_retry_ms:      u64,
    /// Settle time after the fleet is spawned before the loop starts.
    pub startup_settle_ms:     u64,
    pub iteration_order:       IterationOrder,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms:               100,
            collision_interval_ms: 300,
            total_ticks:           6_000,
            seed:                  0,
            max_robots:            15,
            output_interval_ticks: 10,
            startup_attempts:      50,
            startup_retry_ms:      100,
            startup_settle_ms:     2_000,
            iteration_order:       IterationOrder::Fixed,
        }
    }
}

impl SimConfig {
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_ms)
    }

    pub fn tick(&self) -> Duration {
        ms(self.tick_ms as u64)
    }

    pub fn collision_interval(&self) -> Duration {
        ms(self.collision_interval_ms)
    }
}

// ── PlannerConfig ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Two segments are adjacent when their centers are at most this far apart.
    pub max_adjacency:      f64,
    /// A segment on another robot's route is skipped while that robot is
    /// within this distance of it.
    pub conflict_radius:    f64,
    /// Robots within this distance of a candidate add `density_penalty`.
    pub density_radius:     f64,
    pub density_penalty:    f64,
    /// Added per other robot whose next location is the candidate.
    pub contention_penalty: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_adjacency:      12_000.0,
            conflict_radius:    2_000.0,
            density_radius:     2_000.0,
            density_penalty:    500.0,
            contention_penalty: 1_000.0,
        }
    }
}

// ── ReservationConfig ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReservationConfig {
    /// Lease on the first segment of a route.
    pub base_lease_ms:    u64,
    /// Extra lease per position further along the route.
    pub per_hop_lease_ms: u64,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self { base_lease_ms: 5_000, per_hop_lease_ms: 1_000 }
    }
}

impl ReservationConfig {
    /// Lease for the segment at `position` within a route.
    pub fn lease_for_hop(&self, position: usize) -> Duration {
        ms(self.base_lease_ms + self.per_hop_lease_ms * position as u64)
    }
}

// ── MotionConfig ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Speed cap restored whenever no reduction applies.
    pub nominal_speed:            f64,
    pub acceleration:             f64,
    pub deceleration:             f64,
    pub interpolation:            f64,

    /// Distance to the exit point at which a segment counts as completed.
    pub exit_reach:               f64,
    /// Junction distance under which a direct hop to the next segment is allowed.
    pub direct_transition:        f64,
    /// Distance to the conveyor-side end that completes the final pathway.
    pub final_end_reach:          f64,
    /// Final axis point appended only if farther than this from the last sample.
    pub final_end_append:         f64,
    /// Samples taken along the final pathway axis.
    pub final_axis_samples:       usize,
    pub conveyor_arrival:         f64,

    /// Control points closer than this to the previous one are dropped.
    pub dedup_spacing:            f64,
    /// Cosine below which entry→exit counts as a turn.
    pub turn_cosine:              f64,
    /// Minimum entry→exit travel for an intermediate point.
    pub turn_min_travel:          f64,
    /// Intermediate point position as a fraction of entry→exit.
    pub turn_fraction:            f64,
    /// Intermediate point pull toward the segment center.
    pub turn_center_pull:         f64,
    /// An inside-segment intermediate is kept only below this detour ratio.
    pub turn_detour_ratio:        f64,
    /// The entry point is skipped when the exit is nearer than this ratio.
    pub skip_entry_ratio:         f64,

    /// Stop duration after which a coordinating robot resumes.
    pub coordination_resume_ms:   u64,
    /// Stop duration after which any robot is forced to resume.
    pub force_resume_ms:          u64,
    /// Speed while stopped but coordinating.
    pub coordinated_creep_speed:  f64,
    /// Speed while stopped outside coordination.
    pub stopped_creep_speed:      f64,
    /// Below this the nominal cap is restored once the stop clears.
    pub restore_below_speed:      f64,

    /// Per-tick displacement under which conveyor approach counts as stuck.
    pub stall_displacement:       f64,
    /// Accumulated stuck time that forces a command re-issue.
    pub stall_window_ms:          u64,
    /// Watchdog is disabled within this distance of the conveyor.
    pub stall_ignore_within:      f64,
    /// Conveyor approach command refresh period.
    pub conveyor_refresh_ms:      u64,

    /// Consecutive forced resumptions that trigger a backup manoeuvre.
    pub backup_after_forced:      u32,
    pub backup_distance:          f64,
    pub backup_speed:             f64,
    pub backup_ms:                u64,

    /// Lane spacing for robots sharing a pathway outside coordination.
    pub lane_spacing:             f64,
    pub lane_compression:         f64,
    /// Lane spacing applied during a coordination episode.
    pub coordinated_lane_spacing: f64,
    /// Lateral distance of a bypass detour.
    pub bypass_distance:          f64,
    /// Initial forward clearance assumed when comparing bypass sides.
    pub bypass_clearance_start:   f64,
    /// Robots farther than this laterally do not limit bypass clearance.
    pub bypass_lateral_window:    f64,
    /// Repulsion radius when approaching a conveyor.
    pub avoidance_radius:         f64,
    pub avoidance_max_offset:     f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            nominal_speed:            800.0,
            acceleration:             300.0,
            deceleration:             300.0,
            interpolation:            0.15,

            exit_reach:               800.0,
            direct_transition:        1_200.0,
            final_end_reach:          600.0,
            final_end_append:         100.0,
            final_axis_samples:       6,
            conveyor_arrival:         1_500.0,

            dedup_spacing:            600.0,
            turn_cosine:              0.6,
            turn_min_travel:          2_000.0,
            turn_fraction:            0.3,
            turn_center_pull:         200.0,
            turn_detour_ratio:        1.2,
            skip_entry_ratio:         0.7,

            coordination_resume_ms:   200,
            force_resume_ms:          800,
            coordinated_creep_speed:  200.0,
            stopped_creep_speed:      50.0,
            restore_below_speed:      400.0,

            stall_displacement:       50.0,
            stall_window_ms:          2_000,
            stall_ignore_within:      200.0,
            conveyor_refresh_ms:      1_000,

            backup_after_forced:      3,
            backup_distance:          1_000.0,
            backup_speed:             400.0,
            backup_ms:                2_000,

            lane_spacing:             1_200.0,
            lane_compression:         0.8,
            coordinated_lane_spacing: 1_500.0,
            bypass_distance:          1_200.0,
            bypass_clearance_start:   5_000.0,
            bypass_lateral_window:    2_000.0,
            avoidance_radius:         1_000.0,
            avoidance_max_offset:     300.0,
        }
    }
}

impl MotionConfig {
    pub fn coordination_resume(&self) -> Duration {
        ms(self.coordination_resume_ms)
    }

    pub fn force_resume(&self) -> Duration {
        ms(self.force_resume_ms)
    }

    pub fn stall_window(&self) -> Duration {
        ms(self.stall_window_ms)
    }

    pub fn conveyor_refresh(&self) -> Duration {
        ms(self.conveyor_refresh_ms)
    }

    pub fn backup_duration(&self) -> Duration {
        ms(self.backup_ms)
    }
}

// ── CoordinationConfig ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoordinationConfig {
    /// Outer encounter radius; pairs farther apart are ignored.
    pub early_zone:               f64,
    pub coordination_zone:        f64,
    pub critical_zone:            f64,
    /// Critical radius while the robot is crossing a segment junction.
    pub critical_zone_transition: f64,
    /// Junction distance that counts as being in a transition zone.
    pub transition_zone:          f64,
    /// Range at which a stationary robot becomes an obstacle.
    pub stationary_range:         f64,
    /// Direction cosine under which an approach is head-on.
    pub head_on_cosine:           f64,

    pub head_on_coordination_speed:  f64,
    pub crossing_coordination_speed: f64,
    pub head_on_early_speed:         f64,
    pub crossing_early_speed:        f64,
    pub obstacle_speed:              f64,
    pub obstacle_conveyor_speed:     f64,

    /// A next location this close that is not reservable stops the robot.
    pub reservation_guard:        f64,
    /// A conveyor next location this close marks the robot as docking.
    pub conveyor_approach:        f64,
    pub robot_radius:             f64,

    /// Minimum episode length before the offset can be released.
    pub min_episode_ms:           u64,
    pub safe_distance:            f64,
    pub intersection_safe_distance: f64,
    /// Radius used to count nearby footprints when detecting intersections.
    pub intersection_radius:      f64,
    /// More than this many footprints within the radius is an intersection.
    pub intersection_footprints:  usize,
    /// Direction cosine under which a robot is still closing head-on.
    pub closing_cosine:           f64,
    /// Safe distance multiplier applied to closing robots.
    pub closing_buffer:           f64,
    /// Offset multiplier at intersections.
    pub intersection_offset_gain: f64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            early_zone:               5_000.0,
            coordination_zone:        4_000.0,
            critical_zone:            2_500.0,
            critical_zone_transition: 3_000.0,
            transition_zone:          2_000.0,
            stationary_range:         2_500.0,
            head_on_cosine:           -0.5,

            head_on_coordination_speed:  0.5,
            crossing_coordination_speed: 0.6,
            head_on_early_speed:         0.7,
            crossing_early_speed:        0.8,
            obstacle_speed:              0.8,
            obstacle_conveyor_speed:     0.6,

            reservation_guard:        1_200.0,
            conveyor_approach:        3_000.0,
            robot_radius:             600.0,

            min_episode_ms:           4_000,
            safe_distance:            4_500.0,
            intersection_safe_distance: 5_500.0,
            intersection_radius:      3_000.0,
            intersection_footprints:  2,
            closing_cosine:           -0.3,
            closing_buffer:           1.2,
            intersection_offset_gain: 1.5,
        }
    }
}

impl CoordinationConfig {
    pub fn min_episode(&self) -> Duration {
        ms(self.min_episode_ms)
    }
}

// ── CargoConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CargoConfig {
    /// Items farther than this from the input conveyor are not candidates.
    pub pickup_radius: f64,
    /// The robot must be this close to the conveyor to pick up.
    pub dock_range:    f64,
    /// Items trail this far behind the robot while carried.
    pub trail:         f64,
    /// Items ride this high above the robot's origin.
    pub lift:          f64,
}

impl Default for CargoConfig {
    fn default() -> Self {
        Self { pickup_radius: 8_000.0, dock_range: 2_000.0, trail: 600.0, lift: 200.0 }
    }
}
