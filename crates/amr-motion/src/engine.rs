//! The per-tick motion step.

use std::time::Duration;

use amr_core::{CoordinationConfig, MotionConfig, RobotId, SegmentId, SimTime, Vec3};
use amr_fleet::RobotStore;
use amr_reservation::ReservationTable;
use amr_spatial::Layout;
use tracing::{debug, info, trace, warn};

use crate::offsets::{avoidance_offset, bypass_offset, coordinated_offset, episode_complete, lane_offset};
use crate::waypoints::{LegPoints, NextHop, exit_point, final_traversal, finish};
use crate::{Backup, MotionError, MotionProfile, MotionResult, MotionStore, Pose, Vehicle};

/// Shared world state borrowed for one robot's step.
pub struct MotionContext<'a> {
    pub layout:       &'a Layout,
    pub robots:       &'a mut RobotStore,
    pub reservations: &'a mut ReservationTable,
    pub now:          SimTime,
    pub dt:           Duration,
}

/// Notable transitions reported back to the simulator.
#[derive(Clone, Debug, PartialEq)]
pub enum MotionEvent {
    /// Journey finished; `location` is the segment the robot ended on.
    Arrived { robot: RobotId, location: Option<SegmentId> },
    EpisodeEnded { robot: RobotId },
    BackupStarted { robot: RobotId },
}

/// Drives every robot's [`Vehicle`] through its journey.
///
/// # Type parameter
///
/// `V` is the vehicle model.  Tests and the demo use
/// [`KinematicVehicle`][crate::KinematicVehicle]; a host integration
/// supplies its own.
pub struct MotionEngine<V: Vehicle> {
    /// One vehicle per robot, indexed by `RobotId`.
    pub vehicles:     Vec<V>,
    pub store:        MotionStore,
    pub motion:       MotionConfig,
    pub coordination: CoordinationConfig,
}

impl<V: Vehicle> MotionEngine<V> {
    /// # Errors
    ///
    /// [`MotionError::VehicleCount`] unless there is exactly one vehicle per
    /// robot.
    pub fn new(
        vehicles: Vec<V>,
        robot_count: usize,
        motion: MotionConfig,
        coordination: CoordinationConfig,
    ) -> MotionResult<Self> {
        if vehicles.len() != robot_count {
            return Err(MotionError::VehicleCount { robots: robot_count, vehicles: vehicles.len() });
        }
        let store = MotionStore::new(robot_count, motion.conveyor_refresh());
        Ok(Self { vehicles, store, motion, coordination })
    }

    #[inline]
    pub fn vehicle(&self, robot: RobotId) -> &V {
        &self.vehicles[robot.index()]
    }

    #[inline]
    pub fn vehicle_mut(&mut self, robot: RobotId) -> &mut V {
        &mut self.vehicles[robot.index()]
    }

    /// Teleport each vehicle to its robot's pose in `robots`.
    pub fn place_all(&mut self, robots: &RobotStore) {
        for r in robots.ids() {
            let pose = Pose::new(robots.position[r.index()], robots.heading[r.index()]);
            self.vehicles[r.index()].place(pose);
        }
    }

    /// Return every robot to idle at its pose in `robots`.
    pub fn reset(&mut self, robots: &RobotStore) {
        self.store.reset();
        self.place_all(robots);
        let profile = MotionProfile::nominal(&self.motion);
        for v in &mut self.vehicles {
            v.set_profile(profile);
        }
    }

    // ── Journeys ──────────────────────────────────────────────────────────

    /// Start a journey over `path`, ending at `conveyor` if given.  The
    /// caller must already hold leases on `path`.
    ///
    /// # Errors
    ///
    /// [`MotionError::UnknownRobot`] for a robot outside the fleet,
    /// [`MotionError::EmptyJourney`] when there is nothing to drive to.
    pub fn begin_journey(
        &mut self,
        robot: RobotId,
        path: Vec<SegmentId>,
        conveyor: Option<SegmentId>,
        robots: &mut RobotStore,
    ) -> MotionResult<()> {
        if robot.index() >= self.store.len() {
            return Err(MotionError::UnknownRobot(robot));
        }
        if path.is_empty() && conveyor.is_none() {
            return Err(MotionError::EmptyJourney(robot));
        }
        robots.location[robot.index()] = None;
        robots.next_location[robot.index()] = None;
        self.store.planned.insert(robot, path.clone());

        let st = self.store.state_mut(robot);
        st.moving = true;
        st.path = path;
        st.index = 0;
        st.conveyor = conveyor;
        st.elapsed = Duration::ZERO;
        st.command_time = Duration::ZERO;
        st.approach.reset();
        st.invalidate();
        Ok(())
    }

    /// Drop `robot`'s journey and give back its leases.  No-op when idle.
    pub fn abandon(&mut self, robot: RobotId, reservations: &mut ReservationTable) {
        if let Some(planned) = self.store.planned.remove(&robot) {
            reservations.release_route(robot, &planned);
        }
        let st = self.store.state_mut(robot);
        if st.moving {
            debug!(robot = %robot, "journey abandoned");
        }
        st.moving = false;
        st.invalidate();
        self.vehicles[robot.index()].clear_move();
    }

    // ── Per-tick ──────────────────────────────────────────────────────────

    /// Advance `robot`'s state machine by one tick and release leases on
    /// segments it has left behind.
    pub fn step(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>, events: &mut Vec<MotionEvent>) {
        self.check_backup(robot, ctx);
        self.step_journey(robot, ctx, events);
        self.release_passed(robot, ctx);
    }

    /// Run every vehicle for `dt` and copy the resulting poses into
    /// `robots`.
    pub fn drive(&mut self, robots: &mut RobotStore, dt: Duration) {
        for (i, vehicle) in self.vehicles.iter_mut().enumerate() {
            vehicle.step(dt);
            let pose = vehicle.pose();
            robots.position[i] = pose.position;
            robots.heading[i] = pose.heading;
        }
    }

    /// Copy each vehicle's speed cap into the published MaxSpeed.
    pub fn publish_speeds(&self, robots: &mut RobotStore) {
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            robots.max_speed[i] = vehicle.max_speed();
        }
    }

    fn step_journey(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>, events: &mut Vec<MotionEvent>) {
        let st = self.store.state(robot);
        if !st.moving {
            return;
        }
        if st.index >= st.path.len() {
            let (conveyor, last) = (st.conveyor, st.path.last().copied());
            match conveyor {
                Some(conveyor) => self.approach_conveyor(robot, conveyor, ctx, events),
                None => self.finish(robot, last, ctx, events),
            }
            return;
        }
        if self.try_advance(robot, ctx) || self.hold_for_stop(robot, ctx, events) {
            return;
        }
        self.check_episode_exit(robot, ctx, events);
        if !self.store.state(robot).command_issued {
            self.issue_leg(robot, ctx);
        }
        self.track_progress(robot, ctx, events);
    }

    /// Move on to the next segment once the robot is at the exit and can
    /// hop across, or to the conveyor leg once the final pathway's
    /// conveyor-side end is reached.
    fn try_advance(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>) -> bool {
        let i = robot.index();
        let m = &self.motion;
        let st = &self.store.states[i];
        let pos = ctx.robots.position[i];
        let fp = ctx.layout.footprint(st.path[st.index]);

        if let Some(&next) = st.path.get(st.index + 1) {
            let next_fp = ctx.layout.footprint(next);
            let exit = exit_point(fp, NextHop::Pathway(next_fp));
            if pos.planar_distance(exit) >= m.exit_reach {
                return false;
            }
            let can_hop = next_fp.contains(pos) || pos.planar_distance(fp.junction(next_fp)) < m.direct_transition;
            if !can_hop {
                return false;
            }
            let after = st.path.get(st.index + 2).copied().or(st.conveyor);
            ctx.robots.location[i] = Some(next);
            ctx.robots.next_location[i] = after;
            trace!(robot = %robot, segment = %next, t = %ctx.now, "entered segment");

            let st = &mut self.store.states[i];
            st.index += 1;
            st.forced_resumptions = 0;
            st.invalidate();
            return true;
        }

        let Some(conveyor) = st.conveyor else {
            return false;
        };
        let end = fp.nearest_end(ctx.layout.position(conveyor));
        if pos.planar_distance(end) >= m.final_end_reach {
            return false;
        }
        ctx.robots.next_location[i] = Some(conveyor);
        let st = &mut self.store.states[i];
        st.index = st.path.len();
        st.forced_resumptions = 0;
        st.approach.reset();
        st.invalidate();
        true
    }

    /// Apply the stop flag.  Returns `true` while the robot is held.
    ///
    /// A held robot creeps (coordinating) or halts.  The flag is cleared
    /// after `coordination_resume` when a coordination offset is pending, or
    /// after `force_resume` otherwise; repeated forced resumptions without
    /// progress start a backup.
    fn hold_for_stop(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>, events: &mut Vec<MotionEvent>) -> bool {
        let i = robot.index();
        let m = &self.motion;
        let vehicle = &mut self.vehicles[i];
        let st = &mut self.store.states[i];

        if !ctx.robots.stop[i] {
            st.stopped_since = None;
            if vehicle.max_speed() < m.restore_below_speed {
                vehicle.set_max_speed(m.nominal_speed);
            }
            return false;
        }

        let since = *st.stopped_since.get_or_insert(ctx.now);
        let held = ctx.now.saturating_since(since);
        if st.coordinate && held > m.coordination_resume() {
            ctx.robots.stop[i] = false;
            st.stopped_since = None;
            st.invalidate();
            return false;
        }
        if held > m.force_resume() {
            ctx.robots.stop[i] = false;
            st.stopped_since = None;
            st.forced_resumptions += 1;
            st.invalidate();
            debug!(robot = %robot, count = st.forced_resumptions, "forced resumption");
            if st.forced_resumptions >= m.backup_after_forced {
                self.start_backup(robot, ctx, events);
                return true;
            }
            return false;
        }

        if st.coordinate || st.in_coordination {
            vehicle.set_max_speed(m.coordinated_creep_speed);
        } else {
            vehicle.clear_move();
            vehicle.set_max_speed(m.stopped_creep_speed);
        }
        st.invalidate();
        true
    }

    fn start_backup(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>, events: &mut Vec<MotionEvent>) {
        let i = robot.index();
        let m = &self.motion;
        let back = ctx.robots.position[i] - ctx.robots.heading[i] * m.backup_distance;

        let vehicle = &mut self.vehicles[i];
        vehicle.clear_move();
        vehicle.set_max_speed(m.backup_speed);
        vehicle.add_control_point(back);

        let stashed_goal = ctx.robots.target[i].take();
        ctx.robots.next_location[i] = None;
        let st = &mut self.store.states[i];
        if st.in_coordination {
            events.push(MotionEvent::EpisodeEnded { robot });
        }
        st.clear_coordination();
        st.moving = false;
        st.forced_resumptions = 0;
        st.invalidate();
        st.backup = Some(Backup { started: ctx.now, stashed_goal });

        if let Some(planned) = self.store.planned.remove(&robot) {
            ctx.reservations.release_route(robot, &planned);
        }
        warn!(robot = %robot, t = %ctx.now, "backing up to break a stall");
        events.push(MotionEvent::BackupStarted { robot });
    }

    /// Restore speed and target once the backup has run its course.  A
    /// target assigned in the meantime wins over the stashed one.
    fn check_backup(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>) {
        let i = robot.index();
        let st = &mut self.store.states[i];
        let Some(backup) = &st.backup else { return };
        if ctx.now.saturating_since(backup.started) <= self.motion.backup_duration() {
            return;
        }
        let goal = backup.stashed_goal;
        st.backup = None;
        st.stopped_since = None;
        self.vehicles[i].set_max_speed(self.motion.nominal_speed);
        if ctx.robots.target[i].is_none() {
            ctx.robots.target[i] = goal;
        }
        debug!(robot = %robot, t = %ctx.now, "backup finished");
    }

    /// End the episode once its exit criteria hold and re-centre the robot.
    fn check_episode_exit(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>, events: &mut Vec<MotionEvent>) {
        let st = self.store.state(robot);
        if st.stable_offset.is_none() {
            return;
        }
        if !st.in_coordination {
            let st = self.store.state_mut(robot);
            st.stable_offset = None;
            st.invalidate();
            return;
        }
        if !episode_complete(robot, ctx.now, ctx.layout, ctx.robots, &self.store.states, &self.coordination) {
            return;
        }
        let st = self.store.state_mut(robot);
        st.in_coordination = false;
        st.episode_start = None;
        st.stable_offset = None;
        st.invalidate();
        debug!(robot = %robot, t = %ctx.now, "coordination episode ended");
        events.push(MotionEvent::EpisodeEnded { robot });
    }

    fn issue_leg(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>) {
        let i = robot.index();
        let m = &self.motion;
        let st = &self.store.states[i];
        let current = st.path[st.index];
        let next = st.path.get(st.index + 1).copied();
        let conveyor = st.conveyor;
        let fp = ctx.layout.footprint(current);
        let pos = ctx.robots.position[i];

        let points = match (next, conveyor) {
            (None, Some(c)) => {
                let raw = final_traversal(pos, fp, ctx.layout.position(c), m);
                finish(&raw, fp.nearest_end(ctx.layout.position(c)), m)
            }
            _ => {
                let hop = next.map_or(NextHop::None, |n| NextHop::Pathway(ctx.layout.footprint(n)));
                let leg = LegPoints::compute(pos, fp, hop, m);
                finish(&leg.control_points(pos, fp, m), leg.exit, m)
            }
        };

        let offset = self.lateral_offset(robot, current, ctx);
        let vehicle = &mut self.vehicles[i];
        // Keep a collision speed cap across re-issues; creep speeds are dropped.
        let mut profile = MotionProfile::nominal(&self.motion);
        if vehicle.max_speed() >= self.motion.restore_below_speed {
            profile.max_speed = vehicle.max_speed().min(self.motion.nominal_speed);
        }
        vehicle.clear_move();
        vehicle.set_profile(profile);
        for p in points {
            vehicle.add_control_point(p + offset);
        }
        ctx.robots.location[i] = Some(current);
        ctx.robots.next_location[i] = next.or(conveyor);

        let command_time = vehicle.total_time();
        let st = &mut self.store.states[i];
        st.command_issued = true;
        st.elapsed = Duration::ZERO;
        st.command_time = command_time;
    }

    /// Offset for the leg being issued: a fresh coordinated offset, the
    /// episode's stable offset, a one-shot bypass, or the shared-lane
    /// offset, in that order.
    fn lateral_offset(&mut self, robot: RobotId, segment: SegmentId, ctx: &MotionContext<'_>) -> Vec3 {
        let i = robot.index();
        let st = &self.store.states[i];

        if let (true, Some(partner)) = (st.coordinate, st.partner) {
            // Computed once per episode; a repeated critical pass reuses it.
            if let Some(offset) = st.stable_offset {
                let st = &mut self.store.states[i];
                st.coordinate = false;
                st.partner = None;
                return offset;
            }
            let offset = coordinated_offset(
                robot, partner, segment, ctx.layout, ctx.robots, &self.motion, &self.coordination,
            );
            let st = &mut self.store.states[i];
            st.stable_offset = Some(offset);
            st.coordinate = false;
            st.partner = None;
            debug!(robot = %robot, partner = %partner, offset = %offset, "coordinated offset assigned");
            return offset;
        }
        if let Some(offset) = st.stable_offset {
            return offset;
        }
        if st.bypass_target.is_some() {
            self.store.states[i].bypass_target = None;
            return bypass_offset(robot, ctx.layout, ctx.robots, &self.motion, &self.coordination);
        }
        if st.in_coordination {
            return Vec3::ZERO;
        }
        lane_offset(robot, segment, ctx.layout, ctx.robots, &self.store.states, &self.motion)
    }

    /// Count down the command; when its duration has passed without the
    /// geometric advance firing, advance anyway.
    fn track_progress(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>, events: &mut Vec<MotionEvent>) {
        let i = robot.index();
        let st = &mut self.store.states[i];
        if st.elapsed < st.command_time {
            st.elapsed += ctx.dt;
            return;
        }
        st.index += 1;
        st.invalidate();
        if st.index < st.path.len() {
            ctx.robots.location[i] = Some(st.path[st.index]);
            ctx.robots.next_location[i] = st.path.get(st.index + 1).copied().or(st.conveyor);
            return;
        }
        let (conveyor, last) = (st.conveyor, st.path.last().copied());
        match conveyor {
            Some(conveyor) => {
                st.approach.reset();
                ctx.robots.next_location[i] = Some(conveyor);
            }
            None => self.finish(robot, last, ctx, events),
        }
    }

    fn approach_conveyor(
        &mut self,
        robot: RobotId,
        conveyor: SegmentId,
        ctx: &mut MotionContext<'_>,
        events: &mut Vec<MotionEvent>,
    ) {
        let i = robot.index();
        let m = &self.motion;
        let pos = ctx.robots.position[i];
        let dock = ctx.layout.position(conveyor);
        let distance = pos.planar_distance(dock);
        if distance < m.conveyor_arrival {
            self.finish(robot, Some(conveyor), ctx, events);
            return;
        }

        let st = &mut self.store.states[i];
        if st.approach.refresh.is_due(ctx.now) {
            st.invalidate();
        }
        if distance > m.stall_ignore_within {
            if let Some(prev) = st.approach.last_position {
                if pos.planar_distance(prev) < m.stall_displacement {
                    st.approach.stuck_for += ctx.dt;
                    if st.approach.stuck_for > m.stall_window() {
                        debug!(robot = %robot, t = %ctx.now, "conveyor approach stalled, re-issuing");
                        st.approach.stuck_for = Duration::ZERO;
                        st.invalidate();
                    }
                } else {
                    st.approach.stuck_for = Duration::ZERO;
                }
            }
            st.approach.last_position = Some(pos);
        }

        if st.command_issued {
            return;
        }
        let target = (dock + avoidance_offset(robot, ctx.robots, m)).with_z(pos.z);
        let vehicle = &mut self.vehicles[i];
        vehicle.clear_move();
        vehicle.set_max_speed(m.nominal_speed);
        vehicle.add_control_point(target);
        st.command_issued = true;
    }

    fn finish(
        &mut self,
        robot: RobotId,
        location: Option<SegmentId>,
        ctx: &mut MotionContext<'_>,
        events: &mut Vec<MotionEvent>,
    ) {
        let i = robot.index();
        let st = &mut self.store.states[i];
        if st.in_coordination {
            events.push(MotionEvent::EpisodeEnded { robot });
        }
        st.clear_coordination();
        st.moving = false;
        st.forced_resumptions = 0;
        st.stopped_since = None;
        st.invalidate();

        ctx.robots.location[i] = location;
        ctx.robots.next_location[i] = None;
        if let Some(planned) = self.store.planned.remove(&robot) {
            ctx.reservations.release_route(robot, &planned);
        }
        match location {
            Some(seg) => info!(robot = %robot, segment = %ctx.layout.name(seg), t = %ctx.now, "arrived"),
            None => info!(robot = %robot, t = %ctx.now, "journey finished"),
        }
        events.push(MotionEvent::Arrived { robot, location });
    }

    fn release_passed(&mut self, robot: RobotId, ctx: &mut MotionContext<'_>) {
        let (Some(planned), Some(current)) = (self.store.planned.get(&robot), ctx.robots.location[robot.index()])
        else {
            return;
        };
        ctx.reservations.release_passed(robot, planned, current);
    }
}
