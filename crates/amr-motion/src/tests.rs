//! Unit tests for amr-motion.

use std::time::Duration;

use amr_core::{
    CoordinationConfig, Footprint, MotionConfig, ReservationConfig, RobotId, SegmentId, SegmentKind, SimTime, Vec3,
};
use amr_fleet::{RobotStore, RobotStoreBuilder};
use amr_reservation::ReservationTable;
use amr_spatial::{Layout, LayoutBuilder};

use crate::offsets::{
    avoidance_offset, bypass_offset, coordinated_offset, episode_complete, lane_offset, movement_direction,
};
use crate::waypoints::{LegPoints, NextHop, dedup, exit_point, final_traversal, intermediate_point, thin};
use crate::{
    KinematicVehicle, MotionContext, MotionEngine, MotionError, MotionEvent, MotionProfile, MotionStore, Pose,
    Vehicle,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const R0: RobotId = RobotId(0);
const R1: RobotId = RobotId(1);
const P1: SegmentId = SegmentId(0);
const P2: SegmentId = SegmentId(1);
const P3: SegmentId = SegmentId(2);
const DOCK: SegmentId = SegmentId(3);

/// Three 4000-long pathways along +x centered every 6000, then a conveyor
/// beyond the third one.
fn corridor() -> Layout {
    let mut b = LayoutBuilder::new();
    for i in 0..3 {
        b.add_pathway(&format!("Pathway Area #{}", i + 1), Vec3::planar(i as f64 * 6000.0, 0.0), 0.0, 4000.0, 1000.0)
            .unwrap();
    }
    b.add_conveyor("Conveyor Input", SegmentKind::InputConveyor, Vec3::planar(17_000.0, 0.0), 0.0, 2000.0, 600.0, 700.0)
        .unwrap();
    b.build()
}

fn strip() -> Footprint {
    Footprint::new(Vec3::ZERO, Vec3::planar(1.0, 0.0), 2000.0, 2000.0, 1000.0, 1000.0)
}

fn fleet(positions: &[Vec3]) -> RobotStore {
    let mut b = RobotStoreBuilder::new(positions.len(), 0);
    for (i, &p) in positions.iter().enumerate() {
        b = b.pose(i, p, 0.0);
    }
    b.build().unwrap().0
}

fn kinematic(robots: &RobotStore) -> Vec<KinematicVehicle> {
    let profile = MotionProfile::nominal(&MotionConfig::default());
    robots
        .ids()
        .map(|r| KinematicVehicle::new(Pose::new(robots.position[r.index()], robots.heading[r.index()]), profile))
        .collect()
}

struct World {
    layout: Layout,
    robots: RobotStore,
    table:  ReservationTable,
    engine: MotionEngine<KinematicVehicle>,
    now:    SimTime,
    events: Vec<MotionEvent>,
}

const DT: Duration = Duration::from_millis(100);

impl World {
    fn new(positions: &[Vec3]) -> Self {
        let robots = fleet(positions);
        let engine = MotionEngine::new(
            kinematic(&robots),
            robots.count,
            MotionConfig::default(),
            CoordinationConfig::default(),
        )
        .unwrap();
        Self {
            layout: corridor(),
            robots,
            table: ReservationTable::new(),
            engine,
            now: SimTime::ZERO,
            events: Vec::new(),
        }
    }

    fn start(&mut self, robot: RobotId, path: Vec<SegmentId>, conveyor: Option<SegmentId>) {
        assert!(self.table.reserve_route(&path, robot, self.now, &ReservationConfig::default()));
        self.robots.target[robot.index()] = conveyor.or(path.last().copied());
        self.engine.begin_journey(robot, path, conveyor, &mut self.robots).unwrap();
    }

    fn tick(&mut self) {
        for r in self.robots.ids().collect::<Vec<_>>() {
            let mut ctx = MotionContext {
                layout:       &self.layout,
                robots:       &mut self.robots,
                reservations: &mut self.table,
                now:          self.now,
                dt:           DT,
            };
            self.engine.step(r, &mut ctx, &mut self.events);
        }
        self.engine.drive(&mut self.robots, DT);
        self.now = self.now + DT;
    }

    /// Tick until `robot` stops moving; returns the number of ticks taken.
    fn run_until_idle(&mut self, robot: RobotId, max_ticks: usize) -> usize {
        for n in 0..max_ticks {
            if !self.engine.store.is_moving(robot) {
                return n;
            }
            self.tick();
        }
        panic!("robot {robot} still moving after {max_ticks} ticks");
    }
}

// ── KinematicVehicle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicle {
    use super::*;

    fn at_origin() -> KinematicVehicle {
        KinematicVehicle::new(
            Pose::new(Vec3::ZERO, Vec3::planar(1.0, 0.0)),
            MotionProfile::nominal(&MotionConfig::default()),
        )
    }

    #[test]
    fn trapezoidal_total_time() {
        let mut v = at_origin();
        v.add_control_point(Vec3::planar(10_000.0, 0.0));
        // 2 × 800/300 s ramping plus the cruise remainder at 800.
        let expected = 2.0 * 800.0 / 300.0 + (10_000.0 - 2.0 * 640_000.0 / 600.0) / 800.0;
        assert!((v.total_time().as_secs_f64() - expected).abs() < 1e-6);
    }

    #[test]
    fn short_hop_never_reaches_cap() {
        let mut v = at_origin();
        v.add_control_point(Vec3::planar(600.0, 0.0));
        let peak = (2.0_f64 * 600.0 * 300.0 * 300.0 / 600.0).sqrt();
        assert!((v.total_time().as_secs_f64() - 2.0 * peak / 300.0).abs() < 1e-6);
    }

    #[test]
    fn empty_queue_takes_no_time() {
        assert_eq!(at_origin().total_time(), Duration::ZERO);
    }

    #[test]
    fn drives_through_all_points_and_stops() {
        let mut v = at_origin();
        v.add_control_point(Vec3::planar(3000.0, 0.0));
        v.add_control_point(Vec3::planar(3000.0, 2000.0));
        for _ in 0..200 {
            v.step(DT);
        }
        assert!(v.is_idle());
        assert_eq!(v.pose().position, Vec3::planar(3000.0, 2000.0));
        assert!((v.pose().heading.y - 1.0).abs() < 1e-9);
        assert_eq!(v.speed(), 0.0);
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let mut v = at_origin();
        v.set_max_speed(200.0);
        v.add_control_point(Vec3::planar(50_000.0, 0.0));
        for _ in 0..50 {
            v.step(DT);
            assert!(v.speed() <= 200.0 + 1e-9);
        }
    }

    #[test]
    fn zero_cap_holds_position() {
        let mut v = at_origin();
        v.set_max_speed(0.0);
        v.add_control_point(Vec3::planar(1000.0, 0.0));
        v.step(DT);
        assert_eq!(v.pose().position, Vec3::ZERO);
        assert_eq!(v.total_time(), Duration::MAX);
    }

    #[test]
    fn clear_and_place() {
        let mut v = at_origin();
        v.add_control_point(Vec3::planar(1000.0, 0.0));
        v.clear_move();
        assert!(v.is_idle());
        v.add_control_point(Vec3::planar(1000.0, 0.0));
        v.place(Pose::new(Vec3::planar(5.0, 5.0), Vec3::planar(0.0, 1.0)));
        assert!(v.is_idle());
        assert_eq!(v.pose().position, Vec3::planar(5.0, 5.0));
    }
}

// ── Waypoints ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod waypoints {
    use super::*;

    #[test]
    fn exit_toward_next_pathway_is_on_facing_cap() {
        let next = Footprint::new(Vec3::planar(6000.0, 0.0), Vec3::planar(1.0, 0.0), 2000.0, 2000.0, 1000.0, 1000.0);
        let exit = exit_point(&strip(), NextHop::Pathway(&next));
        assert!((exit.x - 2000.0).abs() < 1e-9);
        assert!(exit.y.abs() <= 500.0 + 1e-9);
    }

    #[test]
    fn exit_toward_conveyor_and_without_next() {
        let exit = exit_point(&strip(), NextHop::Conveyor(Vec3::planar(0.0, -5000.0)));
        assert!((exit.y + 500.0).abs() < 1e-9);
        assert!(exit.x.abs() < 500.0);
        assert_eq!(exit_point(&strip(), NextHop::None), Vec3::ZERO);
    }

    #[test]
    fn turning_point_only_on_sharp_long_legs() {
        let cfg = MotionConfig::default();
        let fp = strip();
        let entry = Vec3::planar(-2000.0, -500.0);
        let exit = Vec3::planar(2000.0, 500.0);

        // Approaching from below, then turning along the strip.
        let mid = intermediate_point(Vec3::planar(-2000.0, -3000.0), &fp, entry, exit, &cfg).unwrap();
        let unpulled = entry.lerp(exit, cfg.turn_fraction);
        assert!(mid.planar_distance(fp.center) < unpulled.planar_distance(fp.center));
        assert!((mid.planar_distance(unpulled) - cfg.turn_center_pull).abs() < 1e-6);

        // Already heading along the strip.
        assert!(intermediate_point(Vec3::planar(-3000.0, -750.0), &fp, entry, exit, &cfg).is_none());
        // Too short to bother.
        let near_exit = Vec3::planar(-500.0, 0.0);
        assert!(intermediate_point(Vec3::planar(-2000.0, -3000.0), &fp, entry, near_exit, &cfg).is_none());
    }

    #[test]
    fn inside_heads_straight_for_exit() {
        let cfg = MotionConfig::default();
        let robot = Vec3::planar(-1000.0, 0.0);
        let leg = LegPoints::compute(robot, &strip(), NextHop::None, &cfg);
        assert_eq!(leg.intermediate, None);
        assert_eq!(leg.control_points(robot, &strip(), &cfg), vec![Vec3::ZERO]);
    }

    #[test]
    fn outside_enters_first() {
        let cfg = MotionConfig::default();
        let robot = Vec3::planar(-3000.0, 0.0);
        let leg = LegPoints::compute(robot, &strip(), NextHop::None, &cfg);
        let points = leg.control_points(robot, &strip(), &cfg);
        assert_eq!(points.len(), 2);
        assert!((points[0].x + 2000.0).abs() < 1e-9);
        assert_eq!(points[1], Vec3::ZERO);
    }

    #[test]
    fn final_traversal_runs_toward_conveyor_end() {
        let cfg = MotionConfig::default();
        let fp = strip();

        let forward = final_traversal(Vec3::planar(-2500.0, 0.0), &fp, Vec3::planar(6000.0, 0.0), &cfg);
        assert_eq!(forward.len(), 6);
        assert_eq!(forward.first(), Some(&fp.start()));
        assert_eq!(forward.last(), Some(&fp.end()));

        let backward = final_traversal(Vec3::ZERO, &fp, Vec3::planar(-6000.0, 0.0), &cfg);
        assert_eq!(backward.len(), 3);
        assert!((backward[0].x + 400.0).abs() < 1e-9);
        assert_eq!(backward.last(), Some(&fp.start()));
    }

    #[test]
    fn dedup_drops_close_points() {
        let pts = [Vec3::ZERO, Vec3::planar(500.0, 0.0), Vec3::planar(1000.0, 0.0), Vec3::planar(1300.0, 0.0)];
        assert_eq!(dedup(&pts, 600.0), vec![Vec3::ZERO, Vec3::planar(1000.0, 0.0)]);
    }

    #[test]
    fn thinning_keeps_ends_and_alternate_interior() {
        let pts: Vec<Vec3> = (0..6).map(|i| Vec3::planar(i as f64, 0.0)).collect();
        let xs: Vec<f64> = thin(pts).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 5.0]);

        let three: Vec<Vec3> = (0..3).map(|i| Vec3::planar(i as f64, 0.0)).collect();
        assert_eq!(thin(three.clone()), three);
    }
}

// ── Offsets ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod offsets {
    use super::*;

    #[test]
    fn lane_offsets_spread_about_axis() {
        let layout = corridor();
        let mut robots = fleet(&[Vec3::planar(-500.0, 0.0), Vec3::planar(500.0, 0.0)]);
        robots.location = vec![Some(P1), Some(P1)];
        let store = MotionStore::new(2, Duration::from_secs(1));
        let cfg = MotionConfig::default();

        let a = lane_offset(R0, P1, &layout, &robots, &store.states, &cfg);
        let b = lane_offset(R1, P1, &layout, &robots, &store.states, &cfg);
        assert!((a.y + 480.0).abs() < 1e-9);
        assert!((b.y - 480.0).abs() < 1e-9);

        // Swapping priorities swaps lanes.
        robots.priority = vec![5, 1];
        assert!(lane_offset(R0, P1, &layout, &robots, &store.states, &cfg).y > 0.0);
    }

    #[test]
    fn lone_or_coordinating_robot_keeps_center() {
        let layout = corridor();
        let mut robots = fleet(&[Vec3::planar(-500.0, 0.0), Vec3::planar(500.0, 0.0)]);
        robots.location = vec![Some(P1), Some(P1)];
        let mut store = MotionStore::new(2, Duration::from_secs(1));
        store.states[1].in_coordination = true;
        let off = lane_offset(R0, P1, &layout, &robots, &store.states, &MotionConfig::default());
        assert_eq!(off, Vec3::ZERO);
    }

    #[test]
    fn coordinated_offsets_are_opposite() {
        let layout = corridor();
        let motion = MotionConfig::default();
        let coord = CoordinationConfig::default();

        // Partner exactly on the axis: precedence decides.
        let robots = fleet(&[Vec3::planar(-1000.0, 0.0), Vec3::planar(1000.0, 0.0)]);
        let a = coordinated_offset(R0, R1, P1, &layout, &robots, &motion, &coord);
        let b = coordinated_offset(R1, R0, P1, &layout, &robots, &motion, &coord);
        assert!((a.y - 1500.0).abs() < 1e-9);
        assert!((b.y + 1500.0).abs() < 1e-9);

        // Partner to the left: move right, and the partner moves left.
        let robots = fleet(&[Vec3::planar(-1000.0, 0.0), Vec3::planar(1000.0, 200.0)]);
        let a = coordinated_offset(R0, R1, P1, &layout, &robots, &motion, &coord);
        let b = coordinated_offset(R1, R0, P1, &layout, &robots, &motion, &coord);
        assert!(a.y < 0.0 && b.y > 0.0);
    }

    #[test]
    fn close_partner_widens_offset() {
        let layout = corridor();
        let robots = fleet(&[Vec3::planar(-400.0, 0.0), Vec3::planar(400.0, 0.0)]);
        let off = coordinated_offset(
            R0, R1, P1, &layout, &robots, &MotionConfig::default(), &CoordinationConfig::default(),
        );
        assert!((off.planar_length() - 1500.0 * 1.4).abs() < 1e-9);
    }

    #[test]
    fn bypass_picks_clearer_side() {
        let layout = corridor();
        let mut robots = fleet(&[Vec3::ZERO, Vec3::planar(6000.0, 0.0), Vec3::planar(0.0, 2000.0)]);
        robots.next_location[0] = Some(P2);
        let off = bypass_offset(R0, &layout, &robots, &MotionConfig::default(), &CoordinationConfig::default());
        assert_eq!(off, Vec3::planar(0.0, -1200.0));
    }

    #[test]
    fn bypass_needs_a_direction() {
        let layout = corridor();
        let robots = fleet(&[Vec3::ZERO, Vec3::planar(2000.0, 0.0)]);
        let off = bypass_offset(R0, &layout, &robots, &MotionConfig::default(), &CoordinationConfig::default());
        assert_eq!(off, Vec3::ZERO);
        assert_eq!(movement_direction(&layout, &robots, R0), None);
    }

    #[test]
    fn avoidance_pushes_away_proportionally() {
        let robots = fleet(&[Vec3::ZERO, Vec3::planar(500.0, 0.0), Vec3::planar(5000.0, 0.0)]);
        let off = avoidance_offset(R0, &robots, &MotionConfig::default());
        assert!((off.x + 150.0).abs() < 1e-9);
        assert!(off.y.abs() < 1e-9);
    }

    #[test]
    fn episode_needs_time_and_distance() {
        let layout = corridor();
        let coord = CoordinationConfig::default();
        let mut store = MotionStore::new(2, Duration::from_secs(1));
        store.states[0].in_coordination = true;
        store.states[0].episode_start = Some(SimTime::ZERO);

        let far = fleet(&[Vec3::ZERO, Vec3::planar(10_000.0, 0.0)]);
        assert!(!episode_complete(R0, SimTime::from_millis(3_000), &layout, &far, &store.states, &coord));
        assert!(episode_complete(R0, SimTime::from_millis(4_000), &layout, &far, &store.states, &coord));

        let near = fleet(&[Vec3::ZERO, Vec3::planar(4_000.0, 0.0)]);
        assert!(!episode_complete(R0, SimTime::from_millis(9_000), &layout, &near, &store.states, &coord));
    }

    #[test]
    fn closing_robot_keeps_episode_open() {
        let layout = corridor();
        let coord = CoordinationConfig::default();
        let mut store = MotionStore::new(2, Duration::from_secs(1));
        store.states[0].episode_start = Some(SimTime::ZERO);

        // 5000 apart: beyond 4500 but inside the 1.2× buffer, heading at each other.
        let mut robots = fleet(&[Vec3::planar(-2000.0, 0.0), Vec3::planar(3000.0, 0.0)]);
        robots.next_location = vec![Some(P2), Some(P1)];
        assert!(!episode_complete(R0, SimTime::from_millis(5_000), &layout, &robots, &store.states, &coord));

        // Same spacing, both heading the same way.
        robots.position[0] = Vec3::planar(1000.0, 0.0);
        robots.position[1] = Vec3::planar(6000.0, 0.0);
        robots.next_location = vec![Some(P2), Some(P3)];
        assert!(episode_complete(R0, SimTime::from_millis(5_000), &layout, &robots, &store.states, &coord));
    }
}

// ── MotionEngine ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;

    #[test]
    fn vehicle_count_must_match() {
        let robots = fleet(&[Vec3::ZERO, Vec3::planar(2000.0, 0.0)]);
        let mut vehicles = kinematic(&robots);
        vehicles.pop();
        let err = MotionEngine::new(vehicles, 2, MotionConfig::default(), CoordinationConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, MotionError::VehicleCount { robots: 2, vehicles: 1 }));
    }

    #[test]
    fn empty_journey_rejected() {
        let mut w = World::new(&[Vec3::ZERO]);
        let err = w.engine.begin_journey(R0, Vec::new(), None, &mut w.robots).err().unwrap();
        assert!(matches!(err, MotionError::EmptyJourney(_)));
        let err = w.engine.begin_journey(RobotId(7), vec![P1], None, &mut w.robots).err().unwrap();
        assert!(matches!(err, MotionError::UnknownRobot(_)));
    }

    #[test]
    fn single_segment_journey_arrives() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0)]);
        w.start(R0, vec![P1], None);
        w.run_until_idle(R0, 300);

        assert_eq!(w.robots.location[0], Some(P1));
        assert_eq!(w.robots.next_location[0], None);
        assert!(w.events.contains(&MotionEvent::Arrived { robot: R0, location: Some(P1) }));
        assert!(w.engine.store.planned(R0).is_empty());
        assert_eq!(w.table.holder(P1, w.now), None);

        for _ in 0..100 {
            w.tick();
        }
        assert!(w.robots.position[0].planar_distance(Vec3::ZERO) < 1.0);
    }

    #[test]
    fn multi_segment_journey_visits_in_order_and_releases() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0)]);
        w.start(R0, vec![P1, P2, P3], None);

        let mut visited = Vec::new();
        for _ in 0..1500 {
            if !w.engine.store.is_moving(R0) {
                break;
            }
            w.tick();
            if let Some(loc) = w.robots.location[0] {
                if visited.last() != Some(&loc) {
                    visited.push(loc);
                }
            }
            if w.robots.location[0] == Some(P3) && w.engine.store.is_moving(R0) {
                assert_eq!(w.table.holder(P1, w.now), None);
                assert_eq!(w.table.holder(P2, w.now), None);
            }
        }
        assert!(!w.engine.store.is_moving(R0));
        assert_eq!(visited, vec![P1, P2, P3]);
        assert_eq!(w.robots.location[0], Some(P3));
        assert!(w.table.held_by(R0, w.now).is_empty());
    }

    #[test]
    fn conveyor_journey_docks() {
        let mut w = World::new(&[Vec3::planar(9000.0, 0.0)]);
        w.start(R0, vec![P3], Some(DOCK));
        w.run_until_idle(R0, 600);

        assert_eq!(w.robots.location[0], Some(DOCK));
        assert!(w.events.contains(&MotionEvent::Arrived { robot: R0, location: Some(DOCK) }));
        let dock = w.layout.position(DOCK);
        assert!(w.robots.position[0].planar_distance(dock) < 1500.0);
        // The final pathway was driven to its conveyor-side end first.
        assert!(w.robots.position[0].x > 14_000.0);
    }

    #[test]
    fn stop_halts_then_forces_resumption() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0)]);
        w.start(R0, vec![P1, P2], None);
        w.tick();
        w.robots.stop[0] = true;
        w.tick();
        assert!(w.engine.vehicle(R0).is_idle());
        assert_eq!(w.engine.vehicle(R0).max_speed(), 50.0);

        for _ in 0..9 {
            w.tick();
        }
        assert!(!w.robots.stop[0]);
        assert_eq!(w.engine.store.state(R0).forced_resumptions, 1);
        assert!(!w.engine.vehicle(R0).is_idle());
        assert_eq!(w.engine.vehicle(R0).max_speed(), 800.0);
    }

    #[test]
    fn coordinating_robot_creeps_and_resumes_early() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0), Vec3::planar(12_000.0, 0.0)]);
        w.start(R0, vec![P1, P2], None);
        w.tick();
        {
            let st = w.engine.store.state_mut(R0);
            st.coordinate = true;
            st.partner = Some(R1);
            st.in_coordination = true;
            st.episode_start = Some(w.now);
        }
        w.robots.stop[0] = true;
        w.tick();
        assert_eq!(w.engine.vehicle(R0).max_speed(), 200.0);
        assert!(w.robots.stop[0]);

        for _ in 0..3 {
            w.tick();
        }
        assert!(!w.robots.stop[0]);
        let st = w.engine.store.state(R0);
        assert_eq!(st.forced_resumptions, 0);
        assert!(!st.coordinate);
        assert!(st.stable_offset.is_some());
    }

    #[test]
    fn repeated_forced_resumptions_back_up() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0)]);
        w.start(R0, vec![P1, P2], None);
        let goal = w.robots.target[0];

        for _ in 0..40 {
            w.robots.stop[0] = true;
            w.tick();
            if w.engine.store.state(R0).is_backing_up() {
                break;
            }
        }
        assert!(w.events.contains(&MotionEvent::BackupStarted { robot: R0 }));
        assert!(!w.engine.store.is_moving(R0));
        assert_eq!(w.robots.target[0], None);
        assert!(w.engine.store.planned(R0).is_empty());
        assert!(w.table.held_by(R0, w.now).is_empty());
        assert_eq!(w.engine.vehicle(R0).max_speed(), 400.0);

        w.robots.stop[0] = false;
        for _ in 0..25 {
            w.tick();
        }
        assert!(!w.engine.store.state(R0).is_backing_up());
        assert_eq!(w.robots.target[0], goal);
        assert_eq!(w.engine.vehicle(R0).max_speed(), 800.0);
    }

    #[test]
    fn abandon_releases_route() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0)]);
        w.start(R0, vec![P1, P2], None);
        w.engine.abandon(R0, &mut w.table);
        assert!(!w.engine.store.is_moving(R0));
        assert!(w.table.held_by(R0, w.now).is_empty());
        assert!(w.engine.vehicle(R0).is_idle());
    }

    #[test]
    fn episode_ends_once_clear() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0), Vec3::planar(30_000.0, 0.0)]);
        w.start(R0, vec![P1, P2, P3], None);
        {
            let st = w.engine.store.state_mut(R0);
            st.coordinate = true;
            st.partner = Some(R1);
            st.in_coordination = true;
            st.episode_start = Some(w.now);
        }
        w.tick();
        assert!(w.engine.store.state(R0).stable_offset.is_some());

        for _ in 0..60 {
            w.tick();
        }
        let st = w.engine.store.state(R0);
        assert!(!st.in_coordination);
        assert!(st.stable_offset.is_none());
        assert!(w.events.contains(&MotionEvent::EpisodeEnded { robot: R0 }));
    }

    #[test]
    fn repeated_coordination_flag_keeps_episode_offset() {
        let mut w = World::new(&[Vec3::planar(-3000.0, 0.0), Vec3::planar(30_000.0, 0.0)]);
        w.start(R0, vec![P1, P2, P3], None);
        let held = Vec3::planar(0.0, 777.0);
        {
            let st = w.engine.store.state_mut(R0);
            st.coordinate = true;
            st.partner = Some(R1);
            st.in_coordination = true;
            st.episode_start = Some(w.now);
            st.stable_offset = Some(held);
        }
        w.tick();
        let st = w.engine.store.state(R0);
        assert_eq!(st.stable_offset, Some(held));
        assert!(!st.coordinate);
        assert_eq!(st.partner, None);
    }

    #[test]
    fn publish_speeds_copies_caps() {
        let mut w = World::new(&[Vec3::ZERO, Vec3::planar(2000.0, 0.0)]);
        w.engine.vehicle_mut(R1).set_max_speed(320.0);
        w.engine.publish_speeds(&mut w.robots);
        assert_eq!(w.robots.max_speed, vec![800.0, 320.0]);
    }
}
