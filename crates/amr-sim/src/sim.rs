//! The `Sim` struct and its tick loop.

use amr_coord::{CollisionContext, CollisionEngine, CollisionEvent};
use amr_core::{FleetConfig, ItemId, IterationOrder, RobotId, SegmentId, SimClock, SimTime, Tick, Vec3};
use amr_fleet::{ItemStore, PropertyValue, RobotProperty, RobotRngs, RobotStore};
use amr_motion::{MotionContext, MotionEngine, MotionEvent, Vehicle};
use amr_reservation::ReservationTable;
use amr_spatial::{FleetPeer, Layout, PlanRequest, Planner};
use tracing::{debug, warn};

use crate::cargo::{self, CargoEvent};
use crate::property::{command_for_property, read_property};
use crate::{Command, ControlContext, Controller, SimError, SimObserver, SimResult};

/// The main simulation runner.
///
/// `Sim<V, P, C>` holds all simulation state and drives the tick loop:
///
/// 1. **Commands**: ask the [`Controller`] for commands and apply them.
/// 2. **Collision pass** (on its own cadence, optionally parallel with the
///    `parallel` feature): assess every robot against a fleet snapshot,
///    then apply stops, coordination episodes, bypasses, and speed caps.
/// 3. **Robot loop** (sequential, in iteration order):
///    - plan and lease a route for an idle robot with an unreached target;
///    - step its motion state machine;
///    - handle cargo once it is stationary.
/// 4. **Drive**: advance every vehicle by one tick and move carried items
///    along with their robots.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<V: Vehicle, P: Planner, C: Controller> {
    pub config:       FleetConfig,

    /// Tracks the current tick and maps it to time.
    pub clock:        SimClock,

    pub layout:       Layout,

    /// Externally visible robot properties (SoA arrays).
    pub robots:       RobotStore,

    /// Per-robot deterministic RNGs.
    pub rngs:         RobotRngs,

    pub items:        ItemStore,

    pub reservations: ReservationTable,

    /// Vehicles plus per-robot journey, stop, and episode state.
    pub motion:       MotionEngine<V>,

    pub collision:    CollisionEngine,

    pub planner:      P,

    pub controller:   C,
}

impl<V: Vehicle, P: Planner, C: Controller> Sim<V, P, C> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `sim.total_ticks`.
    ///
    /// Steady-state operation has no failure path: planning failures,
    /// refused leases, and stalls are all retried on later ticks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick.0 < self.config.sim.total_ticks {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores
    /// `total_ticks`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Apply one controller command immediately.
    pub fn apply_command(&mut self, command: Command) {
        let robot = command.robot();
        let i = robot.index();
        if i >= self.robots.count {
            warn!(robot = %robot, "command for unknown robot ignored");
            return;
        }
        match command {
            Command::SetTarget { target, .. } => {
                if let Some(t) = target.filter(|&t| self.layout.get(t).is_none()) {
                    warn!(robot = %robot, segment = %t, "target outside layout ignored");
                    return;
                }
                if self.robots.target[i] == target {
                    return;
                }
                if self.motion.store.is_moving(robot) {
                    self.motion.abandon(robot, &mut self.reservations);
                    self.robots.location[i] = self.layout.containing(self.robots.position[i]);
                    self.robots.next_location[i] = None;
                }
                self.robots.target[i] = target;
                debug!(
                    robot = %robot,
                    target = %target.map_or("", |t| self.layout.name(t)),
                    "target set"
                );
            }
            Command::SetPriority { priority, .. } => self.robots.priority[i] = priority,
            Command::SetStop { stop, .. } => self.robots.stop[i] = stop,
            Command::SetBattery { level, .. } => self.robots.battery[i] = level.clamp(0, 100),
        }
    }

    /// Current value of a named robot property.
    pub fn property(&self, robot: RobotId, property: RobotProperty) -> SimResult<PropertyValue> {
        read_property(&self.layout, &self.robots, &self.items, robot, property)
    }

    /// Write a controller-owned property by name.
    ///
    /// # Errors
    ///
    /// Unknown robots, unknown or read-only names, mistyped values, and
    /// unknown target segments.  The write is dropped and the robot keeps
    /// its state.
    pub fn set_property(&mut self, robot: RobotId, name: &str, value: PropertyValue) -> SimResult<()> {
        let command = if robot.index() < self.robots.count {
            command_for_property(&self.layout, robot, name, &value)
        } else {
            Err(SimError::UnknownRobot(robot))
        };
        match command {
            Ok(command) => {
                self.apply_command(command);
                Ok(())
            }
            Err(e) => {
                warn!(robot = %robot, property = name, error = %e, "property write ignored");
                Err(e)
            }
        }
    }

    /// Produce a new item on `conveyor`'s surface.
    pub fn spawn_item(&mut self, name: &str, conveyor: SegmentId) -> SimResult<ItemId> {
        let segment = self.layout.segment(conveyor);
        let at = segment.position() + Vec3::new(0.0, 0.0, segment.surface_height);
        Ok(self.items.add(name, at, Some(conveyor))?)
    }

    /// Return to the spawn state: every robot idle at its spawn pose with
    /// default properties, no leases, no item ownership, clock at zero.
    pub fn reset(&mut self) {
        self.items.clear_ownership();
        self.robots.reset(self.config.motion.nominal_speed);
        self.motion.reset(&self.robots);
        self.reservations.clear();
        self.collision.reset();
        self.clock = self.config.sim.make_clock();
        self.locate_all();
    }

    /// Set each robot's Location to the segment containing it.
    pub(crate) fn locate_all(&mut self) {
        for i in 0..self.robots.count {
            self.robots.location[i] = self.layout.containing(self.robots.position[i]);
        }
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        let now = self.clock.now();

        observer.on_tick_start(tick, now);
        let moving = self.process_tick(tick, now, observer);
        observer.on_tick_end(tick, moving);

        let interval = self.config.sim.output_interval_ticks;
        if interval > 0 && tick.0.is_multiple_of(interval) {
            observer.on_snapshot(tick, now, &self.layout, &self.robots, &self.items);
        }
        self.clock.advance();
    }

    fn process_tick<O: SimObserver>(&mut self, tick: Tick, now: SimTime, observer: &mut O) -> usize {
        // ── Phase 1: controller commands ──────────────────────────────────
        let commands = {
            let ctx = ControlContext {
                tick,
                now,
                layout: &self.layout,
                robots: &self.robots,
                items:  &self.items,
                motion: &self.motion.store,
            };
            self.controller.commands(&ctx, &mut self.rngs)
        };
        for command in commands {
            self.apply_command(command);
        }

        // ── Phase 2: collision pass ───────────────────────────────────────
        if self.collision.is_due(now) {
            let mut ctx = CollisionContext {
                layout:       &self.layout,
                robots:       &mut self.robots,
                motion:       &mut self.motion,
                reservations: &mut self.reservations,
                now,
            };
            for event in self.collision.run(&mut ctx) {
                match event {
                    CollisionEvent::EpisodeStarted { robot, partner } => {
                        observer.on_episode_started(robot, partner, now);
                    }
                }
            }
        }

        // ── Phase 3: robot loop ───────────────────────────────────────────
        let dt = self.clock.tick_duration();
        let mut events = Vec::new();
        for robot in self.iteration_order(tick) {
            self.plan(robot, now, observer);

            let mut ctx = MotionContext {
                layout:       &self.layout,
                robots:       &mut self.robots,
                reservations: &mut self.reservations,
                now,
                dt,
            };
            self.motion.step(robot, &mut ctx, &mut events);
            for event in events.drain(..) {
                match event {
                    MotionEvent::Arrived { robot, location } => observer.on_arrival(robot, location, now),
                    MotionEvent::EpisodeEnded { robot } => observer.on_episode_ended(robot, now),
                    MotionEvent::BackupStarted { robot } => observer.on_backup_started(robot, now),
                }
            }

            if self.motion.store.is_moving(robot) {
                continue;
            }
            let handled = cargo::handle(
                robot,
                &self.layout,
                &mut self.robots,
                &mut self.items,
                &self.config.cargo,
                self.config.motion.conveyor_arrival,
                now,
            );
            match handled {
                Some(CargoEvent::PickedUp { robot, item, conveyor }) => observer.on_pickup(robot, item, conveyor, now),
                Some(CargoEvent::DroppedOff { robot, item, conveyor }) => {
                    observer.on_drop_off(robot, item, conveyor, now)
                }
                None => {}
            }
        }

        // ── Phase 4: drive vehicles ───────────────────────────────────────
        self.motion.drive(&mut self.robots, dt);
        self.motion.publish_speeds(&mut self.robots);
        cargo::trail_carried(&mut self.robots, &mut self.items, &self.config.cargo);

        self.motion.store.states.iter().filter(|s| s.moving).count()
    }

    pub(crate) fn iteration_order(&self, tick: Tick) -> Vec<RobotId> {
        let n = self.robots.count;
        if n == 0 {
            return Vec::new();
        }
        let start = match self.config.sim.iteration_order {
            IterationOrder::Fixed => 0,
            IterationOrder::Rotating => (tick.0 % n as u64) as usize,
        };
        (0..n).map(|k| RobotId(((start + k) % n) as u16)).collect()
    }

    /// Plan and lease a route for an idle robot whose target is not yet
    /// reached.  On failure the robot stops and tries again next tick.
    fn plan<O: SimObserver>(&mut self, robot: RobotId, now: SimTime, observer: &mut O) {
        let i = robot.index();
        let st = self.motion.store.state(robot);
        if st.moving || st.is_backing_up() {
            return;
        }
        let Some(goal) = self.robots.target[i] else {
            return;
        };
        if self.robots.location[i] == Some(goal) {
            return;
        }

        let route = {
            let peers: Vec<FleetPeer<'_>> = self
                .robots
                .ids()
                .map(|r| FleetPeer {
                    robot:         r,
                    position:      self.robots.position[r.index()],
                    planned:       self.motion.store.planned(r),
                    next_location: self.robots.next_location[r.index()],
                })
                .collect();
            let request = PlanRequest { robot, start: self.robots.position[i], goal, now, peers: &peers };
            self.planner.plan(&self.layout, &request, &mut self.reservations)
        };

        let leased = route.and_then(|route| {
            let (path, conveyor) = route.into_legs(&self.layout);
            self.reservations
                .reserve_route(&path, robot, now, &self.config.reservation)
                .then_some((path, conveyor))
        });
        let Some((path, conveyor)) = leased else {
            self.robots.stop[i] = true;
            debug!(robot = %robot, goal = %self.layout.name(goal), t = %now, "planning failed");
            observer.on_planning_failed(robot, goal, now);
            return;
        };

        match self.motion.begin_journey(robot, path.clone(), conveyor, &mut self.robots) {
            Ok(()) => {
                self.robots.stop[i] = false;
                debug!(robot = %robot, goal = %self.layout.name(goal), hops = path.len(), t = %now, "route planned");
                observer.on_route_planned(robot, &path, conveyor, now);
            }
            Err(e) => {
                self.reservations.release_route(robot, &path);
                warn!(robot = %robot, error = %e, "journey rejected");
            }
        }
    }
}
