//! Fluent builder for constructing a [`Sim`].

use amr_coord::CollisionEngine;
use amr_core::{FleetConfig, MotionConfig};
use amr_fleet::{ItemStore, RobotRngs, RobotStore};
use amr_motion::{KinematicVehicle, MotionEngine, MotionProfile, Pose, Vehicle};
use amr_reservation::ReservationTable;
use amr_spatial::{Layout, Planner};

use crate::{Controller, Sim, SimError, SimResult};

/// One [`KinematicVehicle`] per robot, posed where the store puts it.
pub fn kinematic_vehicles(robots: &RobotStore, motion: &MotionConfig) -> Vec<KinematicVehicle> {
    let profile = MotionProfile::nominal(motion);
    robots
        .ids()
        .map(|r| KinematicVehicle::new(Pose::new(robots.position[r.index()], robots.heading[r.index()]), profile))
        .collect()
}

/// Fluent builder for [`Sim<V, P, C>`].
///
/// # Required inputs
///
/// - [`FleetConfig`]: tick length, cadences, every tunable distance
/// - [`Layout`]: pathways, idle locations, and conveyors
/// - [`RobotStore`] + [`RobotRngs`]: from [`amr_fleet::RobotStoreBuilder`]
///   or [`spawn_fleet`][crate::spawn_fleet]
/// - `Vec<V>`: one vehicle per robot
/// - `P: Planner`: e.g. [`amr_spatial::ReservationAwarePlanner`]
/// - `C: Controller`: the command source
///
/// # Optional inputs (have defaults)
///
/// | Method       | Default            |
/// |--------------|--------------------|
/// | `.items(s)`  | Empty `ItemStore`  |
///
/// # Example
///
/// ```rust,ignore
/// let (robots, rngs) = RobotStoreBuilder::new(n, seed).build()?;
/// let vehicles = kinematic_vehicles(&robots, &config.motion);
/// let planner = ReservationAwarePlanner::new(config.planner.clone());
/// let mut sim = SimBuilder::new(config, layout, robots, rngs, vehicles, planner, NoopController)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder<V: Vehicle, P: Planner, C: Controller> {
    config:     FleetConfig,
    layout:     Layout,
    robots:     RobotStore,
    rngs:       RobotRngs,
    vehicles:   Vec<V>,
    items:      Option<ItemStore>,
    planner:    P,
    controller: C,
}

impl<V: Vehicle, P: Planner, C: Controller> SimBuilder<V, P, C> {
    /// Create a builder with all required inputs.
    pub fn new(
        config:     FleetConfig,
        layout:     Layout,
        robots:     RobotStore,
        rngs:       RobotRngs,
        vehicles:   Vec<V>,
        planner:    P,
        controller: C,
    ) -> Self {
        Self { config, layout, robots, rngs, vehicles, items: None, planner, controller }
    }

    /// Supply the cargo items present at start.
    pub fn items(mut self, items: ItemStore) -> Self {
        self.items = Some(items);
        self
    }

    /// Validate inputs, place every vehicle, and return a ready-to-run
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim<V, P, C>> {
        let robot_count = self.robots.count;

        // ── Validate ──────────────────────────────────────────────────────
        self.config.validate()?;
        if robot_count > self.config.sim.max_robots {
            return Err(SimError::Config(format!(
                "{robot_count} robots exceed the maximum of {}",
                self.config.sim.max_robots
            )));
        }
        if self.rngs.len() != robot_count {
            return Err(SimError::RobotCountMismatch {
                expected: robot_count,
                got:      self.rngs.len(),
                what:     "robot RNGs",
            });
        }

        // ── Engines ───────────────────────────────────────────────────────
        let mut motion = MotionEngine::new(
            self.vehicles,
            robot_count,
            self.config.motion.clone(),
            self.config.coordination.clone(),
        )?;
        motion.reset(&self.robots);
        let collision = CollisionEngine::new(
            self.config.coordination.clone(),
            self.config.motion.clone(),
            self.config.sim.collision_interval(),
        );

        let mut sim = Sim {
            clock:        self.config.sim.make_clock(),
            config:       self.config,
            layout:       self.layout,
            robots:       self.robots,
            rngs:         self.rngs,
            items:        self.items.unwrap_or_default(),
            reservations: ReservationTable::new(),
            motion,
            collision,
            planner:      self.planner,
            controller:   self.controller,
        };
        sim.locate_all();
        Ok(sim)
    }
}
