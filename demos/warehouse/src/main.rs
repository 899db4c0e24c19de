//! warehouse: demo run of the rust_amr fleet simulator.
//!
//! Four robots shuttle products from two input conveyors to two output
//! conveyors across a two-aisle floor, dispatched by `RandomDispatcher`.
//! Pass a JSON `FleetConfig` path as the first argument to override the
//! defaults; `RUST_LOG` controls log verbosity.

mod layout;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use amr_core::{FleetConfig, ItemId, RobotId, SegmentId, SegmentKind, SimTime, Tick};
use amr_fleet::{ItemStore, RobotStore};
use amr_output::{CsvWriter, OutputWriter, SimOutputObserver};
use amr_sim::{RandomDispatcher, SimBuilder, SimObserver, await_quantity, kinematic_vehicles, spawn_fleet};
use amr_spatial::{Layout, ReservationAwarePlanner};

use layout::{ROBOT_SPAWNS, SPAWN_ORIGIN, build_layout};

// ── Constants ─────────────────────────────────────────────────────────────────

const ROBOT_COUNT:          usize = 4;
const SIM_MINUTES:          u64   = 10;
/// A new product appears on each starved input conveyor this often.
const PRODUCE_EVERY_TICKS:  u64   = 150;
const OUTPUT_DIR:           &str  = "output/warehouse";

// ── Observer wrapper to count rows ────────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:       SimOutputObserver<W>,
    status_rows: usize,
    pickups:     usize,
    drop_offs:   usize,
    episodes:    usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, status_rows: 0, pickups: 0, drop_offs: 0, episodes: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, moving: usize) {
        self.inner.on_tick_end(tick, moving);
    }

    fn on_route_planned(&mut self, robot: RobotId, path: &[SegmentId], conveyor: Option<SegmentId>, now: SimTime) {
        self.inner.on_route_planned(robot, path, conveyor, now);
    }

    fn on_planning_failed(&mut self, robot: RobotId, goal: SegmentId, now: SimTime) {
        self.inner.on_planning_failed(robot, goal, now);
    }

    fn on_arrival(&mut self, robot: RobotId, location: Option<SegmentId>, now: SimTime) {
        self.inner.on_arrival(robot, location, now);
    }

    fn on_pickup(&mut self, robot: RobotId, item: ItemId, conveyor: SegmentId, now: SimTime) {
        self.pickups += 1;
        self.inner.on_pickup(robot, item, conveyor, now);
    }

    fn on_drop_off(&mut self, robot: RobotId, item: ItemId, conveyor: SegmentId, now: SimTime) {
        self.drop_offs += 1;
        self.inner.on_drop_off(robot, item, conveyor, now);
    }

    fn on_episode_started(&mut self, robot: RobotId, partner: RobotId, now: SimTime) {
        self.episodes += 1;
        self.inner.on_episode_started(robot, partner, now);
    }

    fn on_episode_ended(&mut self, robot: RobotId, now: SimTime) {
        self.inner.on_episode_ended(robot, now);
    }

    fn on_backup_started(&mut self, robot: RobotId, now: SimTime) {
        self.inner.on_backup_started(robot, now);
    }

    fn on_snapshot(&mut self, tick: Tick, now: SimTime, layout: &Layout, robots: &RobotStore, items: &ItemStore) {
        self.status_rows += robots.count;
        self.inner.on_snapshot(tick, now, layout, robots, items);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

fn load_config() -> Result<FleetConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            let config = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
            info!(path = %path, "loaded fleet configuration");
            Ok(config)
        }
        None => Ok(FleetConfig::default()),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = load_config()?;
    config.sim.total_ticks = SIM_MINUTES * 60_000 / u64::from(config.sim.tick_ms.max(1));

    // 1. Floor layout.
    let layout = build_layout()?;
    let inputs: Vec<SegmentId> = layout.of_kind(SegmentKind::InputConveyor).collect();
    info!(segments = layout.len(), inputs = inputs.len(), "layout built");

    // 2. Fleet: wait for the declared quantity, then pose from the spawn list.
    let startup = await_quantity(|_| Some(ROBOT_COUNT), &config.sim)?;
    info!(robots = startup.quantity, waited = ?startup.waited, "fleet declared");
    let (robots, rngs) = spawn_fleet(startup.quantity, ROBOT_SPAWNS, SPAWN_ORIGIN, &config)?;

    // 3. Sim.
    let vehicles = kinematic_vehicles(&robots, &config.motion);
    let planner = ReservationAwarePlanner::new(config.planner.clone());
    let dispatcher = RandomDispatcher::new().with_pickup_radius(config.cargo.pickup_radius);
    let mut sim = SimBuilder::new(config, layout, robots, rngs, vehicles, planner, dispatcher).build()?;

    // 4. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let inner = SimOutputObserver::new(writer, &sim.layout, sim.config.sim.tick_ms);
    let mut obs = CountingObserver::new(inner);

    // 5. Run, topping up starved input conveyors.
    let t0 = Instant::now();
    let mut produced = 0usize;
    while sim.clock.current_tick.0 < sim.config.sim.total_ticks {
        if sim.clock.current_tick.0.is_multiple_of(PRODUCE_EVERY_TICKS) {
            for &conveyor in &inputs {
                let at = sim.layout.position(conveyor);
                if sim.items.nearest_unowned(at, sim.config.cargo.pickup_radius).is_none() {
                    produced += 1;
                    sim.spawn_item(&format!("Product #{produced}"), conveyor)?;
                }
            }
        }
        sim.run_ticks(1, &mut obs);
    }
    obs.on_sim_end(sim.clock.current_tick);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Simulated {SIM_MINUTES} min in {:.3} s", elapsed.as_secs_f64());
    println!("  robot_status.csv : {} rows", obs.status_rows);
    println!("  products         : {produced} produced, {} picked up, {} delivered", obs.pickups, obs.drop_offs);
    println!("  episodes         : {}", obs.episodes);
    println!();

    println!("{:<26} {:<20} {:<20} {:<8}", "Robot", "Location", "Target", "Carrying");
    println!("{}", "-".repeat(76));
    for r in sim.robots.ids() {
        let i = r.index();
        let name = |s: Option<SegmentId>| s.map_or("-", |s| sim.layout.name(s));
        println!(
            "{:<26} {:<20} {:<20} {:<8}",
            r.instance_name(),
            name(sim.robots.location[i]),
            name(sim.robots.target[i]),
            if sim.robots.carried[i].is_some() { "yes" } else { "no" },
        );
    }

    Ok(())
}
