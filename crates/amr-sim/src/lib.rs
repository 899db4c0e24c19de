//! `amr-sim`: tick loop orchestrator for the rust_amr fleet simulator.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.sim.total_ticks:
//!   ① Commands  : Controller::commands, applied in order (SetTarget on a
//!                  moving robot abandons its journey and leases).
//!   ② Collision : every collision_interval: snapshot, assess each robot
//!                  (parallel with the `parallel` feature), apply in order.
//!   ③ Robots    : in iteration order (Fixed or Rotating):
//!                    plan + lease a route      if idle with an unreached target
//!                    MotionEngine::step        advance, stop, backup, episodes
//!                    cargo::handle             pickup / drop-off when stationary
//!   ④ Drive     : run every vehicle for one tick, trail carried items.
//! ```
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`sim`]        | `Sim` and its tick loop                                    |
//! | [`builder`]    | `SimBuilder`, `kinematic_vehicles`                         |
//! | [`controller`] | `Command`, `Controller`, scripted and random dispatchers   |
//! | [`cargo`]      | Pickup, drop-off, carried-item trailing                    |
//! | [`spawn`]      | Startup polling, fleet construction from a spawn list      |
//! | [`property`]   | Named property reads and writes                            |
//! | [`observer`]   | `SimObserver` callbacks                                    |
//! | [`error`]      | `SimError`, `SimResult<T>`                                 |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs collision assessment on Rayon's thread pool.      |
//! | `fx-hash`  | FxHash lease maps in the reservation table.            |
//! | `serde`    | Serde derives on configuration and property values.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use amr_core::FleetConfig;
//! use amr_fleet::RobotStoreBuilder;
//! use amr_sim::{NoopController, NoopObserver, SimBuilder, kinematic_vehicles};
//! use amr_spatial::ReservationAwarePlanner;
//!
//! let config = FleetConfig::default();
//! let (robots, rngs) = RobotStoreBuilder::new(4, 42).build()?;
//! let vehicles = kinematic_vehicles(&robots, &config.motion);
//! let planner = ReservationAwarePlanner::new(config.planner.clone());
//! let mut sim = SimBuilder::new(config, layout, robots, rngs, vehicles, planner, NoopController)
//!     .build()?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod cargo;
pub mod controller;
pub mod error;
pub mod observer;
pub mod property;
pub mod sim;
pub mod spawn;


pub use builder::{SimBuilder, kinematic_vehicles};
pub use cargo::CargoEvent;
pub use controller::{
    Command, ControlContext, Controller, NoopController, RandomDispatcher, ScriptedController, idle_location_name,
};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use spawn::{Startup, await_quantity, spawn_fleet};
