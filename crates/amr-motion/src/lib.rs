//! `amr-motion`: per-robot motion state machine and vehicle abstraction.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`vehicle`]   | `Vehicle` capability trait, `MotionProfile`, `KinematicVehicle` |
//! | [`state`]     | `MotionState`: per-robot journey, stop, episode, backup state   |
//! | [`store`]     | `MotionStore`: `Vec<MotionState>` + sparse planned-path map     |
//! | [`waypoints`] | Entry/exit/intermediate points, dedup and thinning              |
//! | [`offsets`]   | Lane, coordinated, bypass, and conveyor avoidance offsets       |
//! | [`engine`]    | `MotionEngine<V>`: the per-tick step                            |
//! | [`error`]     | `MotionError`, `MotionResult<T>`                                |
//!
//! # Journey model
//!
//! A journey is a list of traversable segments, optionally followed by a
//! conveyor destination.  For each segment the engine issues one vehicle
//! command (entry, optional turning point, exit) and advances its index
//! when the robot reaches the exit and can hop onto the next segment.  The
//! last pathway before a conveyor is driven end to end along its axis,
//! after which the robot approaches the conveyor directly.
//!
//! Commands are re-issued whenever something invalidates them: a stop, a
//! coordination episode, a bypass, or the conveyor refresh cadence.

pub mod engine;
pub mod error;
pub mod offsets;
pub mod state;
pub mod store;
pub mod vehicle;
pub mod waypoints;

#[cfg(test)]
mod tests;

pub use engine::{MotionContext, MotionEngine, MotionEvent};
pub use error::{MotionError, MotionResult};
pub use state::{ApproachWatch, Backup, MotionState};
pub use store::MotionStore;
pub use vehicle::{KinematicVehicle, MotionProfile, Pose, Vehicle};
pub use waypoints::NextHop;
