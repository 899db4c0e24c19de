//! `amr-core`: foundational types for the `rust_amr` fleet simulator.
//!
//! This crate is a dependency of every other `amr-*` crate.  It has no
//! `amr-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `RobotId`, `SegmentId`, `ItemId`                      |
//! | [`geo`]         | `Vec3` planar vector algebra, nearest-point search    |
//! | [`footprint`]   | `Footprint` oriented rectangle, boundary sampling     |
//! | [`time`]        | `Tick`, `SimTime`, `SimClock`, `Cadence`              |
//! | [`kind`]        | `SegmentKind` enum                                    |
//! | [`config`]      | `FleetConfig` and its per-subsystem sections          |
//! | [`rng`]         | `RobotRng` per-robot deterministic streams            |
//! | [`error`]       | `AmrError`, `AmrResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types   |
//! |         | and config sections.                                       |

pub mod config;
pub mod error;
pub mod footprint;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    CargoConfig, CoordinationConfig, FleetConfig, IterationOrder, MotionConfig, PlannerConfig,
    ReservationConfig, SimConfig,
};
pub use error::{AmrError, AmrResult};
pub use footprint::{BoundaryDensity, Footprint, DEFAULT_WIDTH};
pub use geo::{Vec3, closest_pair, nearest_point};
pub use ids::{ItemId, RobotId, SegmentId};
pub use kind::SegmentKind;
pub use rng::RobotRng;
pub use time::{Cadence, SimClock, SimTime, Tick};
