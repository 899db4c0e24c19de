//! `amr-coord`: collision detection and coordination responses.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`snapshot`]  | `FleetSnapshot`, `RobotView`: read-only state for one pass      |
//! | [`encounter`] | `Encounter`, `EncounterKind`, `Zone`, pair classification       |
//! | [`response`]  | `Response`, `Assessment`, per-robot `assess`, bypass check      |
//! | [`engine`]    | `CollisionEngine`: assess then apply, on its own cadence        |
//!
//! # Tiers
//!
//! | Zone           | Radius                     | Response                               |
//! |----------------|----------------------------|----------------------------------------|
//! | Critical       | 2500 (3000 at a junction)  | lower-precedence robot stops, coordinates |
//! | Coordination   | 4000                       | shared episode, speed × 0.5 / 0.6      |
//! | Early          | 5000                       | speed × 0.7 / 0.8                      |
//!
//! Precedence is the lower `(priority, id)`.  When a robot meets several
//! others in one pass the smallest speed factor wins.

pub mod encounter;
pub mod engine;
pub mod response;
pub mod snapshot;


pub use encounter::{Encounter, EncounterKind, Zone};
pub use engine::{CollisionContext, CollisionEngine, CollisionEvent};
pub use response::{Assessment, Response};
pub use snapshot::{FleetSnapshot, RobotView};
