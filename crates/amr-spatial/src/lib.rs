//! `amr-spatial`: segment layout, spatial indexing, and path planning.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`layout`]  | `Segment`, `Layout` (R-tree over centers), `LayoutBuilder`  |
//! | [`planner`] | `Planner` trait, `Availability` seam, `ReservationAwarePlanner` |
//! | [`loader`]  | CSV layout loader, tolerant JSON location-list parser       |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `amr-core` value types. |

pub mod error;
pub mod layout;
pub mod loader;
pub mod planner;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use layout::{Layout, LayoutBuilder, Segment};
pub use loader::{LocationRecord, load_layout_csv, load_layout_reader, parse_location_list};
pub use planner::{Availability, FleetPeer, PlanRequest, Planner, ReservationAwarePlanner, Route};
