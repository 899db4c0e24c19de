//! `amr-fleet`: Structure-of-Arrays storage for robots and cargo items.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`store`]     | `RobotStore` (SoA robot properties), `RobotRngs`          |
//! | [`builder`]   | `RobotStoreBuilder` (fluent construction)                 |
//! | [`item`]      | `ItemStore`, `Item`, ownership claims                     |
//! | [`property`]  | `RobotProperty` names and `PropertyValue`                 |
//! | [`error`]     | `FleetError`, `FleetResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `PropertyValue`.      |

pub mod builder;
pub mod error;
pub mod item;
pub mod property;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::RobotStoreBuilder;
pub use error::{FleetError, FleetResult};
pub use item::{Item, ItemStore};
pub use property::{PropertyValue, RobotProperty};
pub use store::{RobotRngs, RobotStore};
