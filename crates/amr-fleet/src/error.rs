//! Fleet-storage error type.

use thiserror::Error;

use amr_core::{ItemId, RobotId};

use crate::RobotProperty;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("{requested} robots requested but at most {max} are supported")]
    TooManyRobots { requested: usize, max: usize },

    #[error("item {item} is already attached to {owner}")]
    ItemOwned { item: ItemId, owner: RobotId },

    #[error("item {0} not found")]
    UnknownItem(ItemId),

    #[error("item `{0}` already exists")]
    DuplicateItem(String),

    #[error("unknown robot property `{0}`")]
    UnknownProperty(String),

    #[error("property {property} expects a {expected} value")]
    PropertyType { property: RobotProperty, expected: &'static str },
}

pub type FleetResult<T> = Result<T, FleetError>;
