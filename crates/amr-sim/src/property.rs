//! Named property access.
//!
//! Segment and item references cross the property boundary as names; an
//! empty string means none.

use amr_core::{RobotId, SegmentId};
use amr_fleet::{FleetError, ItemStore, PropertyValue, RobotProperty, RobotStore};
use amr_spatial::Layout;

use crate::{Command, SimError, SimResult};

/// Current value of `property` for `robot`.
///
/// # Errors
///
/// [`SimError::UnknownRobot`] when `robot` is not in the fleet.
pub fn read_property(
    layout: &Layout,
    robots: &RobotStore,
    items: &ItemStore,
    robot: RobotId,
    property: RobotProperty,
) -> SimResult<PropertyValue> {
    let i = robot.index();
    if i >= robots.count {
        return Err(SimError::UnknownRobot(robot));
    }
    let segment = |s: Option<SegmentId>| {
        PropertyValue::Str(s.map_or_else(String::new, |s| layout.name(s).to_string()))
    };
    let value = match property {
        RobotProperty::Target          => segment(robots.target[i]),
        RobotProperty::Location        => segment(robots.location[i]),
        RobotProperty::NextLocation    => segment(robots.next_location[i]),
        RobotProperty::Stop            => PropertyValue::Bool(robots.stop[i]),
        RobotProperty::CarryingProduct => PropertyValue::Bool(robots.is_carrying(robot)),
        RobotProperty::CarriedProduct  => {
            PropertyValue::Str(robots.carried[i].map_or_else(String::new, |item| items.name(item).to_string()))
        }
        RobotProperty::BatteryLevel    => PropertyValue::Int(robots.battery[i] as i64),
        RobotProperty::Priority        => PropertyValue::Int(robots.priority[i] as i64),
        RobotProperty::MaxSpeed        => PropertyValue::Real(robots.max_speed[i]),
    };
    Ok(value)
}

/// Translate a controller write of `name = value` into a [`Command`].
///
/// # Errors
///
/// Unknown or read-only property names, values of the wrong type, and
/// target names missing from the layout.
pub fn command_for_property(
    layout: &Layout,
    robot: RobotId,
    name: &str,
    value: &PropertyValue,
) -> SimResult<Command> {
    let property: RobotProperty = name.parse()?;
    let mismatch = |expected| SimError::Fleet(FleetError::PropertyType { property, expected });
    match property {
        RobotProperty::Target => {
            let name = value.as_str().ok_or_else(|| mismatch("string"))?.trim();
            let target = if name.is_empty() {
                None
            } else {
                Some(layout.lookup(name).ok_or_else(|| SimError::UnknownSegment(name.to_string()))?)
            };
            Ok(Command::SetTarget { robot, target })
        }
        RobotProperty::Stop => {
            let stop = value.as_bool().ok_or_else(|| mismatch("boolean"))?;
            Ok(Command::SetStop { robot, stop })
        }
        RobotProperty::Priority => {
            let priority = value.as_int().ok_or_else(|| mismatch("integer"))?;
            let priority = i32::try_from(priority).map_err(|_| mismatch("32-bit integer"))?;
            Ok(Command::SetPriority { robot, priority })
        }
        RobotProperty::BatteryLevel => {
            let level = value.as_int().ok_or_else(|| mismatch("integer"))?;
            // BatteryLevel always lies in 0..=100.
            Ok(Command::SetBattery { robot, level: level.clamp(0, 100) as i32 })
        }
        other => Err(SimError::ReadOnlyProperty(other)),
    }
}
