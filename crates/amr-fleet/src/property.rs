//! Named robot properties exchanged with the external controller.
//!
//! The controller writes `Target`, `Priority`, `Stop`, and `BatteryLevel`;
//! the simulator keeps every property current for monitoring.

use std::fmt;
use std::str::FromStr;

use crate::FleetError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RobotProperty {
    Target,
    Stop,
    CarryingProduct,
    CarriedProduct,
    BatteryLevel,
    Location,
    NextLocation,
    Priority,
    MaxSpeed,
}

impl RobotProperty {
    pub const ALL: [RobotProperty; 9] = [
        RobotProperty::Target,
        RobotProperty::Stop,
        RobotProperty::CarryingProduct,
        RobotProperty::CarriedProduct,
        RobotProperty::BatteryLevel,
        RobotProperty::Location,
        RobotProperty::NextLocation,
        RobotProperty::Priority,
        RobotProperty::MaxSpeed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RobotProperty::Target          => "Target",
            RobotProperty::Stop            => "Stop",
            RobotProperty::CarryingProduct => "CarryingProduct",
            RobotProperty::CarriedProduct  => "CarriedProduct",
            RobotProperty::BatteryLevel    => "BatteryLevel",
            RobotProperty::Location        => "Location",
            RobotProperty::NextLocation    => "NextLocation",
            RobotProperty::Priority        => "Priority",
            RobotProperty::MaxSpeed        => "MaxSpeed",
        }
    }

    /// `true` for properties the external controller may write.
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            RobotProperty::Target
                | RobotProperty::Stop
                | RobotProperty::Priority
                | RobotProperty::BatteryLevel
        )
    }
}

impl FromStr for RobotProperty {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RobotProperty::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| FleetError::UnknownProperty(s.to_string()))
    }
}

impl fmt::Display for RobotProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PropertyValue ─────────────────────────────────────────────────────────────

/// A typed property value.  Segment and item references travel as names;
/// an empty string means "none".
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PropertyValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integers, and reals with no fractional part.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            PropertyValue::Int(i) => Some(i),
            PropertyValue::Real(r) if r.fract() == 0.0 => Some(r as i64),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match *self {
            PropertyValue::Real(r) => Some(r),
            PropertyValue::Int(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s)  => f.write_str(s),
            PropertyValue::Int(i)  => write!(f, "{i}"),
            PropertyValue::Real(r) => write!(f, "{r}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(r: f64) -> Self {
        PropertyValue::Real(r)
    }
}
