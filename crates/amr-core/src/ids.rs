//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements.  The inner integer is a zero-based slot index into the
//! owning SoA store; prefer `.index()` over `id.0 as usize`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Slot of a robot in the fleet store.  Slot 0 is robot number 1.
    pub struct RobotId(u16);
}

typed_id! {
    /// Index of a segment (pathway, idle location, or conveyor) in the layout.
    pub struct SegmentId(u32);
}

typed_id! {
    /// Index of a cargo item in the item store.
    pub struct ItemId(u32);
}

/// Base instance name of the robot template.  Clones are suffixed ` #N`.
pub const ROBOT_BASE_NAME: &str = "Mobile Robot Resource";

impl RobotId {
    /// One-based robot number as used in instance names and default priorities.
    #[inline]
    pub fn number(self) -> u32 {
        self.0 as u32 + 1
    }

    /// Inverse of [`RobotId::number`].  Returns `None` for 0.
    #[inline]
    pub fn from_number(n: u32) -> Option<RobotId> {
        let slot = n.checked_sub(1)?;
        u16::try_from(slot).ok().map(RobotId)
    }

    /// Derive the robot slot from a host instance name.
    ///
    /// `"Mobile Robot Resource"` is robot 1, `"Mobile Robot Resource #N"` is
    /// robot `N`.  Anything else yields `None`.
    pub fn from_instance_name(name: &str) -> Option<RobotId> {
        let rest = name.trim().strip_prefix(ROBOT_BASE_NAME)?;
        if rest.is_empty() {
            return Some(RobotId(0));
        }
        let n: u32 = rest.trim_start().strip_prefix('#')?.trim().parse().ok()?;
        RobotId::from_number(n)
    }

    /// Host instance name for this robot.
    pub fn instance_name(self) -> String {
        match self.number() {
            1 => ROBOT_BASE_NAME.to_string(),
            n => format!("{ROBOT_BASE_NAME} #{n}"),
        }
    }
}
