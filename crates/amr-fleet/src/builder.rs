//! Fluent builder for `RobotStore` + `RobotRngs`.
//!
//! ```rust
//! use amr_core::Vec3;
//! use amr_fleet::RobotStoreBuilder;
//!
//! let (store, rngs) = RobotStoreBuilder::new(3, 42)
//!     .pose(1, Vec3::planar(500.0, 500.0), 90.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.count, 3);
//! assert_eq!(rngs.len(), 3);
//! // Robots without an explicit pose are spaced 2000 apart along +x.
//! assert_eq!(store.position[2], Vec3::planar(4000.0, 0.0));
//! ```

use amr_core::Vec3;

use crate::{FleetError, FleetResult, RobotRngs, RobotStore};

/// Fallback spacing along +x for robots without a spawn pose.
pub const SPAWN_SPACING: f64 = 2_000.0;

pub struct RobotStoreBuilder {
    count:         usize,
    seed:          u64,
    max_robots:    usize,
    origin:        Vec3,
    nominal_speed: f64,
    poses:         Vec<Option<(Vec3, f64)>>,
}

impl RobotStoreBuilder {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            max_robots:    15,
            origin:        Vec3::ZERO,
            nominal_speed: 800.0,
            poses:         vec![None; count],
        }
    }

    pub fn max_robots(mut self, max: usize) -> Self {
        self.max_robots = max;
        self
    }

    /// Template position the fallback spacing is measured from.
    pub fn origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn nominal_speed(mut self, speed: f64) -> Self {
        self.nominal_speed = speed;
        self
    }

    /// Spawn pose for the robot in `slot`.  Out-of-range slots are ignored.
    pub fn pose(mut self, slot: usize, position: Vec3, heading_deg: f64) -> Self {
        if let Some(p) = self.poses.get_mut(slot) {
            *p = Some((position, heading_deg));
        }
        self
    }

    pub fn build(self) -> FleetResult<(RobotStore, RobotRngs)> {
        if self.count > self.max_robots {
            return Err(FleetError::TooManyRobots { requested: self.count, max: self.max_robots });
        }
        let poses = self
            .poses
            .iter()
            .enumerate()
            .map(|(i, p)| match *p {
                Some((pos, deg)) => (pos, Vec3::from_heading_deg(deg)),
                None => (
                    self.origin + Vec3::planar(i as f64 * SPAWN_SPACING, 0.0),
                    Vec3::planar(1.0, 0.0),
                ),
            })
            .collect();
        let store = RobotStore::new(poses, self.nominal_speed);
        let rngs = RobotRngs::new(self.count, self.seed);
        Ok((store, rngs))
    }
}
