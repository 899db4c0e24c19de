//! Leasing whole routes.

use amr_core::{ReservationConfig, RobotId, SegmentId, SimTime};

use crate::ReservationTable;

impl ReservationTable {
    /// Lease every segment of `route` to `robot`, or none of them.
    ///
    /// Leases lengthen along the route (see
    /// [`ReservationConfig::lease_for_hop`]) so segments reached later stay
    /// held until the robot gets there.  Returns `false` without touching
    /// the table if any segment is held by another robot.
    pub fn reserve_route(
        &mut self,
        route: &[SegmentId],
        robot: RobotId,
        now: SimTime,
        config: &ReservationConfig,
    ) -> bool {
        if let Some(&blocked) = route.iter().find(|&&s| self.holder(s, now).is_some_and(|h| h != robot)) {
            tracing::debug!(robot = %robot, segment = %blocked, "route lease refused");
            return false;
        }
        for (i, &segment) in route.iter().enumerate() {
            self.reserve(segment, robot, now, config.lease_for_hop(i));
        }
        true
    }

    /// Release `robot`'s leases on the segments of `planned` that come
    /// before `current`.  Does nothing if `current` is not on the route.
    pub fn release_passed(&mut self, robot: RobotId, planned: &[SegmentId], current: SegmentId) {
        let Some(idx) = planned.iter().position(|&s| s == current) else {
            return;
        };
        for &segment in &planned[..idx] {
            self.release(segment, robot);
        }
    }

    /// Release `robot`'s leases on every segment of `planned`.
    pub fn release_route(&mut self, robot: RobotId, planned: &[SegmentId]) {
        for &segment in planned {
            self.release(segment, robot);
        }
    }
}
