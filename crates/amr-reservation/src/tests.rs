//! Unit tests for amr-reservation.

use std::time::Duration;

use amr_core::{ReservationConfig, RobotId, SegmentId, SimTime};

use crate::ReservationTable;

const A: SegmentId = SegmentId(0);
const B: SegmentId = SegmentId(1);
const C: SegmentId = SegmentId(2);
const R1: RobotId = RobotId(0);
const R2: RobotId = RobotId(1);

fn secs(s: f64) -> SimTime {
    SimTime::from_secs_f64(s)
}

// ── Single leases ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod lease {
    use super::*;

    #[test]
    fn conflicting_lease_fails_until_expiry() {
        let mut t = ReservationTable::new();
        assert!(t.reserve(A, R1, secs(0.0), Duration::from_secs(5)));
        assert!(!t.reserve(A, R2, secs(4.9), Duration::from_secs(5)));
        assert_eq!(t.holder(A, secs(4.9)), Some(R1));
        assert!(t.reserve(A, R2, secs(5.0), Duration::from_secs(5)));
        assert_eq!(t.holder(A, secs(5.0)), Some(R2));
        // The expired entry for R1 was swept.
        assert_eq!(t.expiry(A, R1), None);
    }

    #[test]
    fn failed_reserve_does_not_mutate() {
        let mut t = ReservationTable::new();
        t.reserve(A, R1, secs(0.0), Duration::from_secs(5));
        assert!(!t.reserve(A, R2, secs(1.0), Duration::from_secs(5)));
        assert_eq!(t.expiry(A, R1), Some(secs(5.0)));
        assert_eq!(t.expiry(A, R2), None);
    }

    #[test]
    fn same_robot_refreshes_expiry() {
        let mut t = ReservationTable::new();
        t.reserve(A, R1, secs(0.0), Duration::from_secs(5));
        assert!(t.reserve(A, R1, secs(3.0), Duration::from_secs(5)));
        assert_eq!(t.expiry(A, R1), Some(secs(8.0)));
    }

    #[test]
    fn release_by_non_owner_is_noop() {
        let mut t = ReservationTable::new();
        t.reserve(A, R1, secs(0.0), Duration::from_secs(5));
        t.release(A, R2);
        assert_eq!(t.holder(A, secs(1.0)), Some(R1));
        t.release(A, R1);
        assert_eq!(t.holder(A, secs(1.0)), None);
        t.release(B, R1);
    }

    #[test]
    fn availability_purges_but_never_grants() {
        let mut t = ReservationTable::new();
        t.reserve(A, R1, secs(0.0), Duration::from_secs(2));
        assert!(t.is_available(A, R1, secs(1.0)));
        assert!(!t.is_available(A, R2, secs(1.0)));
        assert!(t.is_available(A, R2, secs(2.0)));
        assert_eq!(t.holder(A, secs(2.0)), None);
        assert!(t.leases(secs(2.0)).is_empty());
    }

    #[test]
    fn at_most_one_live_holder() {
        let mut t = ReservationTable::new();
        let robots = [R1, R2, RobotId(2), RobotId(3)];
        for step in 0..200u64 {
            let now = SimTime(step * 100);
            let robot = robots[(step % 4) as usize];
            let seg = SegmentId((step % 3) as u32);
            t.reserve(seg, robot, now, Duration::from_millis(300 + (step % 5) * 400));
            for s in [A, B, C] {
                let live = t.leases(now).into_iter().filter(|l| l.segment == s).count();
                assert!(live <= 1, "segment {s} has {live} live holders at {now}");
            }
        }
    }

    #[test]
    fn release_all_and_held_by() {
        let mut t = ReservationTable::new();
        t.reserve(A, R1, secs(0.0), Duration::from_secs(5));
        t.reserve(B, R1, secs(0.0), Duration::from_secs(5));
        t.reserve(C, R2, secs(0.0), Duration::from_secs(5));
        assert_eq!(t.held_by(R1, secs(1.0)), vec![A, B]);
        t.release_all(R1);
        assert!(t.held_by(R1, secs(1.0)).is_empty());
        assert_eq!(t.held_by(R2, secs(1.0)), vec![C]);
    }
}

// ── Routes ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use super::*;

    #[test]
    fn leases_grow_along_route() {
        let mut t = ReservationTable::new();
        let cfg = ReservationConfig::default();
        assert!(t.reserve_route(&[A, B, C], R1, secs(10.0), &cfg));
        assert_eq!(t.expiry(A, R1), Some(secs(15.0)));
        assert_eq!(t.expiry(B, R1), Some(secs(16.0)));
        assert_eq!(t.expiry(C, R1), Some(secs(17.0)));
    }

    #[test]
    fn blocked_route_commits_nothing() {
        let mut t = ReservationTable::new();
        let cfg = ReservationConfig::default();
        t.reserve(C, R2, secs(0.0), Duration::from_secs(5));
        assert!(!t.reserve_route(&[A, B, C], R1, secs(1.0), &cfg));
        assert_eq!(t.holder(A, secs(1.0)), None);
        assert_eq!(t.holder(B, secs(1.0)), None);
        assert_eq!(t.holder(C, secs(1.0)), Some(R2));
    }

    #[test]
    fn own_leases_do_not_block_route() {
        let mut t = ReservationTable::new();
        let cfg = ReservationConfig::default();
        t.reserve(B, R1, secs(0.0), Duration::from_secs(1));
        assert!(t.reserve_route(&[A, B], R1, secs(0.5), &cfg));
        assert_eq!(t.expiry(B, R1), Some(secs(6.5)));
    }

    #[test]
    fn release_passed_segments() {
        let mut t = ReservationTable::new();
        let cfg = ReservationConfig::default();
        let planned = [A, B, C];
        t.reserve_route(&planned, R1, secs(0.0), &cfg);
        t.release_passed(R1, &planned, C);
        assert_eq!(t.held_by(R1, secs(1.0)), vec![C]);

        // Unknown current segment leaves everything in place.
        t.release_passed(R1, &planned, SegmentId(9));
        assert_eq!(t.held_by(R1, secs(1.0)), vec![C]);

        t.release_route(R1, &planned);
        assert!(t.held_by(R1, secs(1.0)).is_empty());
    }
}
