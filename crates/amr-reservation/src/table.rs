//! The lease table.

use std::time::Duration;

use amr_core::{RobotId, SegmentId, SimTime};
use amr_spatial::Availability;

#[cfg(feature = "fx-hash")]
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

/// A live lease, as reported by [`ReservationTable::leases`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lease {
    pub segment: SegmentId,
    pub holder:  RobotId,
    pub expires: SimTime,
}

/// Segment → { robot → expiry }.
///
/// At most one robot holds an unexpired lease on a segment at any instant.
/// The inner map can briefly hold expired entries for other robots; they
/// are swept the next time the segment is touched.
#[derive(Default, Debug)]
pub struct ReservationTable {
    leases: Map<SegmentId, Map<RobotId, SimTime>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease `segment` to `robot` until `now + duration`.
    ///
    /// Succeeds when the segment is free, expired, or already held by
    /// `robot` (the expiry is then reset).  Fails without mutation when
    /// another robot holds an unexpired lease.
    pub fn reserve(&mut self, segment: SegmentId, robot: RobotId, now: SimTime, duration: Duration) -> bool {
        if !self.sweep(segment, robot, now) {
            return false;
        }
        let expires = now + duration;
        self.leases.entry(segment).or_default().insert(robot, expires);
        tracing::trace!(robot = %robot, segment = %segment, expires = %expires, "leased");
        true
    }

    /// `true` if `robot` could lease `segment` at `now`.  Purges expired
    /// entries for the segment as a side effect.
    pub fn is_available(&mut self, segment: SegmentId, robot: RobotId, now: SimTime) -> bool {
        self.sweep(segment, robot, now)
    }

    /// Drop `robot`'s lease on `segment`.  No-op if `robot` is not the holder.
    pub fn release(&mut self, segment: SegmentId, robot: RobotId) {
        if let Some(holders) = self.leases.get_mut(&segment) {
            if holders.remove(&robot).is_some() {
                tracing::trace!(robot = %robot, segment = %segment, "released");
            }
            if holders.is_empty() {
                self.leases.remove(&segment);
            }
        }
    }

    /// Drop every lease held by `robot`.
    pub fn release_all(&mut self, robot: RobotId) {
        self.leases.retain(|_, holders| {
            holders.remove(&robot);
            !holders.is_empty()
        });
    }

    /// The robot holding an unexpired lease on `segment`, if any.
    pub fn holder(&self, segment: SegmentId, now: SimTime) -> Option<RobotId> {
        self.leases
            .get(&segment)?
            .iter()
            .find(|&(_, &expires)| expires > now)
            .map(|(&robot, _)| robot)
    }

    /// Expiry of `robot`'s entry on `segment`, expired or not.
    pub fn expiry(&self, segment: SegmentId, robot: RobotId) -> Option<SimTime> {
        self.leases.get(&segment)?.get(&robot).copied()
    }

    /// All unexpired leases, ordered by segment.
    pub fn leases(&self, now: SimTime) -> Vec<Lease> {
        let mut out: Vec<Lease> = self
            .leases
            .iter()
            .flat_map(|(&segment, holders)| {
                holders
                    .iter()
                    .filter(move |&(_, &expires)| expires > now)
                    .map(move |(&holder, &expires)| Lease { segment, holder, expires })
            })
            .collect();
        out.sort_unstable_by_key(|l| (l.segment, l.holder));
        out
    }

    /// Segments on which `robot` holds an unexpired lease.
    pub fn held_by(&self, robot: RobotId, now: SimTime) -> Vec<SegmentId> {
        self.leases(now).into_iter().filter(|l| l.holder == robot).map(|l| l.segment).collect()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.leases.clear();
    }

    /// Check for a conflicting holder, then purge expired entries.
    ///
    /// Returns `false` (with nothing purged) when another robot holds an
    /// unexpired lease.
    fn sweep(&mut self, segment: SegmentId, robot: RobotId, now: SimTime) -> bool {
        let Some(holders) = self.leases.get_mut(&segment) else {
            return true;
        };
        if holders.iter().any(|(&other, &expires)| other != robot && expires > now) {
            return false;
        }
        holders.retain(|_, &mut expires| expires > now);
        if holders.is_empty() {
            self.leases.remove(&segment);
        }
        true
    }
}

impl Availability for ReservationTable {
    fn is_available(&mut self, segment: SegmentId, robot: RobotId, now: SimTime) -> bool {
        ReservationTable::is_available(self, segment, robot, now)
    }
}
