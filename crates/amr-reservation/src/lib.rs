//! `amr-reservation`: soft-lease reservations on layout segments.
//!
//! A lease grants one robot exclusive use of a segment until its expiry.
//! Leases are not fenced: a robot that stalls past expiry can lose the
//! segment to another robot and later re-acquire it.  Expired entries are
//! purged lazily, on the next lookup or reservation touching the segment.
//!
//! | Module    | Contents                                                   |
//! |-----------|------------------------------------------------------------|
//! | [`table`] | `ReservationTable`: `reserve`, `is_available`, `release`   |
//! | [`route`] | All-or-nothing route leasing, release of passed segments   |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | Uses `rustc_hash::FxHashMap` for the lease maps.         |

pub mod route;
pub mod table;

#[cfg(test)]
mod tests;

pub use table::{Lease, ReservationTable};
