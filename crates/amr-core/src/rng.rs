//! Deterministic per-robot RNG.
//!
//! Robot `i` draws from a `SmallRng` seeded with
//! `global_seed ^ (i * MIXING_CONSTANT)`, so random job assignment for one
//! robot never depends on how many draws another robot made, and adding
//! robots leaves existing streams untouched.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::RobotId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct RobotRng(SmallRng);

impl RobotRng {
    pub fn new(global_seed: u64, robot: RobotId) -> Self {
        let seed = global_seed ^ (robot.0 as u64).wrapping_mul(MIXING_CONSTANT);
        RobotRng(SmallRng::seed_from_u64(seed))
    }

    /// Choose a random element, or `None` for an empty slice.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }
}
