//! The `MotionStore`: per-robot motion state and sparse planned paths.

use std::collections::HashMap;
use std::time::Duration;

use amr_core::{RobotId, SegmentId};

use crate::MotionState;

/// Motion state for every robot plus the planned paths of robots that hold
/// route leases.
///
/// `states` is indexed by `RobotId` and always has one entry per robot.
/// `planned` is sparse: an entry exists from a successful route lease until
/// the journey ends, is abandoned, or is given up during a backup.
pub struct MotionStore {
    pub states:  Vec<MotionState>,
    pub planned: HashMap<RobotId, Vec<SegmentId>>,
    refresh_interval: Duration,
}

impl MotionStore {
    pub fn new(robot_count: usize, refresh_interval: Duration) -> Self {
        Self {
            states: vec![MotionState::idle(refresh_interval); robot_count],
            planned: HashMap::new(),
            refresh_interval,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn state(&self, robot: RobotId) -> &MotionState {
        &self.states[robot.index()]
    }

    #[inline]
    pub fn state_mut(&mut self, robot: RobotId) -> &mut MotionState {
        &mut self.states[robot.index()]
    }

    /// Planned path of `robot`, empty when it holds none.
    pub fn planned(&self, robot: RobotId) -> &[SegmentId] {
        self.planned.get(&robot).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn is_moving(&self, robot: RobotId) -> bool {
        self.states[robot.index()].moving
    }

    /// Return every robot to idle and forget all planned paths.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = MotionState::idle(self.refresh_interval);
        }
        self.planned.clear();
    }
}
