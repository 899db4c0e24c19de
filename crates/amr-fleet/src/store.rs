//! Robot storage: `RobotStore` (SoA properties) and `RobotRngs`.
//!
//! RNG state is kept apart from the store so a dispatcher can hold
//! `&mut RobotRngs` while reading `&RobotStore`.

use amr_core::{ItemId, RobotId, RobotRng, SegmentId, Vec3};

// ── RobotRngs ─────────────────────────────────────────────────────────────────

pub struct RobotRngs {
    pub inner: Vec<RobotRng>,
}

impl RobotRngs {
    pub(crate) fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u16).map(|i| RobotRng::new(global_seed, RobotId(i))).collect();
        Self { inner }
    }

    #[inline]
    pub fn get_mut(&mut self, robot: RobotId) -> &mut RobotRng {
        &mut self.inner[robot.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── RobotStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for every robot's externally visible state.
///
/// Every `Vec` has exactly `count` elements indexed by `RobotId`.  Motion
/// bookkeeping that is not exposed as a property lives in
/// `amr_motion::MotionStore`.
pub struct RobotStore {
    pub count: usize,

    // ── Pose ──────────────────────────────────────────────────────────────
    pub position:      Vec<Vec3>,
    /// Planar unit heading.
    pub heading:       Vec<Vec3>,

    // ── Commands (written by the controller) ──────────────────────────────
    pub target:        Vec<Option<SegmentId>>,
    /// Lower value = higher precedence.  Defaults to the robot number.
    pub priority:      Vec<i32>,
    pub stop:          Vec<bool>,
    pub battery:       Vec<i32>,

    // ── Status (written by the simulator) ─────────────────────────────────
    pub location:      Vec<Option<SegmentId>>,
    pub next_location: Vec<Option<SegmentId>>,
    pub carried:       Vec<Option<ItemId>>,
    /// Speed cap last applied to the vehicle.
    pub max_speed:     Vec<f64>,

    /// Spawn poses, restored by [`RobotStore::reset`].
    initial_pose:      Vec<(Vec3, Vec3)>,
}

impl RobotStore {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = RobotId> + '_ {
        (0..self.count as u16).map(RobotId)
    }

    #[inline]
    pub fn is_carrying(&self, robot: RobotId) -> bool {
        self.carried[robot.index()].is_some()
    }

    /// Restore spawn poses and default property values: no target, location,
    /// or cargo, stop cleared, full battery, priority = robot number, speed
    /// cap = `nominal_speed`.
    pub fn reset(&mut self, nominal_speed: f64) {
        for i in 0..self.count {
            let (pos, heading) = self.initial_pose[i];
            self.position[i] = pos;
            self.heading[i] = heading;
            self.target[i] = None;
            self.priority[i] = RobotId(i as u16).number() as i32;
            self.stop[i] = false;
            self.battery[i] = 100;
            self.location[i] = None;
            self.next_location[i] = None;
            self.carried[i] = None;
            self.max_speed[i] = nominal_speed;
        }
    }

    pub(crate) fn new(initial_pose: Vec<(Vec3, Vec3)>, nominal_speed: f64) -> Self {
        let count = initial_pose.len();
        let mut store = Self {
            count,
            position:      vec![Vec3::ZERO; count],
            heading:       vec![Vec3::ZERO; count],
            target:        vec![None; count],
            priority:      vec![0; count],
            stop:          vec![false; count],
            battery:       vec![0; count],
            location:      vec![None; count],
            next_location: vec![None; count],
            carried:       vec![None; count],
            max_speed:     vec![0.0; count],
            initial_pose,
        };
        store.reset(nominal_speed);
        store
    }
}
