//! The movement capability each robot is driven through.
//!
//! A [`Vehicle`] owns the robot's pose and follows a queue of control
//! points at a capped speed.  The engine only ever clears the queue, sets
//! the profile or speed cap, appends points, and asks how long the queued
//! motion will take.

use std::collections::VecDeque;
use std::time::Duration;

use amr_core::{MotionConfig, Vec3};

// ── Pose ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Planar unit heading.
    pub heading:  Vec3,
}

impl Pose {
    pub fn new(position: Vec3, heading: Vec3) -> Self {
        Self { position, heading }
    }
}

// ── MotionProfile ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionProfile {
    pub acceleration:  f64,
    pub deceleration:  f64,
    pub max_speed:     f64,
    /// Corner blending factor passed through to the host vehicle.
    pub interpolation: f64,
}

impl MotionProfile {
    /// The nominal profile every segment command starts from.
    pub fn nominal(config: &MotionConfig) -> Self {
        Self {
            acceleration:  config.acceleration,
            deceleration:  config.deceleration,
            max_speed:     config.nominal_speed,
            interpolation: config.interpolation,
        }
    }
}

// ── Vehicle trait ─────────────────────────────────────────────────────────────

/// Host movement behaviour attached to one robot.
pub trait Vehicle: Send {
    fn pose(&self) -> Pose;

    /// Teleport, dropping any queued motion.
    fn place(&mut self, pose: Pose);

    /// Drop all queued control points.
    fn clear_move(&mut self);

    fn set_profile(&mut self, profile: MotionProfile);

    fn max_speed(&self) -> f64;

    fn set_max_speed(&mut self, speed: f64);

    fn add_control_point(&mut self, point: Vec3);

    /// Estimated time to drive through every queued control point from the
    /// current pose.
    fn total_time(&self) -> Duration;

    /// `true` when no control points are queued.
    fn is_idle(&self) -> bool;

    /// Advance the vehicle's own motion by `dt`.
    fn step(&mut self, dt: Duration);
}

// ── KinematicVehicle ──────────────────────────────────────────────────────────

/// Point-mass vehicle: accelerates toward the speed cap, brakes so it can
/// stop on the final control point, and cuts straight lines between
/// points.  Corner blending is not modelled.
#[derive(Clone, Debug)]
pub struct KinematicVehicle {
    pose:    Pose,
    profile: MotionProfile,
    speed:   f64,
    points:  VecDeque<Vec3>,
}

/// Speed floor near the last control point so braking converges.
const CREEP_FLOOR: f64 = 50.0;

impl KinematicVehicle {
    pub fn new(pose: Pose, profile: MotionProfile) -> Self {
        Self { pose, profile, speed: 0.0, points: VecDeque::new() }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn control_points(&self) -> impl Iterator<Item = &Vec3> + '_ {
        self.points.iter()
    }

    /// Planar length of the queued polyline starting at the current pose.
    fn remaining_length(&self) -> f64 {
        let mut from = self.pose.position;
        let mut total = 0.0;
        for &p in &self.points {
            total += from.planar_distance(p);
            from = p;
        }
        total
    }
}

impl Vehicle for KinematicVehicle {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn place(&mut self, pose: Pose) {
        self.pose = pose;
        self.speed = 0.0;
        self.points.clear();
    }

    fn clear_move(&mut self) {
        self.points.clear();
    }

    fn set_profile(&mut self, profile: MotionProfile) {
        self.profile = profile;
    }

    fn max_speed(&self) -> f64 {
        self.profile.max_speed
    }

    fn set_max_speed(&mut self, speed: f64) {
        self.profile.max_speed = speed.max(0.0);
    }

    fn add_control_point(&mut self, point: Vec3) {
        self.points.push_back(point);
    }

    fn total_time(&self) -> Duration {
        let length = self.remaining_length();
        if length <= 0.0 {
            return Duration::ZERO;
        }
        let v = self.profile.max_speed;
        if v <= 0.0 {
            return Duration::MAX;
        }
        let (a, d) = (self.profile.acceleration, self.profile.deceleration);
        let secs = if a <= 0.0 || d <= 0.0 {
            length / v
        } else {
            let ramp = v * v / (2.0 * a) + v * v / (2.0 * d);
            if length >= ramp {
                v / a + v / d + (length - ramp) / v
            } else {
                let peak = (2.0 * length * a * d / (a + d)).sqrt();
                peak / a + peak / d
            }
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    fn is_idle(&self) -> bool {
        self.points.is_empty()
    }

    fn step(&mut self, dt: Duration) {
        if self.points.is_empty() {
            self.speed = 0.0;
            return;
        }
        let dt = dt.as_secs_f64();
        let cap = self.profile.max_speed;
        let braking = (2.0 * self.profile.deceleration.max(0.0) * self.remaining_length()).sqrt();
        let accelerated = self.speed + self.profile.acceleration.max(0.0) * dt;
        self.speed = accelerated.min(braking.max(CREEP_FLOOR)).min(cap);

        let mut travel = self.speed * dt;
        while travel > 0.0 {
            let Some(&next) = self.points.front() else { break };
            let gap = self.pose.position.planar_distance(next);
            let heading = (next - self.pose.position).normalize();
            if heading != Vec3::ZERO {
                self.pose.heading = heading;
            }
            if gap <= travel {
                self.pose.position = next;
                travel -= gap;
                self.points.pop_front();
            } else {
                self.pose.position = self.pose.position.lerp(next, travel / gap);
                travel = 0.0;
            }
        }
        if self.points.is_empty() {
            self.speed = 0.0;
        }
    }
}
