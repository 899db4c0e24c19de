//! Lateral offsets applied uniformly to a leg's control points.

use amr_core::{CoordinationConfig, MotionConfig, RobotId, SegmentId, SimTime, Vec3};
use amr_fleet::RobotStore;
use amr_spatial::Layout;

use crate::MotionState;

/// Unit vector from `robot` toward the center of its NextLocation, or
/// `None` without one.
pub fn movement_direction(layout: &Layout, robots: &RobotStore, robot: RobotId) -> Option<Vec3> {
    let next = robots.next_location[robot.index()]?;
    let dir = (layout.position(next) - robots.position[robot.index()]).normalize();
    (dir != Vec3::ZERO).then_some(dir)
}

/// More than `intersection_footprints` traversable footprints within
/// `intersection_radius` of `pos`.
pub fn near_intersection(layout: &Layout, pos: Vec3, config: &CoordinationConfig) -> bool {
    layout.is_intersection(pos, config.intersection_radius, config.intersection_footprints)
}

/// Lane offset for robots sharing `segment` outside coordination.
///
/// Robots whose Location is `segment` (the caller always counts) and that
/// are not coordinating are ordered by `(priority, id)` and spread
/// symmetrically about the axis, `lane_spacing · lane_compression` apart.
pub fn lane_offset(
    robot: RobotId,
    segment: SegmentId,
    layout: &Layout,
    robots: &RobotStore,
    states: &[MotionState],
    config: &MotionConfig,
) -> Vec3 {
    let mut sharing: Vec<RobotId> = robots
        .ids()
        .filter(|&r| {
            r == robot
                || (robots.location[r.index()] == Some(segment) && !states[r.index()].in_coordination)
        })
        .collect();
    if sharing.len() <= 1 {
        return Vec3::ZERO;
    }
    sharing.sort_by_key(|&r| (robots.priority[r.index()], r));
    let Some(lane) = sharing.iter().position(|&r| r == robot) else {
        return Vec3::ZERO;
    };
    let centred = lane as f64 - (sharing.len() - 1) as f64 / 2.0;
    layout.footprint(segment).perpendicular() * (centred * config.lane_spacing * config.lane_compression)
}

/// Episode offset for `robot` passing `partner` on `segment`.
///
/// Each robot moves away from the side of the segment axis its partner is
/// on, so the two pick opposite sides.  When the partner lies exactly on
/// the axis the higher-precedence robot (lower `(priority, id)`) takes the
/// left-hand side.  The magnitude grows near intersections and when the
/// partner is very close.
pub fn coordinated_offset(
    robot: RobotId,
    partner: RobotId,
    segment: SegmentId,
    layout: &Layout,
    robots: &RobotStore,
    motion: &MotionConfig,
    coordination: &CoordinationConfig,
) -> Vec3 {
    let fp = layout.footprint(segment);
    let pos = robots.position[robot.index()];
    let rel = robots.position[partner.index()] - pos;
    let left = fp.perpendicular();

    // Positive when the partner is right of the axis direction.
    let cross = rel.cross(fp.direction);
    let side = if cross > f64::EPSILON {
        left
    } else if cross < -f64::EPSILON {
        -left
    } else {
        let me = (robots.priority[robot.index()], robot);
        let other = (robots.priority[partner.index()], partner);
        if me < other { left } else { -left }
    };

    let gain = if near_intersection(layout, pos, coordination) {
        coordination.intersection_offset_gain
    } else {
        1.0
    };
    let gap = rel.planar_length();
    let closeness = if gap < 1_000.0 {
        1.4
    } else if gap < 1_500.0 {
        1.2
    } else {
        1.0
    };
    side * (motion.coordinated_lane_spacing * closeness * gain)
}

/// Forward clearance along `direction` from `position`: the nearest robot
/// ahead within `bypass_lateral_window` of the ray, less one robot radius.
pub fn side_clearance(
    position: Vec3,
    direction: Vec3,
    robot: RobotId,
    robots: &RobotStore,
    motion: &MotionConfig,
    coordination: &CoordinationConfig,
) -> f64 {
    let mut clearance = motion.bypass_clearance_start;
    for other in robots.ids().filter(|&r| r != robot) {
        let rel = robots.position[other.index()] - position;
        let ahead = rel.dot(direction);
        if ahead > 0.0 && rel.dot(direction.perp()).abs() < motion.bypass_lateral_window {
            clearance = clearance.min(ahead - coordination.robot_radius);
        }
    }
    clearance.max(0.0)
}

/// Detour of `bypass_distance` to whichever side of the robot's heading
/// has more clearance.  Zero without a movement direction.
pub fn bypass_offset(
    robot: RobotId,
    layout: &Layout,
    robots: &RobotStore,
    motion: &MotionConfig,
    coordination: &CoordinationConfig,
) -> Vec3 {
    let Some(dir) = movement_direction(layout, robots, robot) else {
        return Vec3::ZERO;
    };
    let pos = robots.position[robot.index()];
    let left = dir.perp();
    let side = if side_clearance(pos, left, robot, robots, motion, coordination)
        > side_clearance(pos, -left, robot, robots, motion, coordination)
    {
        left
    } else {
        -left
    };
    side * motion.bypass_distance
}

/// Repulsion from robots within `avoidance_radius`, used on the conveyor
/// approach: each contributes up to `avoidance_max_offset`, linearly
/// stronger the closer it is.
pub fn avoidance_offset(robot: RobotId, robots: &RobotStore, config: &MotionConfig) -> Vec3 {
    let pos = robots.position[robot.index()];
    let mut offset = Vec3::ZERO;
    for other in robots.ids().filter(|&r| r != robot) {
        let away = pos - robots.position[other.index()];
        let d = away.planar_length();
        if d > 0.0 && d < config.avoidance_radius {
            let strength = (config.avoidance_radius - d) / config.avoidance_radius;
            offset += away.normalize() * (strength * config.avoidance_max_offset);
        }
    }
    offset
}

/// Whether `robot`'s coordination episode may end at `now`.
///
/// Requires `min_episode_ms` since the episode started, every other robot
/// at least the safe distance away (the larger one near an intersection),
/// and no robot still closing head-on within the buffered safe distance.
pub fn episode_complete(
    robot: RobotId,
    now: SimTime,
    layout: &Layout,
    robots: &RobotStore,
    states: &[MotionState],
    config: &CoordinationConfig,
) -> bool {
    let started = states[robot.index()].episode_start.unwrap_or(SimTime::ZERO);
    if now.saturating_since(started) < config.min_episode() {
        return false;
    }
    let pos = robots.position[robot.index()];
    let safe = if near_intersection(layout, pos, config) {
        config.intersection_safe_distance
    } else {
        config.safe_distance
    };
    let own_dir = movement_direction(layout, robots, robot);
    robots.ids().filter(|&r| r != robot).all(|other| {
        let d = pos.planar_distance(robots.position[other.index()]);
        if d < safe {
            return false;
        }
        let closing = match (own_dir, movement_direction(layout, robots, other)) {
            (Some(a), Some(b)) => a.dot(b) < config.closing_cosine,
            _ => false,
        };
        !(closing && d < safe * config.closing_buffer)
    })
}
