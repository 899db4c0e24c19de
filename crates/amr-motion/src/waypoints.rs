//! Control point generation for one segment leg.
//!
//! All functions are pure geometry over footprints so they can be tested
//! without an engine.

use amr_core::{BoundaryDensity, Footprint, MotionConfig, Vec3, closest_pair, nearest_point};

/// What follows the current segment on the route.
#[derive(Copy, Clone, Debug)]
pub enum NextHop<'a> {
    Pathway(&'a Footprint),
    Conveyor(Vec3),
    None,
}

/// Exit point of `current` toward `next`.
///
/// Toward a pathway this is the current footprint's half of the closest
/// boundary pair; toward a conveyor it is the boundary point nearest the
/// conveyor; with no next hop it is the segment center.
pub fn exit_point(current: &Footprint, next: NextHop<'_>) -> Vec3 {
    let boundary = || current.boundary_points(BoundaryDensity::DEFAULT);
    match next {
        NextHop::Pathway(fp) => {
            closest_pair(&boundary(), &fp.boundary_points(BoundaryDensity::DEFAULT))
                .map(|(exit, _)| exit)
                .unwrap_or(current.center)
        }
        NextHop::Conveyor(at) => nearest_point(&boundary(), at).unwrap_or(current.center),
        NextHop::None => current.center,
    }
}

/// Boundary point of `fp` closest to `robot`.
pub fn entry_point(fp: &Footprint, robot: Vec3) -> Vec3 {
    nearest_point(&fp.boundary_points(BoundaryDensity::DEFAULT), robot).unwrap_or(fp.center)
}

/// Turning point for a leg whose heading changes sharply.
///
/// Present only when entry→exit is longer than `turn_min_travel` and the
/// cosine between robot→entry and entry→exit is below `turn_cosine`.  The
/// point sits `turn_fraction` of the way from entry to exit, pulled
/// `turn_center_pull` toward the segment center.
pub fn intermediate_point(
    robot: Vec3,
    fp: &Footprint,
    entry: Vec3,
    exit: Vec3,
    config: &MotionConfig,
) -> Option<Vec3> {
    if entry.planar_distance(exit) <= config.turn_min_travel {
        return None;
    }
    let approach = (entry - robot).normalize();
    let leg = (exit - entry).normalize();
    if approach == Vec3::ZERO || leg == Vec3::ZERO || approach.dot(leg) >= config.turn_cosine {
        return None;
    }
    let point = entry.lerp(exit, config.turn_fraction);
    Some(point + (fp.center - point).normalize() * config.turn_center_pull)
}

/// Entry, optional turning point, and exit for one leg.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LegPoints {
    pub entry:        Vec3,
    pub intermediate: Option<Vec3>,
    pub exit:         Vec3,
}

impl LegPoints {
    pub fn compute(robot: Vec3, fp: &Footprint, next: NextHop<'_>, config: &MotionConfig) -> Self {
        let entry = entry_point(fp, robot);
        let exit = exit_point(fp, next);
        let intermediate = intermediate_point(robot, fp, entry, exit, config);
        Self { entry, intermediate, exit }
    }

    /// Raw control points for the leg.
    ///
    /// Inside the footprint the robot heads for the exit, through the
    /// turning point only if that detour stays under `turn_detour_ratio`.
    /// Outside it enters first, unless the exit is already nearer than
    /// `skip_entry_ratio` times the entry distance.
    pub fn control_points(&self, robot: Vec3, fp: &Footprint, config: &MotionConfig) -> Vec<Vec3> {
        let mut points = Vec::with_capacity(3);
        if fp.contains(robot) {
            if let Some(mid) = self.intermediate {
                let via = robot.planar_distance(mid) + mid.planar_distance(self.exit);
                if via < robot.planar_distance(self.exit) * config.turn_detour_ratio {
                    points.push(mid);
                }
            }
        } else if robot.planar_distance(self.exit) >= robot.planar_distance(self.entry) * config.skip_entry_ratio {
            points.push(self.entry);
            points.extend(self.intermediate);
        }
        points.push(self.exit);
        points
    }
}

/// Axis traversal of the last pathway before a conveyor: samples from the
/// one nearest the robot toward the end nearest the conveyor, closing on
/// that end if the last sample is more than `final_end_append` short.
pub fn final_traversal(robot: Vec3, fp: &Footprint, conveyor: Vec3, config: &MotionConfig) -> Vec<Vec3> {
    let samples = fp.axis_points(config.final_axis_samples.max(2));
    let target = fp.nearest_end(conveyor);
    let closest = samples
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.planar_distance(robot).total_cmp(&b.1.planar_distance(robot)))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut points: Vec<Vec3> = if target == fp.end() {
        samples[closest..].to_vec()
    } else {
        samples[..=closest].iter().rev().copied().collect()
    };
    match points.last() {
        Some(last) if last.planar_distance(target) > config.final_end_append => points.push(target),
        None => points.push(target),
        _ => {}
    }
    points
}

/// Drop points within `spacing` of the previously kept one.
pub fn dedup(points: &[Vec3], spacing: f64) -> Vec<Vec3> {
    let mut out: Vec<Vec3> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|last| last.planar_distance(p) > spacing) {
            out.push(p);
        }
    }
    out
}

/// With more than three points keep the first, every other interior point
/// starting at the third, and the last.
pub fn thin(points: Vec<Vec3>) -> Vec<Vec3> {
    if points.len() <= 3 {
        return points;
    }
    let last = points.len() - 1;
    let mut out = Vec::with_capacity(points.len() / 2 + 2);
    out.push(points[0]);
    out.extend(points[2..last].iter().step_by(2).copied());
    out.push(points[last]);
    out
}

/// Dedup then thin, falling back to `fallback` if nothing survives.
pub fn finish(points: &[Vec3], fallback: Vec3, config: &MotionConfig) -> Vec<Vec3> {
    let kept = dedup(points, config.dedup_spacing);
    if kept.is_empty() { vec![fallback] } else { thin(kept) }
}
