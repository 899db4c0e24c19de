//! Responses a collision pass asks for, and the per-robot assessment that
//! produces them.

use amr_core::{CoordinationConfig, MotionConfig, RobotId};

use crate::encounter::{Zone, classify, critical_radius, stationary_ahead};
use crate::FleetSnapshot;

/// One adjustment requested for the assessed robot.
///
/// Responses are produced from a read-only [`FleetSnapshot`] and applied
/// afterwards by [`CollisionEngine`][crate::CollisionEngine], which owns
/// every mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// Halt this pass.  `partner` is set when the stop is a yield in a
    /// critical encounter, flagging the robot to coordinate with it.
    Stop { partner: Option<RobotId> },

    /// Start a shared coordination episode with `partner`.
    BeginEpisode { partner: RobotId },

    /// Cap speed at `factor` × nominal.  `early` factors are dropped if the
    /// robot is already coordinating when applied.
    Slow { factor: f64, early: bool },

    /// Detour sideways around the stationary robot `around`.
    Bypass { around: RobotId },
}

/// All responses for one robot from one pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assessment {
    pub responses: Vec<Response>,
}

impl Assessment {
    pub fn should_stop(&self) -> bool {
        self.responses.iter().any(|r| matches!(r, Response::Stop { .. }))
    }
}

/// A bypass point `bypass_distance` to either side of `robot` is clear:
/// no third robot within two radii of it and `obstacle` farther than that.
pub fn bypass_clear(
    snapshot: &FleetSnapshot,
    robot: RobotId,
    obstacle: RobotId,
    motion: &MotionConfig,
    config: &CoordinationConfig,
) -> bool {
    let me = snapshot.view(robot);
    let Some(dir) = me.direction else {
        return false;
    };
    let clearance = 2.0 * config.robot_radius;
    [dir.perp(), -dir.perp()].into_iter().any(|side| {
        let point = me.position + side * motion.bypass_distance;
        let crowded = snapshot
            .ids()
            .filter(|&r| r != robot && r != obstacle)
            .any(|r| snapshot.view(r).position.planar_distance(point) < clearance);
        !crowded && snapshot.view(obstacle).position.planar_distance(point) > clearance
    })
}

/// Evaluate `robot` against every other robot in ascending id order.
///
/// The reservation guard stops the robot outright.  Otherwise, moving
/// encounters map to the critical, coordination, and early tiers, and
/// stationary robots ahead are bypassed or, failing that, stopped for.
/// The scan ends at the first stop.
pub fn assess(
    snapshot: &FleetSnapshot,
    robot: RobotId,
    motion: &MotionConfig,
    config: &CoordinationConfig,
) -> Assessment {
    let mut out = Assessment::default();
    let me = snapshot.view(robot);
    if me.guard_blocked {
        out.responses.push(Response::Stop { partner: None });
        return out;
    }

    for other in snapshot.ids().filter(|&r| r != robot) {
        if let Some(enc) = classify(snapshot, robot, other, config) {
            match enc.zone {
                Zone::Critical => {
                    if snapshot.yields_to(robot, other) {
                        out.responses.push(Response::Stop { partner: Some(other) });
                        break;
                    }
                }
                Zone::Coordination => {
                    if !me.in_coordination {
                        out.responses.push(Response::BeginEpisode { partner: other });
                    }
                    if let Some(factor) = enc.speed_factor(config) {
                        out.responses.push(Response::Slow { factor, early: false });
                    }
                }
                Zone::Early => {
                    if !me.in_coordination {
                        if let Some(factor) = enc.speed_factor(config) {
                            out.responses.push(Response::Slow { factor, early: true });
                        }
                    }
                }
            }
            continue;
        }

        let Some(distance) = stationary_ahead(snapshot, robot, other, config) else {
            continue;
        };
        if distance < critical_radius(snapshot, robot, config) {
            if bypass_clear(snapshot, robot, other, motion, config) {
                out.responses.push(Response::Bypass { around: other });
            } else {
                out.responses.push(Response::Stop { partner: None });
                break;
            }
        } else {
            let factor = if me.approaching_conveyor {
                config.obstacle_conveyor_speed
            } else {
                config.obstacle_speed
            };
            out.responses.push(Response::Slow { factor, early: false });
        }
    }
    out
}
