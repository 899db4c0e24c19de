//! Pickup, drop-off, and carried-item tracking.
//!
//! A robot handles cargo only while stationary at its target conveyor.
//! Ownership is claimed through [`ItemStore::claim`], so an item tagged by
//! one robot can never be picked up by another.

use amr_core::{CargoConfig, ItemId, RobotId, SegmentId, SegmentKind, SimTime, Vec3};
use amr_fleet::{FleetResult, ItemStore, RobotStore};
use amr_spatial::Layout;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum CargoEvent {
    PickedUp { robot: RobotId, item: ItemId, conveyor: SegmentId },
    DroppedOff { robot: RobotId, item: ItemId, conveyor: SegmentId },
}

/// Attach `item` to `robot` and lift it onto the robot's rear.
///
/// # Errors
///
/// [`FleetError::ItemOwned`][amr_fleet::FleetError::ItemOwned] if another
/// robot already carries it.
pub fn pick_up(
    robot: RobotId,
    item: ItemId,
    robots: &mut RobotStore,
    items: &mut ItemStore,
    config: &CargoConfig,
) -> FleetResult<()> {
    items.claim(item, robot)?;
    let pos = robots.position[robot.index()];
    items.set_position(item, Vec3::new(pos.x - config.trail, pos.y, pos.z + config.lift));
    robots.carried[robot.index()] = Some(item);
    Ok(())
}

/// Place the carried item on `conveyor`'s surface and clear the job.
/// Returns the item, or `None` if the robot carries nothing.
pub fn drop_off(
    robot: RobotId,
    conveyor: SegmentId,
    layout: &Layout,
    robots: &mut RobotStore,
    items: &mut ItemStore,
) -> FleetResult<Option<ItemId>> {
    let i = robot.index();
    let Some(item) = robots.carried[i] else {
        return Ok(None);
    };
    let segment = layout.segment(conveyor);
    let surface = segment.position() + Vec3::new(0.0, 0.0, segment.surface_height);
    items.release_at(item, surface)?;
    robots.carried[i] = None;
    robots.target[i] = None;
    robots.next_location[i] = None;
    Ok(Some(item))
}

/// Run cargo handling for a stationary `robot`.
///
/// Marks the robot as located at its target conveyor once within
/// `arrival` of it, then picks up the closest unowned item at an input
/// conveyor, or drops off at an output conveyor.
pub fn handle(
    robot: RobotId,
    layout: &Layout,
    robots: &mut RobotStore,
    items: &mut ItemStore,
    config: &CargoConfig,
    arrival: f64,
    now: SimTime,
) -> Option<CargoEvent> {
    let i = robot.index();
    let target = robots.target[i]?;
    let kind = layout.kind(target);
    if !kind.is_conveyor() {
        return None;
    }
    let dock = layout.position(target);
    let distance = robots.position[i].planar_distance(dock);
    if robots.location[i] != Some(target) {
        if distance >= arrival {
            return None;
        }
        robots.location[i] = Some(target);
    }

    match kind {
        SegmentKind::InputConveyor => {
            if robots.is_carrying(robot) || distance > config.dock_range {
                return None;
            }
            let item = items.nearest_unowned(dock, config.pickup_radius)?;
            if let Err(e) = pick_up(robot, item, robots, items, config) {
                warn!(robot = %robot, item = %item, error = %e, "pickup refused");
                return None;
            }
            info!(robot = %robot, item = %items.name(item), conveyor = %layout.name(target), t = %now, "picked up");
            Some(CargoEvent::PickedUp { robot, item, conveyor: target })
        }
        _ => match drop_off(robot, target, layout, robots, items) {
            Ok(Some(item)) => {
                info!(robot = %robot, item = %items.name(item), conveyor = %layout.name(target), t = %now, "dropped off");
                Some(CargoEvent::DroppedOff { robot, item, conveyor: target })
            }
            Ok(None) => None,
            Err(e) => {
                warn!(robot = %robot, error = %e, "drop-off failed");
                None
            }
        },
    }
}

/// Move every carried item to trail its robot: `trail` behind along the
/// heading, `lift` above.  Items whose tag no longer names the carrier are
/// let go.
pub fn trail_carried(robots: &mut RobotStore, items: &mut ItemStore, config: &CargoConfig) {
    for i in 0..robots.count {
        let Some(item) = robots.carried[i] else { continue };
        let robot = RobotId(i as u16);
        if items.owner(item) != Some(robot) {
            robots.carried[i] = None;
            continue;
        }
        let at = robots.position[i] - robots.heading[i] * config.trail + Vec3::new(0.0, 0.0, config.lift);
        items.set_position(item, at);
    }
}
