//! Pairwise encounter classification.

use amr_core::{CoordinationConfig, RobotId};

use crate::FleetSnapshot;

/// Relative heading of two mutually approaching robots.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncounterKind {
    /// Directions within `head_on_cosine` of opposite.
    HeadOn,
    Crossing,
}

/// Distance band of an encounter, nearest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Zone {
    Critical,
    Coordination,
    Early,
}

/// `robot` and `other`, both moving, are closing on each other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Encounter {
    pub robot:    RobotId,
    pub other:    RobotId,
    pub kind:     EncounterKind,
    pub zone:     Zone,
    pub distance: f64,
}

impl Encounter {
    /// Speed multiplier for the soft tiers; `None` for the critical zone.
    pub fn speed_factor(&self, config: &CoordinationConfig) -> Option<f64> {
        match (self.zone, self.kind) {
            (Zone::Critical, _) => None,
            (Zone::Coordination, EncounterKind::HeadOn) => Some(config.head_on_coordination_speed),
            (Zone::Coordination, EncounterKind::Crossing) => Some(config.crossing_coordination_speed),
            (Zone::Early, EncounterKind::HeadOn) => Some(config.head_on_early_speed),
            (Zone::Early, EncounterKind::Crossing) => Some(config.crossing_early_speed),
        }
    }
}

/// Critical radius for `robot`, widened while it crosses a junction.
pub fn critical_radius(snapshot: &FleetSnapshot, robot: RobotId, config: &CoordinationConfig) -> f64 {
    if snapshot.view(robot).in_transition {
        config.critical_zone_transition
    } else {
        config.critical_zone
    }
}

/// Classify `robot` against `other` from `robot`'s side.
///
/// Both must be moving with a known direction, within `early_zone`, and each
/// must be heading toward the other (positive projection of the relative
/// position onto its own direction).
pub fn classify(
    snapshot: &FleetSnapshot,
    robot: RobotId,
    other: RobotId,
    config: &CoordinationConfig,
) -> Option<Encounter> {
    let me = snapshot.view(robot);
    let them = snapshot.view(other);
    if !me.moving || !them.moving {
        return None;
    }
    let distance = me.position.planar_distance(them.position);
    if distance >= config.early_zone {
        return None;
    }
    let (Some(mine), Some(theirs)) = (me.direction, them.direction) else {
        return None;
    };
    let toward = them.position - me.position;
    if toward.dot(mine) <= 0.0 || (-toward).dot(theirs) <= 0.0 {
        return None;
    }

    let kind = if mine.dot(theirs) < config.head_on_cosine {
        EncounterKind::HeadOn
    } else {
        EncounterKind::Crossing
    };
    let zone = if distance < critical_radius(snapshot, robot, config) {
        Zone::Critical
    } else if distance < config.coordination_zone {
        Zone::Coordination
    } else {
        Zone::Early
    };
    Some(Encounter { robot, other, kind, zone, distance })
}

/// `other` is stationary, within `stationary_range` of the moving `robot`,
/// and ahead of it.  Returns the distance.
pub fn stationary_ahead(
    snapshot: &FleetSnapshot,
    robot: RobotId,
    other: RobotId,
    config: &CoordinationConfig,
) -> Option<f64> {
    let me = snapshot.view(robot);
    let them = snapshot.view(other);
    if !me.moving || them.moving {
        return None;
    }
    let distance = me.position.planar_distance(them.position);
    if distance >= config.stationary_range {
        return None;
    }
    let dir = me.direction?;
    ((them.position - me.position).dot(dir) > 0.0).then_some(distance)
}
