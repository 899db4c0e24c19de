//! Read-only view of the fleet taken at the start of a collision pass.

use amr_core::{CoordinationConfig, RobotId, SimTime, Vec3};
use amr_fleet::RobotStore;
use amr_motion::MotionState;
use amr_motion::offsets::movement_direction;
use amr_reservation::ReservationTable;
use amr_spatial::Layout;

/// What the collision pass needs to know about one robot.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotView {
    pub position:             Vec3,
    /// Unit vector toward NextLocation.
    pub direction:            Option<Vec3>,
    pub moving:               bool,
    pub priority:             i32,
    pub in_coordination:      bool,
    /// Near the junction between the current and next pathway.
    pub in_transition:        bool,
    /// NextLocation is a conveyor within `conveyor_approach`.
    pub approaching_conveyor: bool,
    /// NextLocation is close, outside a transition zone, and leased to
    /// someone else.
    pub guard_blocked:        bool,
}

/// Every robot's [`RobotView`], indexed by `RobotId`.
///
/// Built once per pass by the sequential phase (reservation lookups purge
/// expired leases and so need `&mut`), then shared immutably by the
/// assessment phase.
pub struct FleetSnapshot {
    pub views: Vec<RobotView>,
    pub now:   SimTime,
}

impl FleetSnapshot {
    pub fn capture(
        layout: &Layout,
        robots: &RobotStore,
        states: &[MotionState],
        reservations: &mut ReservationTable,
        config: &CoordinationConfig,
        now: SimTime,
    ) -> Self {
        let views = robots
            .ids()
            .map(|r| {
                let i = r.index();
                let st = &states[i];
                let position = robots.position[i];
                let in_transition = in_transition(layout, position, st, config);
                let next = robots.next_location[i];

                let approaching_conveyor = next.is_some_and(|n| {
                    layout.kind(n).is_conveyor()
                        && position.planar_distance(layout.position(n)) < config.conveyor_approach
                });
                let guard_blocked = !in_transition
                    && next.is_some_and(|n| {
                        position.planar_distance(layout.position(n)) < config.reservation_guard
                            && !reservations.is_available(n, r, now)
                    });

                RobotView {
                    position,
                    direction: movement_direction(layout, robots, r),
                    moving: st.moving,
                    priority: robots.priority[i],
                    in_coordination: st.in_coordination,
                    in_transition,
                    approaching_conveyor,
                    guard_blocked,
                }
            })
            .collect();
        Self { views, now }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    #[inline]
    pub fn view(&self, robot: RobotId) -> &RobotView {
        &self.views[robot.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = RobotId> + '_ {
        (0..self.views.len() as u16).map(RobotId)
    }

    /// `true` when `robot` must yield to `other`: its `(priority, id)` is
    /// the larger one.
    #[inline]
    pub fn yields_to(&self, robot: RobotId, other: RobotId) -> bool {
        (self.view(robot).priority, robot) > (self.view(other).priority, other)
    }
}

/// Moving robot with a following pathway whose junction is within
/// `transition_zone`.
fn in_transition(layout: &Layout, position: Vec3, st: &MotionState, config: &CoordinationConfig) -> bool {
    if !st.moving {
        return false;
    }
    let (Some(&current), Some(&next)) = (st.path.get(st.index), st.path.get(st.index + 1)) else {
        return false;
    };
    let junction = layout.footprint(current).junction(layout.footprint(next));
    position.planar_distance(junction) < config.transition_zone
}
