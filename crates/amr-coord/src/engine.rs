//! The `CollisionEngine`: one collision pass over the whole fleet.

use std::time::Duration;

use amr_core::{Cadence, CoordinationConfig, MotionConfig, RobotId, SimTime};
use amr_fleet::RobotStore;
use amr_motion::{MotionEngine, Vehicle};
use amr_reservation::ReservationTable;
use amr_spatial::Layout;
use tracing::{debug, trace};

use crate::response::{Assessment, Response, assess};
use crate::{FleetSnapshot, RobotView};

/// World state borrowed for one pass.
pub struct CollisionContext<'a, V: Vehicle> {
    pub layout:       &'a Layout,
    pub robots:       &'a mut RobotStore,
    pub motion:       &'a mut MotionEngine<V>,
    pub reservations: &'a mut ReservationTable,
    pub now:          SimTime,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CollisionEvent {
    /// `robot` entered a coordination episode with `partner`.
    EpisodeStarted { robot: RobotId, partner: RobotId },
}

/// Runs the collision pass on its own cadence.
///
/// A pass has two phases:
///
/// 1. **Assess**: capture a [`FleetSnapshot`], then evaluate every robot
///    against it independently.  With feature `parallel` this runs on the
///    Rayon pool.
/// 2. **Apply**: in ascending robot order, write stop flags, coordination
///    markers, bypass targets, and speed caps.
///
/// The pass owns the Stop flag: every robot's flag is rewritten each pass.
pub struct CollisionEngine {
    pub config: CoordinationConfig,
    pub motion: MotionConfig,
    cadence:    Cadence,
}

impl CollisionEngine {
    pub fn new(config: CoordinationConfig, motion: MotionConfig, interval: Duration) -> Self {
        Self { config, motion, cadence: Cadence::new(interval) }
    }

    /// `true` when a pass is due at `now`; arms the next interval.
    pub fn is_due(&mut self, now: SimTime) -> bool {
        self.cadence.is_due(now)
    }

    pub fn reset(&mut self) {
        self.cadence.reset();
    }

    /// Run one pass and return the episodes it started.
    pub fn run<V: Vehicle>(&self, ctx: &mut CollisionContext<'_, V>) -> Vec<CollisionEvent> {
        let snapshot = FleetSnapshot::capture(
            ctx.layout,
            ctx.robots,
            &ctx.motion.store.states,
            ctx.reservations,
            &self.config,
            ctx.now,
        );
        let assessments = self.assess_all(&snapshot);

        let mut events = Vec::new();
        for (robot, assessment) in snapshot.ids().zip(assessments) {
            self.apply(robot, snapshot.view(robot), &assessment, ctx, &mut events);
        }
        ctx.motion.publish_speeds(ctx.robots);
        events
    }

    fn assess_all(&self, snapshot: &FleetSnapshot) -> Vec<Assessment> {
        #[cfg(not(feature = "parallel"))]
        {
            snapshot.ids().map(|r| assess(snapshot, r, &self.motion, &self.config)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            (0..snapshot.len())
                .into_par_iter()
                .map(|i| assess(snapshot, RobotId(i as u16), &self.motion, &self.config))
                .collect()
        }
    }

    fn apply<V: Vehicle>(
        &self,
        robot: RobotId,
        view: &RobotView,
        assessment: &Assessment,
        ctx: &mut CollisionContext<'_, V>,
        events: &mut Vec<CollisionEvent>,
    ) {
        let mut factor = 1.0_f64;
        for response in &assessment.responses {
            match *response {
                Response::Stop { partner: Some(partner) } => {
                    let st = ctx.motion.store.state_mut(robot);
                    st.coordinate = true;
                    st.partner = Some(partner);
                    if !st.in_coordination {
                        st.in_coordination = true;
                        st.episode_start = Some(ctx.now);
                        events.push(CollisionEvent::EpisodeStarted { robot, partner });
                    }
                    debug!(robot = %robot, partner = %partner, t = %ctx.now, "yielding");
                }
                Response::Stop { partner: None } => {}
                Response::BeginEpisode { partner } => {
                    if ctx.motion.store.state(robot).in_coordination {
                        continue;
                    }
                    for (r, p) in [(robot, partner), (partner, robot)] {
                        let st = ctx.motion.store.state_mut(r);
                        st.coordinate = true;
                        st.partner = Some(p);
                        st.in_coordination = true;
                        st.episode_start = Some(ctx.now);
                        st.invalidate();
                        events.push(CollisionEvent::EpisodeStarted { robot: r, partner: p });
                    }
                    debug!(robot = %robot, partner = %partner, t = %ctx.now, "coordination episode started");
                }
                Response::Slow { factor: f, early } => {
                    if early && ctx.motion.store.state(robot).in_coordination {
                        continue;
                    }
                    factor = factor.min(f);
                }
                Response::Bypass { around } => {
                    let st = ctx.motion.store.state_mut(robot);
                    st.bypass_target = Some(around);
                    st.invalidate();
                    debug!(robot = %robot, around = %around, "bypassing stationary robot");
                }
            }
        }

        ctx.robots.stop[robot.index()] = assessment.should_stop();

        // The backup manoeuvre runs at its own speed.
        if ctx.motion.store.state(robot).is_backing_up() {
            return;
        }
        let cap = self.motion.nominal_speed * factor;
        let vehicle = ctx.motion.vehicle_mut(robot);
        if vehicle.max_speed() != cap {
            vehicle.set_max_speed(cap);
            trace!(
                robot = %robot,
                speed = cap,
                docking = view.approaching_conveyor,
                "speed cap changed"
            );
        }
    }
}
