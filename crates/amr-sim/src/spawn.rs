//! Fleet start-up: waiting for the declared robot quantity and building the
//! robot store from a serialized spawn list.

use std::time::Duration;

use amr_core::{FleetConfig, RobotId, SimConfig, Vec3};
use amr_fleet::{RobotRngs, RobotStore, RobotStoreBuilder};
use amr_spatial::parse_location_list;
use tracing::{debug, warn};

use crate::{SimError, SimResult};

/// Outcome of [`await_quantity`].
#[derive(Clone, Debug, PartialEq)]
pub struct Startup {
    pub quantity: usize,
    /// Simulated time spent polling plus the settle delay.
    pub waited:   Duration,
}

/// Poll for the declared robot quantity up to `startup_attempts` times,
/// `startup_retry_ms` apart.  A quantity of zero counts as not yet
/// declared.
///
/// # Errors
///
/// [`SimError::StartupTimeout`] when every attempt comes back empty, and
/// [`SimError::Config`] for a quantity above `max_robots`.
pub fn await_quantity<F>(mut poll: F, config: &SimConfig) -> SimResult<Startup>
where
    F: FnMut(u32) -> Option<usize>,
{
    let retry = Duration::from_millis(config.startup_retry_ms);
    for attempt in 0..config.startup_attempts {
        let Some(quantity) = poll(attempt).filter(|&q| q > 0) else {
            continue;
        };
        if quantity > config.max_robots {
            return Err(SimError::Config(format!(
                "declared robot quantity {quantity} exceeds the maximum of {}",
                config.max_robots
            )));
        }
        let waited = retry * attempt + Duration::from_millis(config.startup_settle_ms);
        debug!(quantity, attempts = attempt + 1, "robot quantity declared");
        return Ok(Startup { quantity, waited });
    }
    Err(SimError::StartupTimeout { attempts: config.startup_attempts })
}

/// Build `quantity` robots, posed from a JSON spawn list of
/// `{Name, X, Y, Rz}` entries keyed by instance name.
///
/// Malformed lists are treated as empty.  Robots without an entry are spaced
/// along +x from `origin`; entries naming no robot of this fleet are
/// skipped.
pub fn spawn_fleet(
    quantity: usize,
    locations: &str,
    origin: Vec3,
    config: &FleetConfig,
) -> SimResult<(RobotStore, RobotRngs)> {
    let mut builder = RobotStoreBuilder::new(quantity, config.sim.seed)
        .max_robots(config.sim.max_robots)
        .origin(origin)
        .nominal_speed(config.motion.nominal_speed);
    for rec in parse_location_list(locations) {
        match RobotId::from_instance_name(&rec.name) {
            Some(robot) if robot.index() < quantity => {
                builder = builder.pose(robot.index(), rec.position(), rec.rz);
            }
            _ => warn!(name = %rec.name, "spawn entry names no robot in this fleet"),
        }
    }
    Ok(builder.build()?)
}
