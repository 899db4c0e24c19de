use amr_core::{AmrError, RobotId};
use amr_fleet::{FleetError, RobotProperty};
use amr_motion::MotionError;
use amr_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match robot count {expected}")]
    RobotCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("robot quantity not available after {attempts} attempts")]
    StartupTimeout { attempts: u32 },

    #[error("robot {0} is not in the fleet")]
    UnknownRobot(RobotId),

    #[error("segment `{0}` not found in layout")]
    UnknownSegment(String),

    #[error("property {0} is not writable")]
    ReadOnlyProperty(RobotProperty),

    #[error(transparent)]
    Core(#[from] AmrError),

    #[error("fleet error: {0}")]
    Fleet(#[from] FleetError),

    #[error("motion error: {0}")]
    Motion(#[from] MotionError),

    #[error("layout error: {0}")]
    Spatial(#[from] SpatialError),
}

pub type SimResult<T> = Result<T, SimError>;
