use amr_core::RobotId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("{vehicles} vehicles supplied for {robots} robots")]
    VehicleCount { robots: usize, vehicles: usize },

    #[error("robot {0} is not managed by this engine")]
    UnknownRobot(RobotId),

    #[error("robot {0} was given a journey with no pathways and no conveyor")]
    EmptyJourney(RobotId),
}

pub type MotionResult<T> = Result<T, MotionError>;
