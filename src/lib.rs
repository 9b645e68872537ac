pub mod common;
pub mod control;
pub mod error;
pub mod simulation;

pub use crate::common::types::{Point2D, Pose2D};
pub use crate::control::pid::{PidController, PidGains};
pub use crate::control::trajectory::Trajectory;
pub use crate::error::SimError;
pub use crate::simulation::config::SimulationConfig;
pub use crate::simulation::{
    simulate, Outcome, RunParams, SimulationEngine, SimulationResult, StepRecord,
};
