//! Control module for Prometheus robot
pub mod controllers;
pub mod pid;
pub mod trajectory;

use serde::{Deserialize, Serialize};

/// Velocity command for the robot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}
