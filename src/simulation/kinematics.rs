//! Unicycle kinematics

use crate::common::types::Pose2D;
use crate::control::VelocityCommand;

/// Advance `pose` by one explicit Euler step of length `dt`.
///
/// The position update uses the heading from before the step, the heading is
/// then advanced by `angular * dt` without wrapping.
pub fn integrate_unicycle(pose: &Pose2D, command: &VelocityCommand, dt: f64) -> Pose2D {
    Pose2D {
        x: pose.x + command.linear * pose.theta.cos() * dt,
        y: pose.y + command.linear * pose.theta.sin() * dt,
        theta: pose.theta + command.angular * dt,
    }
}
