//! Controllers for the robot

use super::pid::{PidController, PidGains};
use super::VelocityCommand;
use crate::common::angles::heading_error;
use crate::common::types::{Point2D, Pose2D};
use crate::error::Result;

/// Error signals and commands produced by one controller step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    /// Euclidean distance to the target before the step
    pub distance: f64,
    /// Wrapped heading error before the step
    pub heading_error: f64,
    /// Linear command as computed by the distance PID, before saturation
    pub raw_linear: f64,
    /// Command handed to the drive
    pub command: VelocityCommand,
}

impl ControlOutput {
    /// Whether the linear command had to be clamped
    pub fn saturated(&self) -> bool {
        self.raw_linear != self.command.linear
    }
}

/// A go-to-goal controller for differential drive robots
///
/// Heading and distance errors each drive their own PID. The angular command
/// is passed through as is, the linear command is clamped to
/// `[-max_linear_velocity, max_linear_velocity]`.
#[derive(Debug, Clone)]
pub struct DifferentialDriveController {
    heading_pid: PidController,
    distance_pid: PidController,
    max_linear_velocity: f64,
    anti_windup: bool,
}

impl DifferentialDriveController {
    /// Create a new controller
    pub fn new(heading: PidController, distance: PidController, max_linear_velocity: f64) -> Self {
        DifferentialDriveController {
            heading_pid: heading,
            distance_pid: distance,
            max_linear_velocity,
            anti_windup: false,
        }
    }

    /// Roll back the distance integral on steps where the linear command saturates
    pub fn with_anti_windup(mut self, enabled: bool) -> Self {
        self.anti_windup = enabled;
        self
    }

    /// Reset both PIDs
    pub fn reset(&mut self) {
        self.heading_pid.reset();
        self.distance_pid.reset();
    }

    /// Compute control commands for one step of length `dt`
    pub fn compute_velocity(
        &mut self,
        current_pose: &Pose2D,
        target: &Point2D,
        dt: f64,
    ) -> Result<ControlOutput> {
        let dx = target.x - current_pose.x;
        let dy = target.y - current_pose.y;

        let distance = dx.hypot(dy);
        // atan2(0, 0) is 0, so the degenerate case at the target is harmless
        let desired_heading = dy.atan2(dx);
        let heading_error = heading_error(desired_heading, current_pose.theta);

        let angular = self.heading_pid.update(heading_error, dt)?;
        let raw_linear = self.distance_pid.update(distance, dt)?;
        let linear = raw_linear.clamp(-self.max_linear_velocity, self.max_linear_velocity);

        let output = ControlOutput {
            distance,
            heading_error,
            raw_linear,
            command: VelocityCommand { linear, angular },
        };
        if self.anti_windup && output.saturated() {
            self.distance_pid.rollback_integral();
        }
        Ok(output)
    }

    pub fn heading_gains(&self) -> PidGains {
        self.heading_pid.gains()
    }

    pub fn distance_gains(&self) -> PidGains {
        self.distance_pid.gains()
    }

    /// Accumulated integral of the distance PID
    pub fn distance_integral(&self) -> f64 {
        self.distance_pid.integral()
    }

    pub fn max_linear_velocity(&self) -> f64 {
        self.max_linear_velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn controller(max_v: f64) -> DifferentialDriveController {
        DifferentialDriveController::new(
            PidController::new(2.0, 0.0, 0.0),
            PidController::new(1.0, 0.0, 0.0),
            max_v,
        )
    }

    #[test]
    fn test_linear_command_is_saturated() {
        let mut ctrl = controller(0.3);
        let out = ctrl
            .compute_velocity(&Pose2D::origin(), &Point2D::new(3.0, 4.0), 0.05)
            .unwrap();
        assert_relative_eq!(out.distance, 5.0);
        assert_relative_eq!(out.raw_linear, 5.0);
        assert_relative_eq!(out.command.linear, 0.3);
        assert!(out.saturated());
    }

    #[test]
    fn test_angular_command_is_not_saturated() {
        let mut ctrl = controller(0.3);
        let out = ctrl
            .compute_velocity(&Pose2D::origin(), &Point2D::new(0.0, 1.0), 0.05)
            .unwrap();
        assert_relative_eq!(out.heading_error, FRAC_PI_2);
        assert_relative_eq!(out.command.angular, 2.0 * FRAC_PI_2);
    }

    #[test]
    fn test_unbounded_heading_is_wrapped_in_error() {
        let mut ctrl = controller(0.3);
        let pose = Pose2D::new(0.0, 0.0, 4.0 * std::f64::consts::PI);
        let out = ctrl
            .compute_velocity(&pose, &Point2D::new(1.0, 0.0), 0.05)
            .unwrap();
        assert!(out.heading_error.abs() < 1e-9);
    }

    #[test]
    fn test_at_target_gives_zero_errors() {
        let mut ctrl = controller(0.3);
        let out = ctrl
            .compute_velocity(&Pose2D::origin(), &Point2D::origin(), 0.05)
            .unwrap();
        assert_eq!(out.distance, 0.0);
        assert_eq!(out.heading_error, 0.0);
        assert_eq!(out.command, VelocityCommand::default());
    }

    #[test]
    fn test_anti_windup_freezes_integral_while_saturated() {
        let mut plain = DifferentialDriveController::new(
            PidController::new(2.0, 0.0, 0.0),
            PidController::new(1.0, 0.5, 0.0),
            0.3,
        );
        let mut guarded = plain.clone().with_anti_windup(true);
        let target = Point2D::new(4.0, 0.0);
        for _ in 0..10 {
            plain.compute_velocity(&Pose2D::origin(), &target, 0.05).unwrap();
            guarded.compute_velocity(&Pose2D::origin(), &target, 0.05).unwrap();
        }
        assert_relative_eq!(plain.distance_integral(), 2.0, epsilon = 1e-9);
        assert_eq!(guarded.distance_integral(), 0.0);
    }

    #[test]
    fn test_anti_windup_keeps_integral_when_unsaturated() {
        let mut ctrl = DifferentialDriveController::new(
            PidController::new(2.0, 0.0, 0.0),
            PidController::new(1.0, 0.5, 0.0),
            0.3,
        )
        .with_anti_windup(true);
        let out = ctrl
            .compute_velocity(&Pose2D::origin(), &Point2D::new(0.1, 0.0), 0.05)
            .unwrap();
        assert!(!out.saturated());
        assert_relative_eq!(ctrl.distance_integral(), 0.005, epsilon = 1e-12);
    }
}
