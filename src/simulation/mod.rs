//! Go-to-goal simulation for the Prometheus differential drive robot
//!
//! A run starts the robot at the origin facing +x, and on every step feeds the
//! distance and heading errors to two PID controllers, saturates the linear
//! command and integrates unicycle kinematics. The run ends when the distance
//! measured at the start of a step is below the convergence radius, or when
//! the step budget is spent.
pub mod config;
pub mod kinematics;

use self::config::SimulationConfig;
use self::kinematics::integrate_unicycle;
use crate::common::types::{Point2D, Pose2D};
use crate::control::controllers::DifferentialDriveController;
use crate::control::pid::PidController;
use crate::control::trajectory::Trajectory;
use crate::error::{Result, SimError};
use log::{debug, info, trace, warn};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Recommended range for the target coordinates (m)
pub const TARGET_RANGE: RangeInclusive<f64> = -5.0..=5.0;
/// Recommended range for the distance proportional gain
pub const KP_DIST_RANGE: RangeInclusive<f64> = 0.1..=3.0;
/// Recommended range for the heading proportional gain
pub const KP_THETA_RANGE: RangeInclusive<f64> = 0.1..=5.0;

/// Externally supplied parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub target_x: f64,
    pub target_y: f64,
    /// Proportional gain of the distance controller
    pub kp_dist: f64,
    /// Proportional gain of the heading controller
    pub kp_theta: f64,
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams {
            target_x: 2.0,
            target_y: 2.0,
            kp_dist: 1.0,
            kp_theta: 2.0,
        }
    }
}

impl RunParams {
    pub fn new(target_x: f64, target_y: f64, kp_dist: f64, kp_theta: f64) -> Self {
        RunParams {
            target_x,
            target_y,
            kp_dist,
            kp_theta,
        }
    }

    pub fn target(&self) -> Point2D {
        Point2D::new(self.target_x, self.target_y)
    }

    /// Names of the parameters that fall outside their recommended range
    pub fn out_of_recommended_range(&self) -> Vec<&'static str> {
        let checks = [
            ("target_x", self.target_x, &TARGET_RANGE),
            ("target_y", self.target_y, &TARGET_RANGE),
            ("kp_dist", self.kp_dist, &KP_DIST_RANGE),
            ("kp_theta", self.kp_theta, &KP_THETA_RANGE),
        ];
        checks
            .iter()
            .filter(|(_, value, range)| !range.contains(value))
            .map(|(name, _, _)| *name)
            .collect()
    }

    fn ensure_finite(&self) -> Result<()> {
        for (name, value) in [
            ("target_x", self.target_x),
            ("target_y", self.target_y),
            ("kp_dist", self.kp_dist),
            ("kp_theta", self.kp_theta),
        ] {
            if !value.is_finite() {
                return Err(SimError::NonFiniteInput { name, value });
            }
        }
        Ok(())
    }
}

/// How a run terminated. Both variants are successful runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The robot came within the convergence radius after `steps` steps
    Converged { steps: usize },
    /// The step budget ran out first
    TimedOut,
}

/// Telemetry for a single integration step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Simulated time at the end of the step (s)
    pub time: f64,
    pub distance: f64,
    pub heading_error: f64,
    pub angular: f64,
    /// Linear command before saturation
    pub raw_linear: f64,
    /// Linear command applied to the robot
    pub linear: f64,
}

/// Result of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub params: RunParams,
    pub trajectory: Trajectory,
    pub final_pose: Pose2D,
    pub outcome: Outcome,
    pub steps: Vec<StepRecord>,
}

impl SimulationResult {
    /// Final heading in radians, unwrapped
    pub fn final_theta(&self) -> f64 {
        self.final_pose.theta
    }

    pub fn final_position(&self) -> Point2D {
        self.final_pose.position()
    }

    /// Unit orientation vector at the final pose
    pub fn heading_vector(&self) -> Vector2<f64> {
        self.final_pose.heading_vector()
    }

    /// Distance between the final position and the target
    pub fn final_error(&self) -> f64 {
        nalgebra::distance(&self.final_position(), &self.params.target())
    }

    pub fn converged(&self) -> bool {
        matches!(self.outcome, Outcome::Converged { .. })
    }

    /// Number of integration steps taken
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Largest linear speed applied during the run
    pub fn peak_linear_speed(&self) -> f64 {
        self.steps.iter().map(|s| s.linear.abs()).fold(0.0, f64::max)
    }
}

/// Fixed-step go-to-goal simulator
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    /// Create an engine, rejecting an invalid configuration
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(SimulationEngine { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build the controller pair for one run
    fn build_controller(&self, params: &RunParams) -> DifferentialDriveController {
        let mut heading = PidController::with_gains(self.config.heading_gains(params.kp_theta));
        let mut distance = PidController::with_gains(self.config.distance_gains(params.kp_dist));
        if let Some(limit) = self.config.integral_limit {
            heading = heading.with_integral_limit(limit);
            distance = distance.with_integral_limit(limit);
        }
        DifferentialDriveController::new(heading, distance, self.config.max_linear_velocity)
            .with_anti_windup(self.config.anti_windup)
    }

    /// Run one simulation from the origin towards the target in `params`
    pub fn run(&self, params: &RunParams) -> Result<SimulationResult> {
        params.ensure_finite()?;
        let out_of_range = params.out_of_recommended_range();
        if !out_of_range.is_empty() {
            warn!("Parameters outside the recommended range: {:?}", out_of_range);
        }

        let dt = self.config.dt;
        let max_steps = self.config.max_steps();
        let target = params.target();

        // Fresh controllers every run, never shared between runs
        let mut controller = self.build_controller(params);
        controller.reset();

        let mut pose = Pose2D::origin();
        let mut trajectory = Trajectory::with_capacity(max_steps + 1);
        trajectory.push(pose.position());
        let mut steps = Vec::with_capacity(max_steps);

        debug!(
            "Starting run towards ({}, {}) with kp_dist={}, kp_theta={}, budget={} steps",
            params.target_x, params.target_y, params.kp_dist, params.kp_theta, max_steps
        );

        // Only a target on the start point skips the loop, anything else takes
        // at least one step before the distance check
        if target == pose.position() {
            info!("Target coincides with the start pose, nothing to do");
            return Ok(SimulationResult {
                params: *params,
                trajectory,
                final_pose: pose,
                outcome: Outcome::Converged { steps: 0 },
                steps,
            });
        }

        let mut outcome = Outcome::TimedOut;
        for step in 0..max_steps {
            let out = controller.compute_velocity(&pose, &target, dt)?;
            pose = integrate_unicycle(&pose, &out.command, dt);
            trajectory.push(pose.position());

            let record = StepRecord {
                time: (step + 1) as f64 * dt,
                distance: out.distance,
                heading_error: out.heading_error,
                angular: out.command.angular,
                raw_linear: out.raw_linear,
                linear: out.command.linear,
            };
            trace!("step {}: {:?} -> {:?}", step, record, pose);
            steps.push(record);

            if out.distance < self.config.convergence_radius {
                outcome = Outcome::Converged { steps: step + 1 };
                break;
            }
        }

        let result = SimulationResult {
            params: *params,
            trajectory,
            final_pose: pose,
            outcome,
            steps,
        };
        match result.outcome {
            Outcome::Converged { steps } => info!(
                "Converged after {} steps ({:.2} s), final error {:.4} m",
                steps,
                steps as f64 * dt,
                result.final_error()
            ),
            Outcome::TimedOut => info!(
                "Timed out after {} steps, final error {:.4} m",
                max_steps,
                result.final_error()
            ),
        }
        Ok(result)
    }
}

/// Run the default simulation and return the trajectory and final heading
pub fn simulate(x_obj: f64, y_obj: f64, kp_dist: f64, kp_theta: f64) -> Result<(Trajectory, f64)> {
    let result = SimulationEngine::default().run(&RunParams::new(x_obj, y_obj, kp_dist, kp_theta))?;
    let theta = result.final_theta();
    Ok((result.trajectory, theta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_in_range() {
        assert!(RunParams::default().out_of_recommended_range().is_empty());
    }

    #[test]
    fn test_out_of_range_params_are_reported() {
        let params = RunParams::new(6.0, 0.0, 0.05, 2.0);
        assert_eq!(params.out_of_recommended_range(), vec!["target_x", "kp_dist"]);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let engine = SimulationEngine::default();
        let err = engine.run(&RunParams::new(f64::NAN, 1.0, 1.0, 2.0));
        assert!(matches!(err, Err(SimError::NonFiniteInput { name: "target_x", .. })));
    }

    #[test]
    fn test_engine_rejects_zero_timestep() {
        let config = SimulationConfig {
            dt: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            SimulationEngine::new(config).err(),
            Some(SimError::InvalidTimestep(0.0))
        );
    }

    #[test]
    fn test_step_times_advance_by_dt() {
        let result = SimulationEngine::default()
            .run(&RunParams::new(1.0, 0.0, 1.0, 2.0))
            .unwrap();
        let first = result.steps[0];
        assert!((first.time - 0.05).abs() < 1e-12);
        // First step faces the target, so all motion is along +x
        assert!((result.trajectory.points()[1].x - 0.015).abs() < 1e-12);
        assert_eq!(result.trajectory.points()[1].y, 0.0);
    }

    #[test]
    fn test_short_horizon_times_out() {
        let config = SimulationConfig {
            horizon: 1.0,
            ..SimulationConfig::default()
        };
        let engine = SimulationEngine::new(config).unwrap();
        let result = engine.run(&RunParams::default()).unwrap();
        assert_eq!(result.outcome, Outcome::TimedOut);
        assert_eq!(result.step_count(), 20);
        assert_eq!(result.trajectory.len(), 21);
    }
}
