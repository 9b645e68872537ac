//! PID controller

use crate::error::{Result, SimError};

/// Proportional, integral and derivative gains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        PidGains { kp, ki, kd }
    }
}

/// A single-input single-output PID controller
///
/// The controller works on an error sample supplied by the caller and returns
/// an unclamped command. Saturating the command is left to the caller.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    integral: f64,
    prev_error: f64,
    // Symmetric bound on the accumulated integral, off by default
    integral_limit: Option<f64>,
    // Integral increment applied by the most recent update
    last_increment: f64,
}

impl PidController {
    /// Create a new controller with zeroed state
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self::with_gains(PidGains::new(kp, ki, kd))
    }

    /// Create a new controller from a set of gains
    pub fn with_gains(gains: PidGains) -> Self {
        PidController {
            gains,
            integral: 0.0,
            prev_error: 0.0,
            integral_limit: None,
            last_increment: 0.0,
        }
    }

    /// Bound the accumulated integral to `[-limit, limit]`
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit.abs());
        self
    }

    /// Clear the integral and the remembered error
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.last_increment = 0.0;
    }

    /// Feed one error sample taken `dt` seconds after the previous one.
    ///
    /// Fails with [`SimError::InvalidTimestep`] when `dt` is not a finite
    /// positive number, leaving the controller state untouched.
    pub fn update(&mut self, error: f64, dt: f64) -> Result<f64> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimestep(dt));
        }

        let before = self.integral;
        self.integral += error * dt;
        if let Some(limit) = self.integral_limit {
            self.integral = self.integral.clamp(-limit, limit);
        }
        self.last_increment = self.integral - before;

        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;

        Ok(self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative)
    }

    /// Undo the integral increment of the last update.
    ///
    /// Used for conditional integration when the caller had to saturate the
    /// command produced by that update.
    pub fn rollback_integral(&mut self) {
        self.integral -= self.last_increment;
        self.last_increment = 0.0;
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Accumulated integral of the error
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error passed to the most recent update
    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_update_uses_zero_previous_error() {
        let mut pid = PidController::new(2.0, 0.0, 0.1);
        let out = pid.update(1.0, 0.05).unwrap();
        // 2.0 * 1.0 + 0.1 * (1.0 - 0.0) / 0.05
        assert_relative_eq!(out, 4.0, epsilon = 1e-12);
        assert_eq!(pid.prev_error(), 1.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        pid.update(2.0, 0.5).unwrap();
        let out = pid.update(2.0, 0.5).unwrap();
        assert_relative_eq!(pid.integral(), 2.0);
        assert_relative_eq!(out, 2.0);
    }

    #[test]
    fn test_derivative_of_constant_error_vanishes() {
        let mut pid = PidController::new(1.0, 0.0, 5.0);
        pid.update(0.7, 0.1).unwrap();
        let out = pid.update(0.7, 0.1).unwrap();
        assert_relative_eq!(out, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_output_is_not_clamped() {
        let mut pid = PidController::new(100.0, 0.0, 0.0);
        assert_relative_eq!(pid.update(10.0, 0.05).unwrap(), 1000.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        pid.update(3.0, 0.1).unwrap();
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.prev_error(), 0.0);

        let mut fresh = PidController::new(1.0, 1.0, 1.0);
        assert_eq!(pid.update(0.4, 0.1), fresh.update(0.4, 0.1));
    }

    #[test]
    fn test_rejects_non_positive_dt() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);
        assert_eq!(pid.update(1.0, 0.0), Err(SimError::InvalidTimestep(0.0)));
        assert_eq!(pid.update(1.0, -0.1), Err(SimError::InvalidTimestep(-0.1)));
        assert!(pid.update(1.0, f64::NAN).is_err());
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.prev_error(), 0.0);
    }

    #[test]
    fn test_integral_limit_bounds_accumulation() {
        let mut pid = PidController::new(0.0, 1.0, 0.0).with_integral_limit(0.5);
        for _ in 0..100 {
            pid.update(1.0, 0.1).unwrap();
        }
        assert_relative_eq!(pid.integral(), 0.5);
    }

    #[test]
    fn test_rollback_undoes_last_increment() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        pid.update(1.0, 0.1).unwrap();
        pid.update(2.0, 0.1).unwrap();
        pid.rollback_integral();
        assert_relative_eq!(pid.integral(), 0.1, epsilon = 1e-12);
        // A second rollback is a no-op
        pid.rollback_integral();
        assert_relative_eq!(pid.integral(), 0.1, epsilon = 1e-12);
    }
}
