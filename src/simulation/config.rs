//! Simulation configuration
//!
//! The defaults reproduce the reference go-to-goal setup: 50 ms steps over a
//! 20 s horizon, a 0.3 m/s linear speed limit and a 5 cm convergence radius.
//! Values can be overridden from a parameter map or a JSON file.

use crate::control::pid::PidGains;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_DT: f64 = 0.05;
pub const DEFAULT_HORIZON: f64 = 20.0;
pub const DEFAULT_MAX_LINEAR_VELOCITY: f64 = 0.3;
pub const DEFAULT_CONVERGENCE_RADIUS: f64 = 0.05;
pub const DEFAULT_HEADING_KD: f64 = 0.1;
pub const DEFAULT_DISTANCE_KD: f64 = 0.05;
/// Upper bound on `ceil(horizon / dt)`
pub const MAX_STEP_BUDGET: usize = 1_000_000;

/// Fixed constants of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integration timestep (s)
    pub dt: f64,
    /// Simulated time budget (s)
    pub horizon: f64,
    /// Linear velocity saturation (m/s)
    pub max_linear_velocity: f64,
    /// Distance below which the robot counts as arrived (m)
    pub convergence_radius: f64,
    pub heading_ki: f64,
    pub heading_kd: f64,
    pub distance_ki: f64,
    pub distance_kd: f64,
    /// Optional bound on both PID integrals
    pub integral_limit: Option<f64>,
    /// Roll back the distance integral while the linear command saturates
    pub anti_windup: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            dt: DEFAULT_DT,
            horizon: DEFAULT_HORIZON,
            max_linear_velocity: DEFAULT_MAX_LINEAR_VELOCITY,
            convergence_radius: DEFAULT_CONVERGENCE_RADIUS,
            heading_ki: 0.0,
            heading_kd: DEFAULT_HEADING_KD,
            distance_ki: 0.0,
            distance_kd: DEFAULT_DISTANCE_KD,
            integral_limit: None,
            anti_windup: false,
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Configure the simulation with parameters
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        // Work on a copy so a rejected map leaves the config untouched
        let mut next = self.clone();
        for (key, &value) in params {
            match key.as_str() {
                "dt" => next.dt = value,
                "horizon" => next.horizon = value,
                "max_linear_velocity" => next.max_linear_velocity = value,
                "convergence_radius" => next.convergence_radius = value,
                "heading_ki" => next.heading_ki = value,
                "heading_kd" => next.heading_kd = value,
                "distance_ki" => next.distance_ki = value,
                "distance_kd" => next.distance_kd = value,
                "integral_limit" => next.integral_limit = Some(value),
                "anti_windup" => next.anti_windup = value != 0.0,
                _ => return Err(SimError::UnknownParameter(key.clone())),
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check every field
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidTimestep(self.dt));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimError::InvalidHorizon(self.horizon));
        }
        let steps = (self.horizon / self.dt).ceil();
        if !(steps <= MAX_STEP_BUDGET as f64) {
            return Err(SimError::StepBudgetExceeded {
                steps,
                max: MAX_STEP_BUDGET,
            });
        }
        positive("max_linear_velocity", self.max_linear_velocity)?;
        positive("convergence_radius", self.convergence_radius)?;
        non_negative("heading_ki", self.heading_ki)?;
        non_negative("heading_kd", self.heading_kd)?;
        non_negative("distance_ki", self.distance_ki)?;
        non_negative("distance_kd", self.distance_kd)?;
        if let Some(limit) = self.integral_limit {
            non_negative("integral_limit", limit)?;
        }
        Ok(())
    }

    /// Step budget, `ceil(horizon / dt)`, never above [`MAX_STEP_BUDGET`]
    pub fn max_steps(&self) -> usize {
        ((self.horizon / self.dt).ceil() as usize).min(MAX_STEP_BUDGET)
    }

    /// Heading PID gains for a given proportional gain
    pub fn heading_gains(&self, kp: f64) -> PidGains {
        PidGains::new(kp, self.heading_ki, self.heading_kd)
    }

    /// Distance PID gains for a given proportional gain
    pub fn distance_gains(&self, kp: f64) -> PidGains {
        PidGains::new(kp, self.distance_ki, self.distance_kd)
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            reason: format!("must be positive, got {}", value),
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            reason: format!("must be non-negative, got {}", value),
        })
    }
}
