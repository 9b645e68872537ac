//! Error types for the simulator

use thiserror::Error;

/// Errors produced while configuring or running a simulation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// The integration timestep must be finite and strictly positive
    #[error("timestep must be finite and positive, got {0}")]
    InvalidTimestep(f64),

    /// The simulation horizon must be finite and strictly positive
    #[error("horizon must be finite and positive, got {0}")]
    InvalidHorizon(f64),

    /// `horizon / dt` asks for more steps than a run may take
    #[error("step budget of {steps} exceeds the limit of {max} steps")]
    StepBudgetExceeded { steps: f64, max: usize },

    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A run parameter was NaN or infinite
    #[error("`{name}` must be finite, got {value}")]
    NonFiniteInput { name: &'static str, value: f64 },

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// A configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
