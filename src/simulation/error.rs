//! Error taxonomy for the controller engine.
//!
//! Every variant aborts the operation that raised it. Nothing in the crate
//! retries; the generation-reset cycle is the only restart mechanism.

use std::fmt;

/// Where a shape check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeContext {
    /// Input vector handed to `feed_forward`.
    NetworkInput,
    /// Sensor vector returned by a vehicle.
    SensorInput,
    /// Action vector produced by the network.
    ActionOutput,
    /// Flat parameter vector decoded into a network or swapped into a genome.
    Parameters,
}

impl fmt::Display for ShapeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeContext::NetworkInput => "network input",
            ShapeContext::SensorInput => "sensor input",
            ShapeContext::ActionOutput => "action output",
            ShapeContext::Parameters => "parameter vector",
        };
        f.write_str(name)
    }
}

/// Actuator channel of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Acceleration multiplier.
    Throttle,
    /// Turn multiplier.
    Steer,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Throttle => f.write_str("throttle"),
            ActionKind::Steer => f.write_str("steer"),
        }
    }
}

/// Errors raised by the network, genome, evolution and agent code.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A vector length disagrees with the declared network topology.
    #[error("{context} has length {actual}, expected {expected}")]
    ShapeMismatch {
        /// Which vector was checked.
        context: ShapeContext,
        /// Length required by the topology.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
    /// Configuration rejected before any simulation starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An actuator delta outside `[-1, 1]`.
    #[error("{kind} multiplier {value} outside [-1, 1]")]
    OutOfRangeAction {
        /// Channel that received the value.
        kind: ActionKind,
        /// Offending value.
        value: f64,
    },
    /// Reading or writing a params file failed.
    #[error("params file: {0}")]
    Io(#[from] std::io::Error),
    /// A params file is not valid JSON for [`super::params::Params`].
    #[error("params format: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub(crate) fn shape(context: ShapeContext, expected: usize, actual: usize) -> Self {
        SimulationError::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;
