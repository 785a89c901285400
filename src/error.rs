//! Simulation error types.
//!
//! Only configuration and setup can fail. Conditions that arise during a
//! simulation ("no collision this slice", "no makeable shot") are `Option`s
//! on the operations themselves and never reach this type.

use std::fmt;

/// Top-level error enum for table configuration and state setup.
#[derive(Debug)]
pub enum SimError {
    /// A table geometry field is outside its valid range.
    InvalidGeometry {
        /// Name of the offending field.
        field: &'static str,
        /// The value that was rejected.
        value: f64,
        /// Human-readable description of the valid range.
        requirement: &'static str,
    },

    /// A playback setting is outside its valid range.
    InvalidSettings {
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },

    /// A randomized layout could not fit every requested ball on the table.
    Placement {
        /// Balls placed before giving up.
        placed: usize,
        /// Balls requested.
        requested: usize,
    },

    /// A ball id does not exist in the state.
    UnknownBall { id: usize },

    /// A ball in a state is unusable (duplicate id, non-finite motion).
    InvalidBall { id: usize, reason: &'static str },

    /// An event names a pocket or jaw the table does not have.
    UnknownCollider { kind: &'static str, id: usize },

    /// Reading or writing a configuration file failed.
    Io(std::io::Error),

    /// A configuration document could not be parsed.
    Parse(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidGeometry {
                field,
                value,
                requirement,
            } => write!(
                f,
                "invalid table geometry: '{}' = {} (must be {})",
                field, value, requirement
            ),
            SimError::InvalidSettings {
                field,
                value,
                requirement,
            } => write!(
                f,
                "invalid settings: '{}' = {} (must be {})",
                field, value, requirement
            ),
            SimError::Placement { placed, requested } => write!(
                f,
                "could only place {} of {} balls without overlap",
                placed, requested
            ),
            SimError::UnknownBall { id } => write!(f, "no ball with id {}", id),
            SimError::InvalidBall { id, reason } => write!(f, "ball {}: {}", id, reason),
            SimError::UnknownCollider { kind, id } => write!(f, "no {} with id {}", kind, id),
            SimError::Io(e) => write!(f, "IO error: {}", e),
            SimError::Parse(e) => write!(f, "JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(e) => Some(e),
            SimError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Parse(err)
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
