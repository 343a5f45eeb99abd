//! Error types for kepler-sweep.
//!
//! Every fallible operation returns `Result<T, KeplerError>`. Solver
//! non-convergence is deliberately absent: it yields a best estimate, not an
//! error.

use thiserror::Error;

/// Result type alias for kepler-sweep operations.
pub type KeplerResult<T> = Result<T, KeplerError>;

/// Unified error type for all kepler-sweep operations.
#[derive(Debug, Error)]
pub enum KeplerError {
    // ===== Orbit parameter errors =====
    /// Eccentricity outside the supported elliptical range `[0, 1)`.
    #[error("eccentricity {value} outside supported range [0, 1)")]
    InvalidEccentricity {
        /// Rejected value.
        value: f64,
    },

    /// Semi-major axis not finite and positive.
    #[error("semi-major axis must be finite and positive, got {value}")]
    InvalidSemiMajorAxis {
        /// Rejected value.
        value: f64,
    },

    /// Time step (or speed multiplier) not finite and positive.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidStep {
        /// Which parameter was rejected.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Wedge count of zero.
    #[error("wedge count must be at least 1, got {0}")]
    InvalidWedgeCount(usize),

    // ===== Guard violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("guard: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Focal distance at or below zero.
    #[error("guard: non-positive radius {radius:.3e}")]
    NonPositiveRadius {
        /// Offending focal distance.
        radius: f64,
    },

    /// Cartesian velocity disagrees with the vis-viva magnitude.
    #[error("guard: vis-viva mismatch {mismatch:.3e} exceeds tolerance {tolerance:.3e}")]
    VisVivaMismatch {
        /// Relative speed mismatch.
        mismatch: f64,
        /// Configured tolerance.
        tolerance: f64,
    },

    // ===== Configuration errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Schema validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O errors =====
    /// File or stream I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KeplerError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a non-finite value error for the given location.
    #[must_use]
    pub fn non_finite(location: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            location: location.into(),
        }
    }

    /// Check if this error came from a runtime guard.
    #[must_use]
    pub const fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteValue { .. }
                | Self::NonPositiveRadius { .. }
                | Self::VisVivaMismatch { .. }
        )
    }
}
