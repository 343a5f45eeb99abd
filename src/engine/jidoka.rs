//! Jidoka (自働化) - stop-on-defect checks for each propagated state.
//!
//! The analytic propagator cannot drift, but it can still produce garbage
//! when fed degenerate input. Every new [`OrbitState`] is checked:
//!
//! - Non-finite position, velocity or radius halts the run
//! - A non-positive radius halts the run
//! - A Cartesian speed that disagrees with vis-viva raises a warning
//!
//! Halting pauses the simulation; it never panics.

use serde::{Deserialize, Serialize};

use crate::error::KeplerError;
use crate::orbit::state::OrbitState;

/// Default relative tolerance between Cartesian and vis-viva speed.
pub const DEFAULT_VIS_VIVA_TOLERANCE: f64 = 1e-9;

/// Guard response for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaResponse {
    /// All checks passed.
    Continue,
    /// Suspicious but usable state.
    Warning {
        violation: JidokaViolation,
    },
    /// Unusable state; the run must stop.
    Halt {
        violation: JidokaViolation,
    },
}

impl JidokaResponse {
    /// Check if this response allows continuation.
    #[must_use]
    pub fn can_continue(&self) -> bool {
        matches!(self, Self::Continue | Self::Warning { .. })
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    #[must_use]
    pub fn should_halt(&self) -> bool {
        matches!(self, Self::Halt { .. })
    }
}

/// Defects the guard can detect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaViolation {
    /// NaN or infinity in a state field.
    NonFinite {
        field: String,
    },
    /// Focal distance at or below zero.
    NonPositiveRadius {
        radius: f64,
    },
    /// Velocity magnitude disagrees with vis-viva.
    VisVivaMismatch {
        mismatch: f64,
        tolerance: f64,
    },
}

impl std::fmt::Display for JidokaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "Non-finite {field}"),
            Self::NonPositiveRadius { radius } => write!(f, "Non-positive radius {radius:.3e}"),
            Self::VisVivaMismatch { mismatch, tolerance } => {
                write!(f, "Vis-viva mismatch {mismatch:.2e} exceeds tolerance {tolerance:.2e}")
            }
        }
    }
}

impl From<JidokaViolation> for KeplerError {
    fn from(violation: JidokaViolation) -> Self {
        match violation {
            JidokaViolation::NonFinite { field } => Self::NonFiniteValue { location: field },
            JidokaViolation::NonPositiveRadius { radius } => Self::NonPositiveRadius { radius },
            JidokaViolation::VisVivaMismatch { mismatch, tolerance } => {
                Self::VisVivaMismatch { mismatch, tolerance }
            }
        }
    }
}

/// Guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JidokaConfig {
    /// Check for NaN/Inf and non-positive radius.
    #[serde(default = "default_true")]
    pub check_finite: bool,
    /// Cross-check velocity against vis-viva.
    #[serde(default = "default_true")]
    pub check_vis_viva: bool,
    /// Relative vis-viva tolerance.
    #[serde(default = "default_vis_viva_tolerance")]
    pub vis_viva_tolerance: f64,
}

fn default_true() -> bool {
    true
}

fn default_vis_viva_tolerance() -> f64 {
    DEFAULT_VIS_VIVA_TOLERANCE
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_vis_viva: true,
            vis_viva_tolerance: DEFAULT_VIS_VIVA_TOLERANCE,
        }
    }
}

/// Running counters for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JidokaStatus {
    /// States checked.
    pub checked: u64,
    /// Warnings raised.
    pub warnings: u64,
    /// Halts raised.
    pub halts: u64,
    /// Largest vis-viva mismatch seen.
    pub max_vis_viva_mismatch: f64,
}

/// Per-state guard.
#[derive(Debug, Clone, Default)]
pub struct JidokaGuard {
    config: JidokaConfig,
    status: JidokaStatus,
}

impl JidokaGuard {
    #[must_use]
    pub fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            status: JidokaStatus::default(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> &JidokaStatus {
        &self.status
    }

    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }

    /// Clear counters (e.g., after a reset).
    pub fn reset(&mut self) {
        self.status = JidokaStatus::default();
    }

    /// Check a state and return the response.
    pub fn check(&mut self, state: &OrbitState) -> JidokaResponse {
        self.status.checked += 1;

        if self.config.check_finite {
            if let Some(violation) = Self::finite_violation(state) {
                self.status.halts += 1;
                return JidokaResponse::Halt { violation };
            }
        }

        if self.config.check_vis_viva {
            let mismatch = state.vis_viva_mismatch();
            self.status.max_vis_viva_mismatch = self.status.max_vis_viva_mismatch.max(mismatch);
            if mismatch > self.config.vis_viva_tolerance {
                self.status.warnings += 1;
                return JidokaResponse::Warning {
                    violation: JidokaViolation::VisVivaMismatch {
                        mismatch,
                        tolerance: self.config.vis_viva_tolerance,
                    },
                };
            }
        }

        JidokaResponse::Continue
    }

    fn finite_violation(state: &OrbitState) -> Option<JidokaViolation> {
        let field = if !state.position.is_finite() {
            "position"
        } else if !state.velocity.is_finite() {
            "velocity"
        } else if !state.radius.is_finite() {
            "radius"
        } else if !state.true_anomaly.is_finite() {
            "true_anomaly"
        } else if state.radius <= 0.0 {
            return Some(JidokaViolation::NonPositiveRadius {
                radius: state.radius,
            });
        } else {
            return None;
        };
        Some(JidokaViolation::NonFinite {
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::elements::OrbitParameters;
    use crate::orbit::state::OrbitStateComputer;
    use crate::orbit::vec2::Vec2;

    fn state(e: f64, m: f64) -> OrbitState {
        let params = OrbitParameters::new(1.0, e).expect("valid");
        OrbitStateComputer::default().state_at(&params, m)
    }

    #[test]
    fn test_valid_states_continue() {
        let mut guard = JidokaGuard::default();
        for i in 0..20 {
            let response = guard.check(&state(0.85, f64::from(i) * 0.3));
            assert_eq!(response, JidokaResponse::Continue);
        }
        assert_eq!(guard.status().checked, 20);
        assert_eq!(guard.status().warnings, 0);
        assert!(guard.status().max_vis_viva_mismatch < DEFAULT_VIS_VIVA_TOLERANCE);
    }

    #[test]
    fn test_non_finite_position_halts() {
        let mut guard = JidokaGuard::default();
        let mut s = state(0.3, 1.0);
        s.position = Vec2::new(f64::NAN, 0.0);
        let response = guard.check(&s);
        assert!(response.should_halt());
        assert!(!response.can_continue());
        assert_eq!(guard.status().halts, 1);
        if let JidokaResponse::Halt { violation } = response {
            assert_eq!(violation.to_string(), "Non-finite position");
        }
    }

    #[test]
    fn test_non_positive_radius_halts() {
        let mut guard = JidokaGuard::default();
        let mut s = state(0.3, 1.0);
        s.radius = 0.0;
        assert!(matches!(
            guard.check(&s),
            JidokaResponse::Halt {
                violation: JidokaViolation::NonPositiveRadius { .. }
            }
        ));
    }

    #[test]
    fn test_vis_viva_mismatch_warns() {
        let mut guard = JidokaGuard::default();
        let mut s = state(0.5, 2.0);
        s.velocity = s.velocity * 1.01;
        let response = guard.check(&s);
        assert!(response.is_warning());
        assert!(response.can_continue());
        assert_eq!(guard.status().warnings, 1);
    }

    #[test]
    fn test_disabled_checks() {
        let mut guard = JidokaGuard::new(JidokaConfig {
            check_finite: false,
            check_vis_viva: false,
            ..JidokaConfig::default()
        });
        let mut s = state(0.5, 2.0);
        s.velocity = Vec2::new(f64::INFINITY, 0.0);
        assert_eq!(guard.check(&s), JidokaResponse::Continue);
    }

    #[test]
    fn test_violation_into_error() {
        let err: KeplerError = JidokaViolation::VisVivaMismatch {
            mismatch: 0.1,
            tolerance: 1e-9,
        }
        .into();
        assert!(matches!(err, KeplerError::VisVivaMismatch { .. }));
        assert!(err.is_guard_violation());

        let err: KeplerError = JidokaViolation::NonPositiveRadius { radius: -0.5 }.into();
        assert!(matches!(err, KeplerError::NonPositiveRadius { radius } if radius < 0.0));

        let err: KeplerError = JidokaViolation::NonFinite {
            field: "velocity".to_string(),
        }
        .into();
        assert!(err.to_string().contains("velocity"));
    }

    #[test]
    fn test_reset_clears_status() {
        let mut guard = JidokaGuard::default();
        guard.check(&state(0.1, 0.1));
        guard.reset();
        assert_eq!(*guard.status(), JidokaStatus::default());
    }

    #[test]
    fn test_config_yaml_defaults() {
        let config: JidokaConfig = serde_yaml::from_str("check_vis_viva: false").expect("parse");
        assert!(config.check_finite);
        assert!(!config.check_vis_viva);
        assert!((config.vis_viva_tolerance - DEFAULT_VIS_VIVA_TOLERANCE).abs() < f64::EPSILON);
    }
}
