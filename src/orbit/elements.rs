//! Orbital elements of the bound two-body orbit.
//!
//! Units are scaled so that GM = 1: the semi-major axis is in AU-like
//! units and the period of a unit orbit is 2π.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{KeplerError, KeplerResult};

/// Default semi-major axis.
pub const DEFAULT_SEMI_MAJOR_AXIS: f64 = 1.0;

/// Upper bound of the eccentricity slider.
pub const MAX_UI_ECCENTRICITY: f64 = 0.85;

/// Shape parameters of an elliptical orbit.
///
/// Construction enforces `a > 0` and `e ∈ [0, 1)`; parabolic and hyperbolic
/// trajectories never reach the propagator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitParameters {
    semi_major_axis: f64,
    eccentricity: f64,
}

impl OrbitParameters {
    /// Create validated orbit parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSemiMajorAxis` unless `a` is finite and positive, and
    /// `InvalidEccentricity` unless `e` is finite and in `[0, 1)`.
    pub fn new(semi_major_axis: f64, eccentricity: f64) -> KeplerResult<Self> {
        Self::check_semi_major_axis(semi_major_axis)?;
        Self::check_eccentricity(eccentricity)?;
        Ok(Self {
            semi_major_axis,
            eccentricity,
        })
    }

    /// Circular unit orbit.
    #[must_use]
    pub const fn circular_unit() -> Self {
        Self {
            semi_major_axis: DEFAULT_SEMI_MAJOR_AXIS,
            eccentricity: 0.0,
        }
    }

    /// Validate an eccentricity without building parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEccentricity` for NaN, negative, or `>= 1` values.
    pub fn check_eccentricity(eccentricity: f64) -> KeplerResult<()> {
        if eccentricity.is_finite() && (0.0..1.0).contains(&eccentricity) {
            Ok(())
        } else {
            Err(KeplerError::InvalidEccentricity {
                value: eccentricity,
            })
        }
    }

    fn check_semi_major_axis(semi_major_axis: f64) -> KeplerResult<()> {
        if semi_major_axis.is_finite() && semi_major_axis > 0.0 {
            Ok(())
        } else {
            Err(KeplerError::InvalidSemiMajorAxis {
                value: semi_major_axis,
            })
        }
    }

    /// Return a copy with a different eccentricity.
    ///
    /// # Errors
    ///
    /// Same as [`OrbitParameters::check_eccentricity`].
    pub fn with_eccentricity(self, eccentricity: f64) -> KeplerResult<Self> {
        Self::new(self.semi_major_axis, eccentricity)
    }

    #[must_use]
    pub const fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    #[must_use]
    pub const fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Semi-latus rectum `p = a(1 - e²)`.
    #[must_use]
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Closest distance to the focus, `a(1 - e)`.
    #[must_use]
    pub fn perihelion(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Farthest distance from the focus, `a(1 + e)`.
    #[must_use]
    pub fn aphelion(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Orbital period `T = 2π√(a³)` with GM = 1.
    #[must_use]
    pub fn period(&self) -> f64 {
        TAU * self.semi_major_axis.powi(3).sqrt()
    }

    /// Semi-minor axis `b = a√(1 - e²)`.
    #[must_use]
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    /// Area swept per unit of mean anomaly, `πab / 2π = ab / 2`.
    ///
    /// The exact sector area a wedge of mean-anomaly width `Δ` converges to.
    #[must_use]
    pub fn areal_rate(&self) -> f64 {
        0.5 * self.semi_major_axis * self.semi_minor_axis()
    }
}

impl Default for OrbitParameters {
    fn default() -> Self {
        Self {
            semi_major_axis: DEFAULT_SEMI_MAJOR_AXIS,
            eccentricity: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unbound_eccentricity() {
        assert!(OrbitParameters::new(1.0, 1.0).is_err());
        assert!(OrbitParameters::new(1.0, 1.5).is_err());
        assert!(OrbitParameters::new(1.0, -0.01).is_err());
        assert!(OrbitParameters::new(1.0, f64::NAN).is_err());
        assert!(OrbitParameters::new(1.0, 0.999).is_ok());
    }

    #[test]
    fn test_rejects_bad_semi_major_axis() {
        for a in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let err = OrbitParameters::new(a, 0.1).unwrap_err();
            assert!(matches!(err, KeplerError::InvalidSemiMajorAxis { .. }));
        }
    }

    #[test]
    fn test_apsides_and_period() {
        let p = OrbitParameters::new(2.0, 0.25).expect("valid");
        assert!((p.perihelion() - 1.5).abs() < 1e-12);
        assert!((p.aphelion() - 2.5).abs() < 1e-12);
        assert!((p.period() - TAU * 8.0_f64.sqrt()).abs() < 1e-12);
        assert!((p.semi_latus_rectum() - 2.0 * (1.0 - 0.0625)).abs() < 1e-12);
    }

    #[test]
    fn test_unit_period_is_tau() {
        assert!((OrbitParameters::circular_unit().period() - TAU).abs() < 1e-12);
    }

    #[test]
    fn test_with_eccentricity_keeps_axis() {
        let p = OrbitParameters::default().with_eccentricity(0.6).expect("valid");
        assert!((p.semi_major_axis() - 1.0).abs() < f64::EPSILON);
        assert!((p.eccentricity() - 0.6).abs() < f64::EPSILON);
        assert!(OrbitParameters::default().with_eccentricity(1.0).is_err());
    }

    #[test]
    fn test_areal_rate_circle() {
        let p = OrbitParameters::circular_unit();
        assert!((p.areal_rate() - 0.5).abs() < 1e-12);
    }
}
