//! Position and velocity from orbital elements.
//!
//! # Governing Equations
//!
//! ```text
//! cos f = (cos E - e) / (1 - e·cos E)
//! sin f = √(1 - e²)·sin E / (1 - e·cos E)
//! r     = a(1 - e²) / (1 + e·cos f)
//! v_r   = √(1/p)·e·sin f,   v_t = √(1/p)·(1 + e·cos f),   p = a(1 - e²)
//! |v|²  = 2/r - 1/a                      (vis-viva, GM = 1)
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::KeplerResult;
use crate::orbit::elements::OrbitParameters;
use crate::orbit::solver::KeplerSolver;
use crate::orbit::vec2::Vec2;

/// Default number of samples in the closed orbit curve.
pub const DEFAULT_CURVE_SAMPLES: usize = 500;

/// Kinematic snapshot of the body at one mean anomaly.
///
/// Produced fresh every tick and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    /// Mean anomaly (radians).
    pub mean_anomaly: f64,
    /// Eccentric anomaly solved from the mean anomaly (radians).
    pub eccentric_anomaly: f64,
    /// True anomaly in `(-π, π]` (radians).
    pub true_anomaly: f64,
    /// Distance from the focus.
    pub radius: f64,
    /// Position relative to the focus.
    pub position: Vec2,
    /// Velocity with GM = 1.
    pub velocity: Vec2,
    /// Semi-major axis the state was computed for.
    semi_major_axis: f64,
}

impl OrbitState {
    /// Magnitude of the Cartesian velocity.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Speed predicted by vis-viva, `√max(0, 2/r - 1/a)`.
    #[must_use]
    pub fn vis_viva_speed(&self) -> f64 {
        (2.0 / self.radius - 1.0 / self.semi_major_axis)
            .max(0.0)
            .sqrt()
    }

    /// Relative disagreement between the Cartesian speed and vis-viva.
    #[must_use]
    pub fn vis_viva_mismatch(&self) -> f64 {
        let expected = self.vis_viva_speed();
        let diff = (self.speed() - expected).abs();
        if expected > f64::EPSILON {
            diff / expected
        } else {
            diff
        }
    }

    /// Specific angular momentum `r × v`.
    #[must_use]
    pub fn angular_momentum(&self) -> f64 {
        self.position.cross(&self.velocity)
    }

    /// Check that every field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.radius.is_finite()
            && self.true_anomaly.is_finite()
    }
}

/// Converts mean anomaly to position and velocity via [`KeplerSolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitStateComputer {
    solver: KeplerSolver,
}

impl OrbitStateComputer {
    #[must_use]
    pub const fn new(solver: KeplerSolver) -> Self {
        Self { solver }
    }

    #[must_use]
    pub const fn solver(&self) -> &KeplerSolver {
        &self.solver
    }

    /// Compute the state from raw elements.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive semi-major axis or an eccentricity outside
    /// `[0, 1)`.
    pub fn point(
        &self,
        semi_major_axis: f64,
        eccentricity: f64,
        mean_anomaly: f64,
    ) -> KeplerResult<OrbitState> {
        let params = OrbitParameters::new(semi_major_axis, eccentricity)?;
        Ok(self.state_at(&params, mean_anomaly))
    }

    /// Compute the state for validated parameters.
    #[must_use]
    pub fn state_at(&self, params: &OrbitParameters, mean_anomaly: f64) -> OrbitState {
        let a = params.semi_major_axis();
        let e = params.eccentricity();
        let eccentric_anomaly = self.solver.solve(mean_anomaly, e);
        let (true_anomaly, radius) = true_anomaly_and_radius(params, eccentric_anomaly);

        let (sin_f, cos_f) = true_anomaly.sin_cos();
        let position = Vec2::new(radius * cos_f, radius * sin_f);

        let scale = (1.0 / params.semi_latus_rectum()).sqrt();
        let v_radial = scale * e * sin_f;
        let v_tangential = scale * (1.0 + e * cos_f);
        let velocity = Vec2::new(
            v_radial * cos_f - v_tangential * sin_f,
            v_radial * sin_f + v_tangential * cos_f,
        );

        OrbitState {
            mean_anomaly,
            eccentric_anomaly,
            true_anomaly,
            radius,
            position,
            velocity,
            semi_major_axis: a,
        }
    }

    /// Sample the closed orbit curve.
    ///
    /// Mean anomalies are spaced uniformly over `[0, 2π]` with both ends
    /// included, so the first and last points coincide at perihelion.
    #[must_use]
    pub fn orbit_curve(&self, params: &OrbitParameters, samples: usize) -> Vec<Vec2> {
        let mean_anomalies = linspace(0.0, TAU, samples);
        self.solver
            .solve_batch(&mean_anomalies, params.eccentricity())
            .into_iter()
            .map(|eccentric_anomaly| {
                let (f, r) = true_anomaly_and_radius(params, eccentric_anomaly);
                Vec2::from_polar(r, f)
            })
            .collect()
    }
}

/// True anomaly (quadrant-correct) and focal distance for an eccentric anomaly.
fn true_anomaly_and_radius(params: &OrbitParameters, eccentric_anomaly: f64) -> (f64, f64) {
    let e = params.eccentricity();
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    let denom = 1.0 - e * cos_e;
    let cos_f = (cos_e - e) / denom;
    let sin_f = (1.0 - e * e).sqrt() * sin_e / denom;
    let f = sin_f.atan2(cos_f);
    let r = params.semi_latus_rectum() / (1.0 + e * f.cos());
    (f, r)
}

fn linspace(start: f64, end: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn computer() -> OrbitStateComputer {
        OrbitStateComputer::default()
    }

    #[test]
    fn test_scenario_perihelion_start() {
        let s = computer().point(1.0, 0.35, 0.0).expect("valid");
        assert!(s.eccentric_anomaly.abs() < 1e-15);
        assert!(s.true_anomaly.abs() < 1e-15);
        assert!((s.radius - 0.65).abs() < 1e-12);
        assert!((s.position.x - 0.65).abs() < 1e-12);
        assert!(s.position.y.abs() < 1e-12);
    }

    #[test]
    fn test_apsides() {
        for e in [0.0, 0.1, 0.35, 0.6, 0.79, 0.8, 0.85] {
            for a in [0.5, 1.0, 3.0] {
                let peri = computer().point(a, e, 0.0).expect("valid");
                let apo = computer().point(a, e, PI).expect("valid");
                assert!((peri.radius - a * (1.0 - e)).abs() < 1e-9, "a={a} e={e}");
                assert!((apo.radius - a * (1.0 + e)).abs() < 1e-9, "a={a} e={e}");
            }
        }
    }

    #[test]
    fn test_circular_orbit_constant_radius_and_speed() {
        let c = computer();
        let params = OrbitParameters::new(2.0, 0.0).expect("valid");
        for i in 0..50 {
            let m = TAU * f64::from(i) / 50.0;
            let s = c.state_at(&params, m);
            assert!((s.radius - 2.0).abs() < 1e-12);
            assert!((s.velocity.magnitude_squared() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_unbound_orbit() {
        assert!(computer().point(1.0, 1.0, 0.5).is_err());
        assert!(computer().point(-1.0, 0.3, 0.5).is_err());
    }

    #[test]
    fn test_velocity_matches_vis_viva() {
        let c = computer();
        for e in [0.0, 0.2, 0.5, 0.85] {
            let params = OrbitParameters::new(1.3, e).expect("valid");
            for i in 0..40 {
                let m = TAU * f64::from(i) / 40.0;
                let s = c.state_at(&params, m);
                assert!(s.vis_viva_mismatch() < 1e-9, "e={e} M={m}: {}", s.vis_viva_mismatch());
            }
        }
    }

    #[test]
    fn test_angular_momentum_is_conserved() {
        let c = computer();
        let params = OrbitParameters::new(1.0, 0.6).expect("valid");
        let h = params.semi_latus_rectum().sqrt();
        for i in 0..40 {
            let s = c.state_at(&params, TAU * f64::from(i) / 40.0);
            assert!((s.angular_momentum() - h).abs() < 1e-9);
        }
    }

    #[test]
    fn test_prograde_motion() {
        let s = computer().point(1.0, 0.35, 0.0).expect("valid");
        assert!(s.velocity.y > 0.0);
        assert!(s.velocity.x.abs() < 1e-12);
    }

    #[test]
    fn test_orbit_curve_closes() {
        let params = OrbitParameters::new(1.0, 0.5).expect("valid");
        let curve = computer().orbit_curve(&params, DEFAULT_CURVE_SAMPLES);
        assert_eq!(curve.len(), DEFAULT_CURVE_SAMPLES);
        let first = curve[0];
        let last = curve[curve.len() - 1];
        assert!((first - last).magnitude() < 1e-9);
        assert!((first.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_orbit_curve_matches_pointwise_states() {
        let c = computer();
        let params = OrbitParameters::new(1.0, 0.7).expect("valid");
        let curve = c.orbit_curve(&params, 25);
        for (i, p) in curve.iter().enumerate() {
            let m = TAU * i as f64 / 24.0;
            let s = c.state_at(&params, m);
            assert!((s.position - *p).magnitude() < 1e-12);
        }
    }

    #[test]
    fn test_orbit_curve_stays_between_apsides() {
        let params = OrbitParameters::new(1.0, 0.85).expect("valid");
        for p in computer().orbit_curve(&params, 200) {
            let r = p.magnitude();
            assert!(r >= params.perihelion() - 1e-9 && r <= params.aphelion() + 1e-9);
        }
    }

    #[test]
    fn test_linspace_edges() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    }
}
