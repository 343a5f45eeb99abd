//! Metamorphic relations for the Kepler propagator.
//!
//! Exact positions along an ellipse are easy to get subtly wrong and hard to
//! check against an oracle, so these tests verify **relations** between runs
//! instead of specific outputs.
//!
//! # Metamorphic Relations
//!
//! 1. **Mirror Symmetry**: `M → 2π - M` reflects the body across the apsidal line
//! 2. **Solver Periodicity**: `E(M + 2π) = E(M) + 2π`
//! 3. **Axis Scaling**: scaling `a` by `k` scales `r` by `k` and speed by `1/√k`
//! 4. **Circular Reduction**: `e = 0` gives uniform circular motion
//! 5. **Equal Areas**: a fixed-step sweep gives wedges of nearly equal area

use std::f64::consts::TAU;

use crate::orbit::elements::OrbitParameters;
use crate::orbit::state::OrbitStateComputer;
use crate::orbit::wedges::AreaWedgeTracker;

/// Upper bound on the ticks one equal-area sweep may take.
pub const MAX_SWEEP_STEPS: f64 = 1e6;

/// Metamorphic test result.
#[derive(Debug, Clone)]
pub struct MetamorphicResult {
    /// Name of the relation tested.
    pub relation: String,
    /// Whether the relation holds within tolerance.
    pub passed: bool,
    /// Measured error/deviation.
    pub error: f64,
    /// Tolerance used.
    pub tolerance: f64,
    /// Additional details.
    pub details: String,
}

impl MetamorphicResult {
    fn evaluate(relation: &str, error: f64, tolerance: f64, details: String) -> Self {
        Self {
            relation: relation.to_string(),
            passed: error <= tolerance,
            error,
            tolerance,
            details,
        }
    }
}

fn sample_anomalies(samples: u32) -> impl Iterator<Item = f64> {
    (0..samples).map(move |i| TAU * f64::from(i) / f64::from(samples))
}

/// MR-1: the state at `2π - M` is the mirror image of the state at `M`.
#[must_use]
pub fn test_mirror_symmetry(
    params: &OrbitParameters,
    samples: u32,
    tolerance: f64,
) -> MetamorphicResult {
    let computer = OrbitStateComputer::default();
    let mut max_error: f64 = 0.0;

    for m in sample_anomalies(samples) {
        let source = computer.state_at(params, m);
        let followup = computer.state_at(params, (TAU - m).rem_euclid(TAU));
        let position_error = (followup.position - source.position.mirrored()).magnitude();
        let speed_error = (followup.speed() - source.speed()).abs();
        max_error = max_error.max(position_error).max(speed_error);
    }

    MetamorphicResult::evaluate(
        "mirror_symmetry",
        max_error,
        tolerance,
        format!("e={:.3}, samples={samples}", params.eccentricity()),
    )
}

/// MR-2: shifting the mean anomaly by a full turn shifts `E` by a full turn.
#[must_use]
pub fn test_solver_periodicity(
    params: &OrbitParameters,
    samples: u32,
    tolerance: f64,
) -> MetamorphicResult {
    let computer = OrbitStateComputer::default();
    let solver = computer.solver();
    let e = params.eccentricity();
    let mut max_error: f64 = 0.0;

    for m in sample_anomalies(samples) {
        let shifted = solver.solve(m + TAU, e) - TAU;
        max_error = max_error.max((shifted - solver.solve(m, e)).abs());
    }

    MetamorphicResult::evaluate(
        "solver_periodicity",
        max_error,
        tolerance,
        format!("e={e:.3}, samples={samples}"),
    )
}

/// MR-3: `r(k·a) = k·r(a)` and `v(k·a) = v(a)/√k` at every mean anomaly.
#[must_use]
pub fn test_axis_scaling(
    params: &OrbitParameters,
    factor: f64,
    tolerance: f64,
) -> MetamorphicResult {
    let computer = OrbitStateComputer::default();
    let scaled = OrbitParameters::new(params.semi_major_axis() * factor, params.eccentricity());
    let Ok(scaled) = scaled else {
        return MetamorphicResult::evaluate(
            "axis_scaling",
            f64::INFINITY,
            tolerance,
            format!("invalid scale factor {factor}"),
        );
    };

    let mut max_error: f64 = 0.0;
    for m in sample_anomalies(64) {
        let source = computer.state_at(params, m);
        let followup = computer.state_at(&scaled, m);
        let r_error = (followup.radius / (factor * source.radius) - 1.0).abs();
        let v_error = (followup.speed() * factor.sqrt() / source.speed() - 1.0).abs();
        max_error = max_error.max(r_error).max(v_error);
    }

    MetamorphicResult::evaluate(
        "axis_scaling",
        max_error,
        tolerance,
        format!("factor={factor}"),
    )
}

/// MR-4: with `e = 0`, radius equals `a` and speed equals `1/√a` everywhere.
#[must_use]
pub fn test_circular_reduction(semi_major_axis: f64, tolerance: f64) -> MetamorphicResult {
    let Ok(params) = OrbitParameters::new(semi_major_axis, 0.0) else {
        return MetamorphicResult::evaluate(
            "circular_reduction",
            f64::INFINITY,
            tolerance,
            format!("invalid semi-major axis {semi_major_axis}"),
        );
    };
    let computer = OrbitStateComputer::default();
    let expected_speed = 1.0 / semi_major_axis.sqrt();
    let mut max_error: f64 = 0.0;

    for m in sample_anomalies(64) {
        let s = computer.state_at(&params, m);
        max_error = max_error
            .max((s.radius - semi_major_axis).abs())
            .max((s.speed() - expected_speed).abs())
            .max((s.eccentric_anomaly - m).abs());
    }

    MetamorphicResult::evaluate(
        "circular_reduction",
        max_error,
        tolerance,
        format!("a={semi_major_axis}"),
    )
}

/// MR-5: sweeping a full orbit with a fixed step keeps the wedge CV (percent)
/// below `max_cv` once the history is full.
#[must_use]
pub fn test_equal_areas(
    params: &OrbitParameters,
    time_step: f64,
    num_wedges: usize,
    max_cv: f64,
) -> MetamorphicResult {
    let computer = OrbitStateComputer::default();
    let Ok(mut tracker) = AreaWedgeTracker::new(num_wedges) else {
        return MetamorphicResult::evaluate(
            "equal_areas",
            f64::INFINITY,
            max_cv,
            "invalid wedge count".to_string(),
        );
    };

    let orbit_steps = (TAU / time_step).ceil();
    if !(orbit_steps.is_finite() && orbit_steps >= 1.0 && orbit_steps <= MAX_SWEEP_STEPS) {
        return MetamorphicResult::evaluate(
            "equal_areas",
            f64::INFINITY,
            max_cv,
            format!("time step {time_step} outside sweepable range"),
        );
    }
    let steps = orbit_steps as usize + num_wedges + 1;
    let mut m = 0.0_f64;
    let mut worst_cv: f64 = 0.0;

    for step in 0..steps {
        m = (m + time_step).rem_euclid(TAU);
        let s = computer.state_at(params, m);
        tracker.record(s.position.x, s.position.y);
        if step >= num_wedges {
            if let Some(stats) = tracker.stats() {
                worst_cv = worst_cv.max(stats.cv);
            }
        }
    }

    MetamorphicResult::evaluate(
        "equal_areas",
        worst_cv,
        max_cv,
        format!("e={:.3}, dt={time_step}, steps={steps}", params.eccentricity()),
    )
}

/// Run every relation with default tolerances.
#[must_use]
pub fn run_all_metamorphic_tests(
    params: &OrbitParameters,
    time_step: f64,
) -> Vec<MetamorphicResult> {
    vec![
        test_mirror_symmetry(params, 128, 1e-9),
        test_solver_periodicity(params, 128, 1e-9),
        test_axis_scaling(params, 4.0, 1e-9),
        test_circular_reduction(params.semi_major_axis(), 1e-12),
        test_equal_areas(params, time_step, 8, 10.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_relations_hold_for_default_orbit() {
        let params = OrbitParameters::default();
        for result in run_all_metamorphic_tests(&params, 0.08) {
            assert!(
                result.passed,
                "{} failed: error {:.3e} > {:.3e} ({})",
                result.relation, result.error, result.tolerance, result.details
            );
        }
    }

    #[test]
    fn test_mirror_symmetry_high_eccentricity() {
        let params = OrbitParameters::new(1.0, 0.85).expect("valid");
        let result = test_mirror_symmetry(&params, 200, 1e-8);
        assert!(result.passed, "error {:.3e}", result.error);
    }

    #[test]
    fn test_periodicity_moderate_eccentricity() {
        let params = OrbitParameters::new(1.0, 0.6).expect("valid");
        assert!(test_solver_periodicity(&params, 100, 1e-9).passed);
    }

    #[test]
    fn test_equal_areas_detects_coarse_steps() {
        // Near perihelion a coarse step sweeps a wide true-anomaly arc, where
        // the chord triangle badly underestimates the sector.
        let params = OrbitParameters::new(1.0, 0.85).expect("valid");
        let result = test_equal_areas(&params, 0.2, 8, 1.0);
        assert!(!result.passed);
        assert!(result.error > 1.0);
    }

    #[test]
    fn test_invalid_inputs_fail() {
        assert!(!test_circular_reduction(-1.0, 1e-9).passed);
        assert!(!test_axis_scaling(&OrbitParameters::default(), -2.0, 1e-9).passed);
        assert!(!test_equal_areas(&OrbitParameters::default(), 0.1, 0, 10.0).passed);
    }

    #[test]
    fn test_equal_areas_rejects_unsweepable_steps() {
        let params = OrbitParameters::default();
        for dt in [1e-300, 1e-9, 0.0, -0.1, f64::NAN, f64::INFINITY] {
            let result = test_equal_areas(&params, dt, 8, 10.0);
            assert!(!result.passed, "dt={dt} should be rejected");
            assert!(result.error.is_infinite());
        }
    }

    #[test]
    fn test_periodicity_high_eccentricity() {
        let params = OrbitParameters::new(1.0, 0.85).expect("valid");
        let result = test_solver_periodicity(&params, 128, 1e-9);
        assert!(result.passed, "error {:.3e}", result.error);
    }
}
