//! Kepler's equation solver.
//!
//! Finds the eccentric anomaly `E` satisfying
//!
//! ```text
//! M = E - e·sin(E)
//! ```
//!
//! by Newton-Raphson iteration. Running out of iterations is not an error:
//! the last estimate is returned and flagged as unconverged.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Default convergence tolerance on the Newton step.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration budget.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Eccentricity at and above which iteration starts from `E₀ = π`.
pub const HIGH_ECCENTRICITY_THRESHOLD: f64 = 0.8;

/// Derivatives at or below this magnitude produce a zero step.
const DERIVATIVE_FLOOR: f64 = 1e-12;

#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin() - mean_anomaly
}

#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - eccentricity * eccentric_anomaly.cos()
}

/// Detailed result of a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Eccentric anomaly estimate (radians).
    pub eccentric_anomaly: f64,
    /// Newton steps taken.
    pub iterations: u32,
    /// Whether the last step fell below the tolerance.
    pub converged: bool,
    /// `|E - e·sin(E) - M|` at the returned estimate.
    pub residual: f64,
}

/// Newton-Raphson solver for Kepler's equation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolver {
    tolerance: f64,
    max_iterations: u32,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KeplerSolver {
    /// Create a solver with the default tolerance and iteration budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with explicit settings.
    ///
    /// A non-positive or non-finite tolerance falls back to the default.
    #[must_use]
    pub fn with_settings(tolerance: f64, max_iterations: u32) -> Self {
        let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            DEFAULT_TOLERANCE
        };
        Self {
            tolerance,
            max_iterations,
        }
    }

    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Starting point for the iteration.
    ///
    /// Near-parabolic orbits converge slowly from `E₀ = M` close to
    /// periapsis, so they start from apoapsis instead.
    #[must_use]
    pub fn initial_guess(mean_anomaly: f64, eccentricity: f64) -> f64 {
        if eccentricity < HIGH_ECCENTRICITY_THRESHOLD {
            mean_anomaly
        } else {
            PI
        }
    }

    /// Solve for the eccentric anomaly.
    #[must_use]
    pub fn solve(&self, mean_anomaly: f64, eccentricity: f64) -> f64 {
        self.solve_detailed(mean_anomaly, eccentricity)
            .eccentric_anomaly
    }

    /// Solve and report iteration count, convergence and residual.
    ///
    /// Whole turns are split off `M` first; iteration runs on the remainder
    /// in `[0, 2π)` and the turns are added back to the result.
    #[must_use]
    pub fn solve_detailed(&self, mean_anomaly: f64, eccentricity: f64) -> SolveOutcome {
        let turns = (mean_anomaly / TAU).floor();
        let offset = turns * TAU;
        let reduced = mean_anomaly - offset;

        let mut e_anom = Self::initial_guess(reduced, eccentricity);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            let f = keplers_equation(reduced, e_anom, eccentricity);
            let fp = keplers_equation_derivative(e_anom, eccentricity);
            let delta = if fp.abs() > DERIVATIVE_FLOOR { f / fp } else { 0.0 };

            e_anom -= delta;
            iterations += 1;

            if delta.abs() < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::trace!(
                mean_anomaly,
                eccentricity,
                iterations,
                "kepler solver exhausted iteration budget"
            );
        }

        let e_anom = e_anom + offset;
        SolveOutcome {
            eccentric_anomaly: e_anom,
            iterations,
            converged,
            residual: keplers_equation(mean_anomaly, e_anom, eccentricity).abs(),
        }
    }

    /// Solve a batch of mean anomalies sharing one eccentricity.
    ///
    /// Each element iterates until its own step is below the tolerance, so
    /// the batch terminates with every step below the tolerance and each
    /// element equals the corresponding scalar [`KeplerSolver::solve`] call
    /// bit for bit.
    #[must_use]
    pub fn solve_batch(&self, mean_anomalies: &[f64], eccentricity: f64) -> Vec<f64> {
        mean_anomalies
            .iter()
            .map(|&m| self.solve(m, eccentricity))
            .collect()
    }
}
