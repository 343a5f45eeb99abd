//! Keplerian orbit module.
//!
//! Implements the analytic two-body propagator and the equal-area check:
//! - Newton-Raphson Kepler solver (scalar and batch)
//! - Position/velocity from orbital elements (GM = 1)
//! - Sampled closed orbit curve
//! - Bounded wedge history with area statistics
//! - Metamorphic relations over all of the above
//!
//! # Example
//!
//! ```rust
//! use kepler_sweep::orbit::prelude::*;
//!
//! let params = OrbitParameters::new(1.0, 0.35).expect("bound orbit");
//! let computer = OrbitStateComputer::default();
//!
//! let mut tracker = AreaWedgeTracker::new(8).expect("non-zero wedges");
//! let mut m = 0.0;
//! for _ in 0..20 {
//!     m = (m + 0.08) % std::f64::consts::TAU;
//!     let state = computer.state_at(&params, m);
//!     tracker.record(state.position.x, state.position.y);
//! }
//!
//! let stats = tracker.stats().expect("history is full");
//! assert!(stats.cv < 10.0);
//! ```

pub mod elements;
pub mod metamorphic;
pub mod solver;
pub mod state;
pub mod vec2;
pub mod wedges;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::elements::{OrbitParameters, DEFAULT_SEMI_MAJOR_AXIS, MAX_UI_ECCENTRICITY};
    pub use super::metamorphic::{run_all_metamorphic_tests, MetamorphicResult};
    pub use super::solver::{KeplerSolver, SolveOutcome};
    pub use super::state::{OrbitState, OrbitStateComputer, DEFAULT_CURVE_SAMPLES};
    pub use super::vec2::Vec2;
    pub use super::wedges::{
        triangle_area, AreaWedgeTracker, TrajectoryHistory, WedgeAreaStats, WedgePolygon,
        DEFAULT_NUM_WEDGES,
    };
}
