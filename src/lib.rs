//! # kepler-sweep
//!
//! Keplerian orbit propagation with an equal-area wedge tracker.
//!
//! A single body follows an ellipse around a focus at the origin. Each tick
//! advances the mean anomaly, solves Kepler's equation for the position, and
//! records the point. The triangles swept from the focus between consecutive
//! points ("wedges") have nearly equal areas, which is Kepler's second law.
//!
//! - Newton-Raphson solver for `E - e·sin(E) = M`
//! - Analytic position and velocity (GM = 1), cross-checked with vis-viva
//! - Bounded wedge history with area statistics
//! - Tick scheduler with Jidoka (stop-on-defect) guards
//! - Renderer-independent frame snapshots
//!
//! ## Example
//!
//! ```rust
//! use kepler_sweep::prelude::*;
//!
//! let config = KeplerConfig::builder()
//!     .eccentricity(0.35)
//!     .time_step(0.08)
//!     .build();
//!
//! let mut state = SimulationState::new(&config).expect("valid config");
//! for _ in 0..20 {
//!     state.tick();
//! }
//!
//! let frame = state.snapshot();
//! assert_eq!(frame.wedges.len(), 8);
//! assert!(frame.stats.expect("full history").cv < 10.0);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Written to mirror the textbook formulas
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod orbit;
pub mod render;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{KeplerConfig, KeplerConfigBuilder};
    pub use crate::controller::{InputCommand, InputController, ScriptedCommand};
    pub use crate::engine::{
        run_simulation, JidokaGuard, JidokaResponse, Pacing, ResetPolicy, RunState, RunSummary,
        SimulationClock, SimulationState, TickScheduler,
    };
    pub use crate::error::{KeplerError, KeplerResult};
    pub use crate::orbit::prelude::*;
    pub use crate::render::{FrameSnapshot, OrbitReport, OrbitSummary, Renderer};
}

/// Re-export for public API
pub use error::{KeplerError, KeplerResult};
