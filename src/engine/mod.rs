//! Core simulation engine.
//!
//! Drives the orbit propagator one tick at a time with:
//! - A mean-anomaly clock with run/pause state
//! - A state value object that owns every piece of mutable data
//! - Jidoka guards for stop-on-defect
//! - A cooperative tick scheduler feeding a renderer

pub mod clock;
pub mod jidoka;
pub mod scheduler;
pub mod state;

pub use clock::{ResetPolicy, RunState, SimulationClock};
pub use jidoka::{JidokaConfig, JidokaGuard, JidokaResponse, JidokaStatus, JidokaViolation};
pub use scheduler::{Pacing, RunSummary, StopReason, TickScheduler, DEFAULT_TICK_INTERVAL};
pub use state::SimulationState;

use crate::config::KeplerConfig;
use crate::error::KeplerResult;
use crate::render::Renderer;

/// Build a state and scheduler from a configuration and run it headless.
///
/// # Errors
///
/// Returns error if the configuration is invalid or the renderer fails.
pub fn run_simulation(
    config: &KeplerConfig,
    renderer: &mut dyn Renderer,
    ticks: u64,
    pacing: Pacing,
) -> KeplerResult<(SimulationState, RunSummary)> {
    let mut state = SimulationState::new(config)?;
    let mut scheduler = TickScheduler::new(std::time::Duration::from_millis(
        config.clock.tick_interval_ms,
    ))
    .with_script(config.script.clone());
    let summary = scheduler.run(&mut state, renderer, ticks, pacing)?;
    Ok((state, summary))
}
