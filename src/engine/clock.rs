//! Simulation clock over mean anomaly.
//!
//! The clock owns the running mean anomaly and the run state. It advances
//! only when running, and always keeps the anomaly canonical in `[0, 2π)`.
//! The step size is supplied by the caller on every tick.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Whether ticks advance the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Ticks advance the mean anomaly.
    #[default]
    Running,
    /// Ticks are no-ops.
    Paused,
}

/// What happens to the run state on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Keep running if running, stay paused if paused.
    #[default]
    KeepRunState,
    /// Always come back paused.
    Pause,
}

/// Mean-anomaly clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Mean anomaly in `[0, 2π)`.
    mean_anomaly: f64,
    run_state: RunState,
    /// Ticks that advanced the anomaly since the last reset.
    tick_count: u64,
}

impl SimulationClock {
    /// Create a clock at `M = 0` in the given run state.
    #[must_use]
    pub const fn new(run_state: RunState) -> Self {
        Self {
            mean_anomaly: 0.0,
            run_state,
            tick_count: 0,
        }
    }

    #[must_use]
    pub const fn mean_anomaly(&self) -> f64 {
        self.mean_anomaly
    }

    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advance by `dt` if running.
    ///
    /// Returns whether the anomaly moved.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.run_state == RunState::Paused {
            return false;
        }
        self.mean_anomaly = canonical_anomaly(self.mean_anomaly + dt);
        self.tick_count += 1;
        true
    }

    pub fn pause(&mut self) {
        self.run_state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.run_state = RunState::Running;
    }

    /// Flip between running and paused. Returns the new state.
    pub fn toggle(&mut self) -> RunState {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        self.run_state
    }

    /// Return to `M = 0` without touching the run state.
    pub fn rewind(&mut self) {
        self.mean_anomaly = 0.0;
        self.tick_count = 0;
    }

    /// Return to `M = 0`, applying the reset policy to the run state.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.rewind();
        if policy == ResetPolicy::Pause {
            self.pause();
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(RunState::default())
    }
}

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn canonical_anomaly(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
