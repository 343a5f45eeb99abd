//! Tick scheduler.
//!
//! A cooperative timer that drives a [`SimulationState`]. Each tick:
//! 1. Queued and scripted commands are applied, in arrival order
//! 2. The state advances by one step
//! 3. The Jidoka guard checks the new body state
//! 4. The renderer receives the frame snapshot
//!
//! Commands never interleave with a tick, so an eccentricity change always
//! clears the history and rewinds before the next position is computed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::controller::{InputCommand, ScriptedCommand};
use crate::engine::clock::RunState;
use crate::engine::jidoka::{JidokaResponse, JidokaViolation};
use crate::engine::state::SimulationState;
use crate::error::{KeplerError, KeplerResult};
use crate::render::Renderer;

/// Default wall-clock interval between ticks (25 FPS).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(40);

/// How ticks are spaced in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Sleep until each interval boundary.
    Realtime,
    /// Run ticks back to back.
    #[default]
    Unpaced,
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The requested number of ticks ran.
    Completed,
    /// The guard halted the run; the state is paused.
    Halted { violation: JidokaViolation },
}

/// Outcome of [`TickScheduler::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scheduler ticks executed (paused ticks included).
    pub ticks: u64,
    /// Ticks that moved the body.
    pub advanced: u64,
    /// Commands applied.
    pub commands_applied: u64,
    /// Commands rejected by validation.
    pub commands_rejected: u64,
    /// Guard warnings raised during this run.
    pub warnings: u64,
    pub final_run_state: RunState,
    /// Coefficient of variation of the final wedge areas, if any.
    pub final_cv: Option<f64>,
    pub stop_reason: StopReason,
}

impl RunSummary {
    /// `Err` carrying the guard violation if the run was halted.
    ///
    /// # Errors
    ///
    /// Returns the halting violation as a guard error.
    pub fn check(&self) -> KeplerResult<()> {
        match &self.stop_reason {
            StopReason::Completed => Ok(()),
            StopReason::Halted { violation } => Err(KeplerError::from(violation.clone())),
        }
    }
}

/// Cooperative tick driver.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    pending: VecDeque<InputCommand>,
    script: VecDeque<ScriptedCommand>,
    /// Ticks executed over the scheduler's lifetime; scripts key on this.
    elapsed_ticks: u64,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl TickScheduler {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: VecDeque::new(),
            script: VecDeque::new(),
            elapsed_ticks: 0,
        }
    }

    /// Install a script. Entries are applied before the tick whose index
    /// matches `at_tick`; entries in the past are applied on the next tick.
    #[must_use]
    pub fn with_script(mut self, mut script: Vec<ScriptedCommand>) -> Self {
        script.sort_by_key(|entry| entry.at_tick);
        self.script = script.into();
        self
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Commands waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queue a command for the next tick.
    pub fn queue(&mut self, command: InputCommand) {
        self.pending.push_back(command);
    }

    /// Run up to `ticks` ticks.
    ///
    /// A guard halt pauses the state and ends the run early.
    ///
    /// # Errors
    ///
    /// Returns error only if the renderer fails; invalid commands are
    /// logged and skipped.
    pub fn run(
        &mut self,
        state: &mut SimulationState,
        renderer: &mut dyn Renderer,
        ticks: u64,
        pacing: Pacing,
    ) -> KeplerResult<RunSummary> {
        info!(
            ticks,
            ?pacing,
            interval_ms = self.interval.as_millis(),
            e = state.params().eccentricity(),
            dt = state.time_step(),
            "scheduler started"
        );

        let mut summary = RunSummary {
            ticks: 0,
            advanced: 0,
            commands_applied: 0,
            commands_rejected: 0,
            warnings: 0,
            final_run_state: state.clock().run_state(),
            final_cv: None,
            stop_reason: StopReason::Completed,
        };
        let mut next_deadline = Instant::now() + self.interval;

        for _ in 0..ticks {
            self.apply_commands(state, &mut summary);

            summary.ticks += 1;
            self.elapsed_ticks += 1;

            if state.tick() {
                summary.advanced += 1;
                match state.check_guard() {
                    JidokaResponse::Continue => {}
                    JidokaResponse::Warning { violation } => {
                        summary.warnings += 1;
                        warn!(tick = state.clock().tick_count(), %violation, "guard warning");
                    }
                    JidokaResponse::Halt { violation } => {
                        warn!(tick = state.clock().tick_count(), %violation, "guard halt; pausing");
                        state.pause();
                        renderer.present(&state.snapshot())?;
                        summary.stop_reason = StopReason::Halted { violation };
                        break;
                    }
                }
            }

            renderer.present(&state.snapshot())?;

            if pacing == Pacing::Realtime {
                let now = Instant::now();
                if next_deadline > now {
                    std::thread::sleep(next_deadline - now);
                }
                next_deadline += self.interval;
            }
        }

        renderer.finish()?;

        summary.final_run_state = state.clock().run_state();
        summary.final_cv = state.tracker().stats().map(|stats| stats.cv);
        info!(
            ticks = summary.ticks,
            advanced = summary.advanced,
            warnings = summary.warnings,
            cv = summary.final_cv,
            "scheduler stopped"
        );
        Ok(summary)
    }

    fn apply_commands(&mut self, state: &mut SimulationState, summary: &mut RunSummary) {
        let mut due = Vec::new();
        while self
            .script
            .front()
            .is_some_and(|entry| entry.at_tick <= self.elapsed_ticks)
        {
            if let Some(entry) = self.script.pop_front() {
                due.push(entry.input);
            }
        }

        for command in due.into_iter().chain(self.pending.drain(..)) {
            match state.apply(command) {
                Ok(()) => summary.commands_applied += 1,
                Err(err) => {
                    summary.commands_rejected += 1;
                    warn!(?command, %err, "command rejected");
                }
            }
        }
    }
}
