//! Simulation state management.
//!
//! [`SimulationState`] is the single value object the scheduler drives. It
//! owns the orbit parameters, the clock, the wedge tracker, the cached orbit
//! curve and the current body state. There is no global state: every
//! parameter change goes through a method here and takes effect between
//! ticks.

use std::sync::Arc;

use tracing::debug;

use crate::config::KeplerConfig;
use crate::controller::InputCommand;
use crate::engine::clock::{ResetPolicy, RunState, SimulationClock};
use crate::engine::jidoka::{JidokaGuard, JidokaResponse, JidokaStatus};
use crate::error::{KeplerError, KeplerResult};
use crate::orbit::elements::OrbitParameters;
use crate::orbit::solver::KeplerSolver;
use crate::orbit::state::{OrbitState, OrbitStateComputer};
use crate::orbit::vec2::Vec2;
use crate::orbit::wedges::AreaWedgeTracker;
use crate::render::{FrameSnapshot, OrbitSummary};

/// Complete simulation state.
#[derive(Debug, Clone)]
pub struct SimulationState {
    params: OrbitParameters,
    computer: OrbitStateComputer,
    clock: SimulationClock,
    tracker: AreaWedgeTracker,
    guard: JidokaGuard,
    curve: Arc<[Vec2]>,
    current: OrbitState,
    time_step: f64,
    speed: f64,
    reset_policy: ResetPolicy,
    curve_samples: usize,
}

impl SimulationState {
    /// Build the initial state at `M = 0` with an empty wedge history.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation.
    pub fn new(config: &KeplerConfig) -> KeplerResult<Self> {
        config.check()?;

        let params = config.orbit_parameters()?;
        let computer = OrbitStateComputer::new(KeplerSolver::with_settings(
            config.solver.tolerance,
            config.solver.max_iterations,
        ));
        let run_state = if config.clock.start_paused {
            RunState::Paused
        } else {
            RunState::Running
        };
        let curve: Arc<[Vec2]> = computer.orbit_curve(&params, config.orbit.curve_samples).into();
        let current = computer.state_at(&params, 0.0);

        debug!(
            a = params.semi_major_axis(),
            e = params.eccentricity(),
            dt = config.clock.time_step,
            wedges = config.wedges.count,
            "simulation state created"
        );

        Ok(Self {
            params,
            computer,
            clock: SimulationClock::new(run_state),
            tracker: AreaWedgeTracker::new(config.wedges.count)?,
            guard: JidokaGuard::new(config.guard.clone()),
            curve,
            current,
            time_step: positive_step("time step", config.clock.time_step)?,
            speed: positive_step("speed", config.clock.speed)?,
            reset_policy: config.clock.reset_policy,
            curve_samples: config.orbit.curve_samples,
        })
    }

    /// Advance one tick by `time_step · speed` if running.
    ///
    /// Returns whether the body moved.
    pub fn tick(&mut self) -> bool {
        if !self.clock.tick(self.effective_step()) {
            return false;
        }
        self.current = self
            .computer
            .state_at(&self.params, self.clock.mean_anomaly());
        self.tracker
            .record(self.current.position.x, self.current.position.y);
        true
    }

    /// Run the guard over the current body state.
    pub fn check_guard(&mut self) -> JidokaResponse {
        self.guard.check(&self.current)
    }

    /// Change the eccentricity, rewinding to perihelion.
    ///
    /// The wedge history is cleared and the orbit curve recomputed. The run
    /// state is left alone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEccentricity` for non-finite values or values outside
    /// `[0, 1)`; the state is unchanged in that case.
    pub fn set_eccentricity(&mut self, eccentricity: f64) -> KeplerResult<()> {
        self.params = self.params.with_eccentricity(eccentricity)?;
        self.clock.rewind();
        self.tracker.clear();
        self.curve = self
            .computer
            .orbit_curve(&self.params, self.curve_samples)
            .into();
        self.current = self.computer.state_at(&self.params, 0.0);
        debug!(e = eccentricity, "eccentricity changed; history cleared");
        Ok(())
    }

    /// Change the mean-anomaly step per tick. History is kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStep` unless the value is finite and positive.
    pub fn set_time_step(&mut self, time_step: f64) -> KeplerResult<()> {
        self.time_step = positive_step("time step", time_step)?;
        debug!(dt = time_step, "time step changed");
        Ok(())
    }

    /// Change the speed multiplier. History is kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStep` unless the value is finite and positive.
    pub fn set_speed(&mut self, speed: f64) -> KeplerResult<()> {
        self.speed = positive_step("speed", speed)?;
        debug!(speed, "speed multiplier changed");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Flip between running and paused.
    pub fn toggle(&mut self) -> RunState {
        let run_state = self.clock.toggle();
        debug!(?run_state, "run state toggled");
        run_state
    }

    /// Back to `M = 0` with an empty history; run state per the reset policy.
    pub fn reset(&mut self) {
        self.clock.reset(self.reset_policy);
        self.tracker.clear();
        self.guard.reset();
        self.current = self.computer.state_at(&self.params, 0.0);
        debug!(policy = ?self.reset_policy, "simulation reset");
    }

    /// Apply a user command.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the underlying setter; rejected
    /// commands leave the state unchanged.
    pub fn apply(&mut self, command: InputCommand) -> KeplerResult<()> {
        match command {
            InputCommand::SetEccentricity(e) => self.set_eccentricity(e)?,
            InputCommand::SetTimeStep(dt) => self.set_time_step(dt)?,
            InputCommand::SetSpeed(speed) => self.set_speed(speed)?,
            InputCommand::PlayPause => {
                self.toggle();
            }
            InputCommand::Pause => self.pause(),
            InputCommand::Resume => self.resume(),
            InputCommand::Reset => self.reset(),
        }
        Ok(())
    }

    /// Immutable view of the current frame.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        let latest_area = self.tracker.latest_area();
        FrameSnapshot {
            tick: self.clock.tick_count(),
            mean_anomaly: self.clock.mean_anomaly(),
            run_state: self.clock.run_state(),
            semi_major_axis: self.params.semi_major_axis(),
            eccentricity: self.params.eccentricity(),
            time_step: self.time_step,
            speed_multiplier: self.speed,
            body: self.current,
            curve: Arc::clone(&self.curve),
            wedges: self.tracker.wedges(),
            stats: self.tracker.stats(),
            summary: OrbitSummary::new(&self.params, &self.current, latest_area),
            guard: *self.guard.status(),
        }
    }

    /// Mean-anomaly advance applied by one running tick.
    #[must_use]
    pub fn effective_step(&self) -> f64 {
        self.time_step * self.speed
    }

    #[must_use]
    pub const fn params(&self) -> &OrbitParameters {
        &self.params
    }

    #[must_use]
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    #[must_use]
    pub const fn tracker(&self) -> &AreaWedgeTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn current(&self) -> &OrbitState {
        &self.current
    }

    #[must_use]
    pub const fn curve(&self) -> &Arc<[Vec2]> {
        &self.curve
    }

    #[must_use]
    pub const fn time_step(&self) -> f64 {
        self.time_step
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub const fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    #[must_use]
    pub const fn guard_status(&self) -> &JidokaStatus {
        self.guard.status()
    }
}

/// Accept a time step or speed multiplier only if it is finite and positive.
pub(crate) fn positive_step(name: &'static str, value: f64) -> KeplerResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(KeplerError::InvalidStep { name, value })
    }
}
