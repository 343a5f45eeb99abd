//! Input controller boundary.
//!
//! The UI hands the core [`InputCommand`] values. Slider values are
//! normalized here (clamped to the slider domain and snapped to its step)
//! before they reach the simulation, which performs its own validation.

use serde::{Deserialize, Serialize};

use crate::orbit::elements::MAX_UI_ECCENTRICITY;

/// A parameter change or command from the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum InputCommand {
    /// Change the orbit shape; clears wedge history and rewinds.
    SetEccentricity(f64),
    /// Change the mean-anomaly increment per tick.
    SetTimeStep(f64),
    /// Change the multiplier applied to the time step.
    SetSpeed(f64),
    /// Toggle between running and paused.
    PlayPause,
    Pause,
    Resume,
    /// Rewind to perihelion and clear wedge history.
    Reset,
}

/// A command scheduled for a given tick of a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedCommand {
    /// Applied before the tick with this index (0-based) runs.
    pub at_tick: u64,
    pub input: InputCommand,
}

/// Numeric slider domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    /// Clamp into `[min, max]` and snap to the nearest step.
    ///
    /// NaN passes through unchanged so the core can reject it.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        // Snapping in binary floating point leaves 1e-17 residue; round to
        // the step's decimal precision so 0.35 stays 0.35.
        let snapped = self.min + steps * self.step;
        let scale = 1e6;
        ((snapped * scale).round() / scale).clamp(self.min, self.max)
    }

    /// Whether `value` lies in `[min, max]`; NaN never does.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Eccentricity slider: `[0, 0.85]`, step 0.01.
pub const ECCENTRICITY_SLIDER: SliderRange = SliderRange {
    min: 0.0,
    max: MAX_UI_ECCENTRICITY,
    step: 0.01,
};

/// Time step slider: `[0.01, 0.20]`, step 0.01.
pub const TIME_STEP_SLIDER: SliderRange = SliderRange {
    min: 0.01,
    max: 0.20,
    step: 0.01,
};

/// Translates raw UI events into normalized commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputController;

impl InputController {
    #[must_use]
    pub fn eccentricity_changed(value: f64) -> InputCommand {
        InputCommand::SetEccentricity(ECCENTRICITY_SLIDER.normalize(value))
    }

    #[must_use]
    pub fn time_step_changed(value: f64) -> InputCommand {
        InputCommand::SetTimeStep(TIME_STEP_SLIDER.normalize(value))
    }

    #[must_use]
    pub const fn play_pause_clicked() -> InputCommand {
        InputCommand::PlayPause
    }

    #[must_use]
    pub const fn reset_clicked() -> InputCommand {
        InputCommand::Reset
    }
}
