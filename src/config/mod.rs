//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs with `deny_unknown_fields`
//! - Schema range checks via `validator`
//! - Runtime semantic validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::controller::{InputCommand, ScriptedCommand};
use crate::engine::clock::ResetPolicy;
use crate::engine::jidoka::JidokaConfig;
use crate::engine::state::positive_step;
use crate::error::{KeplerError, KeplerResult};
use crate::orbit::elements::{OrbitParameters, DEFAULT_SEMI_MAJOR_AXIS};
use crate::orbit::solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::orbit::state::DEFAULT_CURVE_SAMPLES;
use crate::orbit::wedges::DEFAULT_NUM_WEDGES;

/// Built-in configuration reproducing the classroom demo.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../configs/equal_areas.yaml");

/// Top-level simulation configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct KeplerConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Orbit shape.
    #[validate(nested)]
    #[serde(default)]
    pub orbit: OrbitConfig,

    /// Clock and pacing.
    #[validate(nested)]
    #[serde(default)]
    pub clock: ClockConfig,

    /// Wedge history.
    #[validate(nested)]
    #[serde(default)]
    pub wedges: WedgeConfig,

    /// Newton-Raphson settings.
    #[validate(nested)]
    #[serde(default)]
    pub solver: SolverConfig,

    /// Jidoka (stop-on-defect) checks.
    #[serde(default)]
    pub guard: JidokaConfig,

    /// Commands to apply at given ticks of a headless run.
    #[serde(default)]
    pub script: Vec<ScriptedCommand>,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl KeplerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> KeplerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> KeplerResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// The built-in configuration.
    ///
    /// # Errors
    ///
    /// Returns error only if the embedded YAML is malformed.
    pub fn embedded() -> KeplerResult<Self> {
        Self::from_yaml(DEFAULT_CONFIG_YAML)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> KeplerConfigBuilder {
        KeplerConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first failing constraint.
    pub fn check(&self) -> KeplerResult<()> {
        // Poka-Yoke: validate all constraints
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> KeplerResult<()> {
        // Rejects non-finite values the range checks let through
        OrbitParameters::new(self.orbit.semi_major_axis, self.orbit.eccentricity)?;

        positive_step("clock.time_step", self.clock.time_step)?;
        positive_step("clock.speed", self.clock.speed)?;

        if !self.guard.vis_viva_tolerance.is_finite() || self.guard.vis_viva_tolerance <= 0.0 {
            return Err(KeplerError::config(format!(
                "guard.vis_viva_tolerance must be positive, got {}",
                self.guard.vis_viva_tolerance
            )));
        }

        for entry in &self.script {
            let invalid = match entry.input {
                InputCommand::SetEccentricity(e) => {
                    OrbitParameters::check_eccentricity(e).is_err()
                }
                InputCommand::SetTimeStep(v) | InputCommand::SetSpeed(v) => {
                    positive_step("step", v).is_err()
                }
                _ => false,
            };
            if invalid {
                return Err(KeplerError::config(format!(
                    "script entry at tick {} has an invalid value: {:?}",
                    entry.at_tick, entry.input
                )));
            }
        }

        Ok(())
    }

    /// Orbit parameters described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the orbit section is out of range.
    pub fn orbit_parameters(&self) -> KeplerResult<OrbitParameters> {
        OrbitParameters::new(self.orbit.semi_major_axis, self.orbit.eccentricity)
    }
}

impl Default for KeplerConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            orbit: OrbitConfig::default(),
            clock: ClockConfig::default(),
            wedges: WedgeConfig::default(),
            solver: SolverConfig::default(),
            guard: JidokaConfig::default(),
            script: Vec::new(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct KeplerConfigBuilder {
    eccentricity: Option<f64>,
    semi_major_axis: Option<f64>,
    time_step: Option<f64>,
    speed: Option<f64>,
    num_wedges: Option<usize>,
    start_paused: Option<bool>,
    reset_policy: Option<ResetPolicy>,
    guard: Option<JidokaConfig>,
    script: Vec<ScriptedCommand>,
}

impl KeplerConfigBuilder {
    /// Start from an existing configuration's values.
    #[must_use]
    pub fn from_config(config: &KeplerConfig) -> Self {
        Self {
            eccentricity: Some(config.orbit.eccentricity),
            semi_major_axis: Some(config.orbit.semi_major_axis),
            time_step: Some(config.clock.time_step),
            speed: Some(config.clock.speed),
            num_wedges: Some(config.wedges.count),
            start_paused: Some(config.clock.start_paused),
            reset_policy: Some(config.clock.reset_policy),
            guard: Some(config.guard.clone()),
            script: config.script.clone(),
        }
    }

    #[must_use]
    pub const fn eccentricity(mut self, e: f64) -> Self {
        self.eccentricity = Some(e);
        self
    }

    #[must_use]
    pub const fn semi_major_axis(mut self, a: f64) -> Self {
        self.semi_major_axis = Some(a);
        self
    }

    /// Set the mean-anomaly step per tick.
    #[must_use]
    pub const fn time_step(mut self, dt: f64) -> Self {
        self.time_step = Some(dt);
        self
    }

    #[must_use]
    pub const fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    #[must_use]
    pub const fn num_wedges(mut self, count: usize) -> Self {
        self.num_wedges = Some(count);
        self
    }

    #[must_use]
    pub const fn start_paused(mut self, paused: bool) -> Self {
        self.start_paused = Some(paused);
        self
    }

    #[must_use]
    pub const fn reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = Some(policy);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JidokaConfig is not Copy
    pub fn guard(mut self, config: JidokaConfig) -> Self {
        self.guard = Some(config);
        self
    }

    /// Schedule a command for a tick.
    #[must_use]
    pub fn schedule(mut self, at_tick: u64, input: InputCommand) -> Self {
        self.script.push(ScriptedCommand { at_tick, input });
        self
    }

    /// Build the configuration without validating it.
    #[must_use]
    pub fn build(self) -> KeplerConfig {
        let mut config = KeplerConfig::default();

        if let Some(e) = self.eccentricity {
            config.orbit.eccentricity = e;
        }
        if let Some(a) = self.semi_major_axis {
            config.orbit.semi_major_axis = a;
        }
        if let Some(dt) = self.time_step {
            config.clock.time_step = dt;
        }
        if let Some(speed) = self.speed {
            config.clock.speed = speed;
        }
        if let Some(count) = self.num_wedges {
            config.wedges.count = count;
        }
        if let Some(paused) = self.start_paused {
            config.clock.start_paused = paused;
        }
        if let Some(policy) = self.reset_policy {
            config.clock.reset_policy = policy;
        }
        if let Some(guard) = self.guard {
            config.guard = guard;
        }
        config.script = self.script;

        config
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns error if the assembled configuration is invalid.
    pub fn build_checked(self) -> KeplerResult<KeplerConfig> {
        let config = self.build();
        config.check()?;
        Ok(config)
    }
}

/// Orbit shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OrbitConfig {
    /// Semi-major axis `a` (AU-like units).
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_semi_major_axis")]
    pub semi_major_axis: f64,
    /// Initial eccentricity, within the slider range.
    #[validate(range(min = 0.0, max = 0.85))]
    #[serde(default = "default_eccentricity")]
    pub eccentricity: f64,
    /// Points in the sampled orbit curve.
    #[validate(range(min = 2, max = 100_000))]
    #[serde(default = "default_curve_samples")]
    pub curve_samples: usize,
}

const fn default_semi_major_axis() -> f64 {
    DEFAULT_SEMI_MAJOR_AXIS
}

const fn default_eccentricity() -> f64 {
    0.35
}

const fn default_curve_samples() -> usize {
    DEFAULT_CURVE_SAMPLES
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            semi_major_axis: default_semi_major_axis(),
            eccentricity: default_eccentricity(),
            curve_samples: default_curve_samples(),
        }
    }
}

/// Clock and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ClockConfig {
    /// Mean-anomaly increment per tick (radians).
    #[validate(range(min = 0.01, max = 0.2))]
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Multiplier applied to `time_step`.
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Wall-clock interval between ticks for real-time runs.
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Start paused instead of running.
    #[serde(default)]
    pub start_paused: bool,
    /// Run state after reset.
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

const fn default_time_step() -> f64 {
    0.08
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_tick_interval_ms() -> u64 {
    40
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            speed: default_speed(),
            tick_interval_ms: default_tick_interval_ms(),
            start_paused: false,
            reset_policy: ResetPolicy::default(),
        }
    }
}

/// Wedge history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct WedgeConfig {
    /// Number of wedges kept (history holds `count + 1` points).
    #[validate(range(min = 1, max = 1_000))]
    #[serde(default = "default_wedge_count")]
    pub count: usize,
}

const fn default_wedge_count() -> usize {
    DEFAULT_NUM_WEDGES
}

impl Default for WedgeConfig {
    fn default() -> Self {
        Self {
            count: default_wedge_count(),
        }
    }
}

/// Newton-Raphson settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Stop once `|ΔE|` falls below this.
    #[validate(range(exclusive_min = 0.0, max = 1e-3))]
    #[serde(default = "default_solver_tolerance")]
    pub tolerance: f64,
    /// Iteration cap; non-convergence is not an error.
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

const fn default_solver_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

const fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: default_solver_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}
