//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Extracted to enable comprehensive testing of command behavior.

use std::io::{self, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use crate::config::{KeplerConfig, KeplerConfigBuilder};
use crate::controller::TIME_STEP_SLIDER;
use crate::engine::scheduler::Pacing;
use crate::engine::run_simulation;
use crate::error::{KeplerError, KeplerResult};
use crate::orbit::elements::OrbitParameters;
use crate::orbit::metamorphic::run_all_metamorphic_tests;
use crate::orbit::solver::KeplerSolver;
use crate::orbit::state::OrbitStateComputer;
use crate::render::{JsonLinesRenderer, ReportRenderer};

use super::output::{
    format_config_summary, format_curve, format_metamorphic_results, format_point,
    format_run_summary, format_solve, print_help, print_version,
};
use super::{Args, Command};

/// Options for the `run` command.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub ticks: u64,
    pub json: bool,
    pub realtime: bool,
    pub eccentricity: Option<f64>,
    pub time_step: Option<f64>,
    pub report_every: u64,
}

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            ticks,
            json,
            realtime,
            eccentricity,
            time_step,
            report_every,
        } => run_headless(&RunOptions {
            config_path: config_path.as_deref(),
            ticks,
            json,
            realtime,
            eccentricity,
            time_step,
            report_every,
        }),
        Command::Solve {
            mean_anomaly,
            eccentricity,
        } => report(solve(mean_anomaly, eccentricity)),
        Command::Point {
            mean_anomaly,
            eccentricity,
            semi_major_axis,
        } => report(point(mean_anomaly, eccentricity, semi_major_axis)),
        Command::Curve {
            eccentricity,
            samples,
            semi_major_axis,
        } => report(curve(eccentricity, samples, semi_major_axis)),
        Command::Check { config_path } => report(check_config(&config_path)),
        Command::Verify {
            eccentricity,
            time_step,
        } => verify(eccentricity, time_step),
        Command::Invalid { message } => {
            eprintln!("Error: {message}\n");
            print_help();
            ExitCode::from(2)
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

fn report(result: KeplerResult<String>) -> ExitCode {
    match result {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Resolve the configuration for `run`: file or built-in, then overrides.
///
/// # Errors
///
/// Returns error if the file cannot be loaded or an override is invalid.
pub fn resolve_config(options: &RunOptions<'_>) -> KeplerResult<KeplerConfig> {
    let base = match options.config_path {
        Some(path) => KeplerConfig::load(path)?,
        None => KeplerConfig::embedded()?,
    };
    let mut builder = KeplerConfigBuilder::from_config(&base);
    if let Some(e) = options.eccentricity {
        builder = builder.eccentricity(e);
    }
    if let Some(dt) = options.time_step {
        builder = builder.time_step(dt);
    }
    let mut config = builder.build_checked()?;
    config.schema_version = base.schema_version;
    Ok(config)
}

/// Run the simulation and stream frames to stdout.
#[must_use]
pub fn run_headless(options: &RunOptions<'_>) -> ExitCode {
    let config = match resolve_config(options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };
    let pacing = if options.realtime {
        Pacing::Realtime
    } else {
        Pacing::Unpaced
    };

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());
    let result = if options.json {
        run_simulation(&config, &mut JsonLinesRenderer::new(writer), options.ticks, pacing)
    } else {
        run_simulation(
            &config,
            &mut ReportRenderer::new(writer, options.report_every),
            options.ticks,
            pacing,
        )
    };

    match result {
        Ok((_, summary)) => {
            if options.json {
                eprintln!("{}", format_run_summary(&summary));
            } else {
                println!("{}", format_run_summary(&summary));
            }
            match summary.check() {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::from(1)
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Solve Kepler's equation and describe the result.
///
/// # Errors
///
/// Returns error for an eccentricity outside `[0, 1)` or a non-finite `M`.
pub fn solve(mean_anomaly: f64, eccentricity: f64) -> KeplerResult<String> {
    OrbitParameters::check_eccentricity(eccentricity)?;
    if !mean_anomaly.is_finite() {
        return Err(KeplerError::non_finite("mean anomaly"));
    }
    let outcome = KeplerSolver::new().solve_detailed(mean_anomaly, eccentricity);
    Ok(format_solve(mean_anomaly, eccentricity, &outcome))
}

/// Describe the body state at one mean anomaly.
///
/// # Errors
///
/// Returns error for invalid orbit elements or a non-finite `M`.
pub fn point(mean_anomaly: f64, eccentricity: f64, semi_major_axis: f64) -> KeplerResult<String> {
    if !mean_anomaly.is_finite() {
        return Err(KeplerError::non_finite("mean anomaly"));
    }
    let state = OrbitStateComputer::default().point(semi_major_axis, eccentricity, mean_anomaly)?;
    Ok(format_point(&state))
}

/// Sample the closed orbit curve as CSV.
///
/// # Errors
///
/// Returns error for invalid orbit elements.
pub fn curve(eccentricity: f64, samples: usize, semi_major_axis: f64) -> KeplerResult<String> {
    let params = OrbitParameters::new(semi_major_axis, eccentricity)?;
    let points = OrbitStateComputer::default().orbit_curve(&params, samples);
    Ok(format_curve(&points))
}

/// Load and validate a configuration file.
///
/// # Errors
///
/// Returns the first load or validation failure.
pub fn check_config(path: &Path) -> KeplerResult<String> {
    let config = KeplerConfig::load(path)?;
    Ok(format_config_summary(&config))
}

/// Evaluate every metamorphic relation; exit 1 if any fails.
#[must_use]
pub fn verify(eccentricity: f64, time_step: f64) -> ExitCode {
    match metamorphic_report(eccentricity, time_step) {
        Ok((text, all_passed)) => {
            println!("{text}");
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Run the metamorphic relations and format the table.
///
/// The time step must lie on the time-step slider domain.
///
/// # Errors
///
/// Returns error for an invalid eccentricity or time step.
pub fn metamorphic_report(eccentricity: f64, time_step: f64) -> KeplerResult<(String, bool)> {
    let params = OrbitParameters::new(1.0, eccentricity)?;
    if !TIME_STEP_SLIDER.contains(time_step) {
        return Err(KeplerError::InvalidStep {
            name: "time step",
            value: time_step,
        });
    }
    let results = run_all_metamorphic_tests(&params, time_step);
    let all_passed = results.iter().all(|r| r.passed);
    Ok((format_metamorphic_results(&results), all_passed))
}
