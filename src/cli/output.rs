//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Formatting is split from printing to enable testing of output generation.

use std::fmt::Write as _;

use crate::config::KeplerConfig;
use crate::engine::scheduler::{RunSummary, StopReason};
use crate::orbit::metamorphic::MetamorphicResult;
use crate::orbit::solver::SolveOutcome;
use crate::orbit::state::OrbitState;
use crate::orbit::vec2::Vec2;

/// Version line, with build metadata when the build script captured it.
#[must_use]
pub fn version_text() -> String {
    let mut text = format!("kepler-sweep {}", env!("CARGO_PKG_VERSION"));
    if let Some(hash) = option_env!("KEPLER_SWEEP_GIT_HASH").filter(|h| !h.is_empty()) {
        let short = hash.get(..12).unwrap_or(hash);
        let _ = write!(text, " ({short})");
    }
    if let Some(timestamp) = option_env!("KEPLER_SWEEP_BUILD_TIMESTAMP") {
        let _ = write!(text, "\nbuilt at unix time {timestamp}");
    }
    text
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_text());
}

/// Print help message.
pub fn print_help() {
    println!(
        r"kepler-sweep - Kepler orbit propagation and equal-area wedge tracking

USAGE:
    kepler-sweep <COMMAND> [OPTIONS]

COMMANDS:
    run [config.yaml]           Run the simulation headless
        --ticks <N>             Number of ticks (default: 200)
        --eccentricity <E>      Override the initial eccentricity
        --dt <DT>               Override the mean-anomaly step per tick
        --json                  Emit one JSON line per frame
        --every <N>             Print the info panel every N ticks
        --realtime              Pace ticks at the configured interval

    solve <M> <e>               Solve Kepler's equation for E
    point <M> <e> [--a <A>]     Position and velocity at mean anomaly M
    curve <e> [--samples <N>] [--a <A>]
                                Closed orbit curve as CSV

    check <config.yaml>         Validate a configuration file
    verify [--eccentricity <E>] [--dt <DT>]
                                Evaluate the metamorphic relations

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    kepler-sweep run --ticks 400
    kepler-sweep run configs/eccentric_sweep.yaml --json
    kepler-sweep solve 1.0 0.5
    kepler-sweep curve 0.6 --samples 100 > orbit.csv

LOGGING:
    Set KEPLER_SWEEP_LOG (or RUST_LOG), e.g. KEPLER_SWEEP_LOG=debug
"
    );
}

/// Result of `solve`.
#[must_use]
pub fn format_solve(mean_anomaly: f64, eccentricity: f64, outcome: &SolveOutcome) -> String {
    format!(
        "M = {mean_anomaly:.10}\ne = {eccentricity:.6}\nE = {:.12}\n\
         iterations = {}\nconverged = {}\nresidual = {:.3e}",
        outcome.eccentric_anomaly, outcome.iterations, outcome.converged, outcome.residual
    )
}

/// Result of `point`.
#[must_use]
pub fn format_point(state: &OrbitState) -> String {
    format!(
        "M = {:.10}\nE = {:.12}\nf = {:.12}\nr = {:.12}\n\
         position = ({:.12}, {:.12})\nvelocity = ({:.12}, {:.12})\n\
         speed = {:.12}\nvis-viva speed = {:.12}",
        state.mean_anomaly,
        state.eccentric_anomaly,
        state.true_anomaly,
        state.radius,
        state.position.x,
        state.position.y,
        state.velocity.x,
        state.velocity.y,
        state.speed(),
        state.vis_viva_speed(),
    )
}

/// Orbit curve as `x,y` CSV with a header row.
#[must_use]
pub fn format_curve(points: &[Vec2]) -> String {
    let mut csv = String::from("x,y\n");
    for p in points {
        let _ = writeln!(csv, "{},{}", p.x, p.y);
    }
    csv
}

/// Summary of a validated configuration.
#[must_use]
pub fn format_config_summary(config: &KeplerConfig) -> String {
    format!(
        "✓ Configuration valid (schema {})\n  a = {}, e = {}, curve samples = {}\n\
         \x20 dt = {}, speed = {}, tick interval = {} ms\n\
         \x20 wedges = {}, script entries = {}",
        config.schema_version,
        config.orbit.semi_major_axis,
        config.orbit.eccentricity,
        config.orbit.curve_samples,
        config.clock.time_step,
        config.clock.speed,
        config.clock.tick_interval_ms,
        config.wedges.count,
        config.script.len(),
    )
}

/// Summary printed after `run`.
#[must_use]
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let _ = writeln!(text, "Ticks: {} ({} advanced)", summary.ticks, summary.advanced);
    let _ = writeln!(
        text,
        "Commands: {} applied, {} rejected",
        summary.commands_applied, summary.commands_rejected
    );
    let _ = writeln!(text, "Guard warnings: {}", summary.warnings);
    if let Some(cv) = summary.final_cv {
        let _ = writeln!(text, "Final wedge CV: {cv:.2}%");
    }
    match &summary.stop_reason {
        StopReason::Completed => {
            let _ = write!(text, "Status: completed ({:?})", summary.final_run_state);
        }
        StopReason::Halted { violation } => {
            let _ = write!(text, "Status: HALTED - {violation}");
        }
    }
    text
}

/// Table of metamorphic relation results.
#[must_use]
pub fn format_metamorphic_results(results: &[MetamorphicResult]) -> String {
    let mut text = String::new();
    for result in results {
        let symbol = if result.passed { "✓" } else { "✗" };
        let _ = writeln!(
            text,
            "{symbol} {:<20} error {:.3e} (tolerance {:.3e})  {}",
            result.relation, result.error, result.tolerance, result.details
        );
    }
    let passed = results.iter().filter(|r| r.passed).count();
    let _ = write!(text, "{passed}/{} relations hold", results.len());
    text
}
