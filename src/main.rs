//! kepler-sweep CLI - Kepler orbit propagation and equal-area tracking
//!
//! Command-line interface for running the simulation headless.

use std::process::ExitCode;

use kepler_sweep::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    run_cli(Args::parse())
}

/// Log to stderr so stdout stays clean for JSON and CSV output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("KEPLER_SWEEP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
