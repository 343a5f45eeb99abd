//! CLI module for kepler-sweep.
//!
//! This module contains all CLI logic extracted from main.rs to enable
//! full test coverage. The entry point `run_cli` can be called from main.rs
//! with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, DEFAULT_RUN_TICKS};
pub use commands::{
    check_config, curve, point, resolve_config, run_cli, run_headless, solve, verify, RunOptions,
};
pub use output::{
    format_config_summary, format_curve, format_metamorphic_results, format_point,
    format_run_summary, format_solve, print_help, print_version, version_text,
};
