//! CLI argument parsing.
//!
//! This module provides the argument parser for the kepler-sweep CLI.
//! Extracted to enable comprehensive testing of argument parsing logic.

use std::path::PathBuf;
use std::str::FromStr;

use crate::orbit::elements::DEFAULT_SEMI_MAJOR_AXIS;
use crate::orbit::state::DEFAULT_CURVE_SAMPLES;

/// Ticks run by `run` when `--ticks` is absent.
pub const DEFAULT_RUN_TICKS: u64 = 200;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the simulation headless
    Run {
        /// Optional configuration file; the built-in one otherwise.
        config_path: Option<PathBuf>,
        /// Number of ticks to run.
        ticks: u64,
        /// Emit JSON lines instead of the info panel.
        json: bool,
        /// Pace ticks in wall-clock time.
        realtime: bool,
        /// Eccentricity override.
        eccentricity: Option<f64>,
        /// Time step override.
        time_step: Option<f64>,
        /// Print the info panel every N ticks (0 = final frame only).
        report_every: u64,
    },
    /// Solve Kepler's equation once
    Solve {
        mean_anomaly: f64,
        eccentricity: f64,
    },
    /// Position and velocity at one mean anomaly
    Point {
        mean_anomaly: f64,
        eccentricity: f64,
        semi_major_axis: f64,
    },
    /// Sampled closed orbit curve as CSV
    Curve {
        eccentricity: f64,
        samples: usize,
        semi_major_axis: f64,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration YAML file.
        config_path: PathBuf,
    },
    /// Evaluate the metamorphic relations for one orbit
    Verify {
        eccentricity: f64,
        time_step: f64,
    },
    /// Malformed invocation
    Invalid {
        /// What was wrong.
        message: String,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let rest = &args[2..];
        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(rest),
            "solve" => Self::parse_solve_command(rest),
            "point" => Self::parse_point_command(rest),
            "curve" => Self::parse_curve_command(rest),
            "check" => Self::parse_check_command(rest),
            "verify" => Self::parse_verify_command(rest),
            "-h" | "--help" | "help" => Ok(Command::Help),
            "-V" | "--version" | "version" => Ok(Command::Version),
            unknown => Err(format!("Unknown command: {unknown}")),
        };

        Self {
            command: command.unwrap_or_else(|message| Command::Invalid { message }),
        }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(args: &[String]) -> Result<Command, String> {
        let mut config_path = None;
        let mut ticks = DEFAULT_RUN_TICKS;
        let mut json = false;
        let mut realtime = false;
        let mut eccentricity = None;
        let mut time_step = None;
        let mut report_every = 0;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--ticks" => ticks = option_value(args, &mut i, "--ticks")?,
                "--eccentricity" | "-e" => {
                    eccentricity = Some(option_value(args, &mut i, "--eccentricity")?);
                }
                "--dt" => time_step = Some(option_value(args, &mut i, "--dt")?),
                "--every" => report_every = option_value(args, &mut i, "--every")?,
                "--json" => json = true,
                "--realtime" => realtime = true,
                flag if flag.starts_with('-') => {
                    return Err(format!("Unknown option for 'run': {flag}"));
                }
                path => {
                    if config_path.is_some() {
                        return Err(format!("Unexpected argument: {path}"));
                    }
                    config_path = Some(PathBuf::from(path));
                }
            }
            i += 1;
        }

        Ok(Command::Run {
            config_path,
            ticks,
            json,
            realtime,
            eccentricity,
            time_step,
            report_every,
        })
    }

    /// Parse the 'solve' command arguments.
    fn parse_solve_command(args: &[String]) -> Result<Command, String> {
        let [m, e, ..] = args else {
            return Err("'solve' requires <MEAN_ANOMALY> <ECCENTRICITY>".to_string());
        };
        Ok(Command::Solve {
            mean_anomaly: parse_number(m, "mean anomaly")?,
            eccentricity: parse_number(e, "eccentricity")?,
        })
    }

    /// Parse the 'point' command arguments.
    fn parse_point_command(args: &[String]) -> Result<Command, String> {
        let [m, e, options @ ..] = args else {
            return Err("'point' requires <MEAN_ANOMALY> <ECCENTRICITY>".to_string());
        };
        let mut semi_major_axis = DEFAULT_SEMI_MAJOR_AXIS;

        let mut i = 0;
        while i < options.len() {
            match options[i].as_str() {
                "--a" | "-a" => semi_major_axis = option_value(options, &mut i, "--a")?,
                other => return Err(format!("Unknown option for 'point': {other}")),
            }
            i += 1;
        }

        Ok(Command::Point {
            mean_anomaly: parse_number(m, "mean anomaly")?,
            eccentricity: parse_number(e, "eccentricity")?,
            semi_major_axis,
        })
    }

    /// Parse the 'curve' command arguments.
    fn parse_curve_command(args: &[String]) -> Result<Command, String> {
        let [e, options @ ..] = args else {
            return Err("'curve' requires <ECCENTRICITY>".to_string());
        };
        let mut samples = DEFAULT_CURVE_SAMPLES;
        let mut semi_major_axis = DEFAULT_SEMI_MAJOR_AXIS;

        let mut i = 0;
        while i < options.len() {
            match options[i].as_str() {
                "--samples" | "-n" => samples = option_value(options, &mut i, "--samples")?,
                "--a" | "-a" => semi_major_axis = option_value(options, &mut i, "--a")?,
                other => return Err(format!("Unknown option for 'curve': {other}")),
            }
            i += 1;
        }

        Ok(Command::Curve {
            eccentricity: parse_number(e, "eccentricity")?,
            samples,
            semi_major_axis,
        })
    }

    /// Parse the 'check' command arguments.
    fn parse_check_command(args: &[String]) -> Result<Command, String> {
        let [path, ..] = args else {
            return Err("'check' requires a configuration path".to_string());
        };
        Ok(Command::Check {
            config_path: PathBuf::from(path),
        })
    }

    /// Parse the 'verify' command arguments.
    fn parse_verify_command(args: &[String]) -> Result<Command, String> {
        let mut eccentricity = 0.35;
        let mut time_step = 0.08;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--eccentricity" | "-e" => {
                    eccentricity = option_value(args, &mut i, "--eccentricity")?;
                }
                "--dt" => time_step = option_value(args, &mut i, "--dt")?,
                other => return Err(format!("Unknown option for 'verify': {other}")),
            }
            i += 1;
        }

        Ok(Command::Verify {
            eccentricity,
            time_step,
        })
    }
}

/// Consume the value following the option at `args[*i]`.
fn option_value<T: FromStr>(args: &[String], i: &mut usize, name: &str) -> Result<T, String> {
    *i += 1;
    let raw = args
        .get(*i)
        .ok_or_else(|| format!("{name} requires a value"))?;
    parse_number(raw, name)
}

fn parse_number<T: FromStr>(raw: &str, name: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("Invalid value for {name}: {raw}"))
}
