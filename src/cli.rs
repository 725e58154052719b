//! Command-line argument parsing for the `energy-telemetry` binary.

use std::env;
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::sim::history::Period;

/// Snapshots printed when `--ticks` is not given.
pub const DEFAULT_TICKS: usize = 5;
/// API port when `--port` is not given.
pub const DEFAULT_PORT: u16 = 3000;

/// What the binary was asked to do.
#[derive(Debug, PartialEq)]
pub enum CliCommand {
    Help,
    Run(CliOptions),
}

/// Parsed run options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub ticks: usize,
    pub tick_ms: Option<u64>,
    pub history: Option<Period>,
    pub history_out: Option<PathBuf>,
    pub readings_out: Option<PathBuf>,
    pub serve: bool,
    pub port: u16,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: None,
            preset: None,
            seed: None,
            ticks: DEFAULT_TICKS,
            tick_ms: None,
            history: None,
            history_out: None,
            readings_out: None,
            serve: false,
            port: DEFAULT_PORT,
        }
    }
}

impl CliOptions {
    /// Loads the selected config source, applies overrides, and validates.
    ///
    /// Falls back to the `office` preset when neither `--config` nor
    /// `--preset` is given.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if loading or validation fails.
    pub fn resolve_config(&self) -> Result<EngineConfig, EngineError> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => EngineConfig::from_toml_file(path)?,
            (None, Some(name)) => EngineConfig::from_preset(name)?,
            (None, None) => EngineConfig::office(),
        };
        if let Some(seed) = self.seed {
            config.engine.seed = Some(seed);
        }
        if let Some(tick_ms) = self.tick_ms {
            config.engine.tick_ms = tick_ms;
        }
        config.ensure_valid()?;
        Ok(config)
    }

    /// The history period to generate, if one was requested directly or via `--history-out`.
    pub fn history_period(&self) -> Option<Period> {
        self.history
            .or_else(|| self.history_out.as_ref().map(|_| Period::default()))
    }
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliCommand, String> {
    parse_args_from(env::args().skip(1).collect())
}

/// Parses arguments, excluding the program name.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args_from(args: Vec<String>) -> Result<CliCommand, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                opts.seed = Some(parse_number(&args, i, "--seed", "u64")?);
            }
            "--ticks" => {
                i += 1;
                opts.ticks = parse_number(&args, i, "--ticks", "non-negative integer")?;
            }
            "--tick-ms" => {
                i += 1;
                opts.tick_ms = Some(parse_number(&args, i, "--tick-ms", "u64")?);
            }
            "--history" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --history (expected hour, day, week, or month)")?;
                opts.history = Some(name.parse::<Period>().map_err(|e| e.to_string())?);
            }
            "--history-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --history-out (expected a file path)")?;
                opts.history_out = Some(PathBuf::from(path));
            }
            "--readings-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --readings-out (expected a file path)")?;
                opts.readings_out = Some(PathBuf::from(path));
            }
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(not(feature = "api"))]
            "--serve" => return Err("--serve requires building with `--features api`".to_string()),
            "--port" => {
                i += 1;
                opts.port = parse_number(&args, i, "--port", "u16")?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(CliCommand::Run(opts))
}

fn parse_number<T: std::str::FromStr>(
    args: &[String],
    index: usize,
    flag: &str,
    expected: &str,
) -> Result<T, String> {
    let raw = args.next_or_err(index, &format!("missing value for {flag} (expected a {expected})"))?;
    raw.parse::<T>()
        .map_err(|_| format!("{flag} value \"{raw}\" is not a valid {expected}"))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("energy-telemetry - simulated device energy telemetry with pub/sub delivery");
    eprintln!();
    eprintln!("Usage: energy-telemetry [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load engine config from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset ({})", EngineConfig::PRESETS.join(", "));
    eprintln!("  --seed <u64>           Seed the random source for reproducible output");
    eprintln!("  --ticks <n>            Snapshots to print before exiting (default: {DEFAULT_TICKS})");
    eprintln!("  --tick-ms <ms>         Override the tick period");
    eprintln!("  --history <period>     Print a historical series (hour, day, week, month)");
    eprintln!("  --history-out <path>   Export the historical series to CSV");
    eprintln!("  --readings-out <path>  Export printed snapshots' readings to CSV");
    eprintln!("  --serve                Start the REST API (requires the `api` feature)");
    eprintln!("  --port <u16>           API server port (default: {DEFAULT_PORT})");
    eprintln!("  --help                 Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the office preset is used.");
}
