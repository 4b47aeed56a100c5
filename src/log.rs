//! Console and log-file output for AutoDengue, built on `fern`.
//!
//! Progress messages go to stdout and warnings to stderr. For a `run`, everything is also written
//! to log files in the output folder, so a failed forecast can be diagnosed after the fact.
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback, Output};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Arguments;
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use strum::{Display, EnumString};

/// Set once the global logger is in place
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Overrides `log_level` from `settings.toml` when set
const LOG_LEVEL_ENV_VAR: &str = "AUTODENGUE_LOG_LEVEL";

/// Every message of the run, at `info` or more verbose
const RUN_LOG_FILE_NAME: &str = "autodengue.log";

/// Warnings and errors only, e.g. districts whose forecast could not be used
const WARNINGS_LOG_FILE_NAME: &str = "autodengue_warnings.log";

/// How much the program reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Nothing at all
    Off,
    /// Failures only
    Error,
    /// Failures and unavailable forecasts
    Warn,
    /// Per-district status and the overview
    #[default]
    Info,
    /// Extra detail
    Debug,
    /// Everything
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Parse a level name as given in the environment variable
fn parse_env_level(value: &str) -> Result<LogLevel> {
    LogLevel::from_str(value.trim())
        .map_err(|_| anyhow!("Unknown log level in {LOG_LEVEL_ENV_VAR}: {value}"))
}

/// The level to use: the environment variable wins over `configured`
fn effective_level(configured: LogLevel) -> Result<LevelFilter> {
    let level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(value) => parse_env_level(&value)?,
        Err(_) => configured,
    };

    Ok(level.into())
}

/// Whether [`init`] has succeeded in this process
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Install the program logger.
///
/// # Arguments
///
/// * `configured` - The level from `settings.toml`, overridden by `AUTODENGUE_LOG_LEVEL`
/// * `log_dir` - If given, the run and warnings log files are created here
pub fn init(configured: LogLevel, log_dir: Option<&Path>) -> Result<()> {
    let level = effective_level(configured)?;
    let stdout_colour = std::io::stdout().is_terminal();
    let stderr_colour = std::io::stderr().is_terminal();

    let mut dispatch = Dispatch::new()
        .chain(
            sink(std::io::stdout(), stdout_colour)
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .level(level),
        )
        .chain(sink(std::io::stderr(), stderr_colour).level(level.min(LevelFilter::Warn)));

    if let Some(log_dir) = log_dir {
        dispatch = dispatch
            .chain(
                sink(create_log_file(log_dir, RUN_LOG_FILE_NAME)?, false)
                    .level(level.max(LevelFilter::Info)),
            )
            .chain(
                sink(create_log_file(log_dir, WARNINGS_LOG_FILE_NAME)?, false)
                    .level(LevelFilter::Warn),
            );
    }

    dispatch
        .apply()
        .context("The program logger has already been initialised")?;
    LOGGER_INIT.get_or_init(|| ());

    Ok(())
}

/// Create (or truncate) a log file in `log_dir`
fn create_log_file(log_dir: &Path, file_name: &str) -> Result<File> {
    let file_path = log_dir.join(file_name);
    File::create(&file_path)
        .with_context(|| format!("Could not create log file {}", file_path.display()))
}

/// A destination for log lines, coloured by level if `colour` is set
fn sink<O: Into<Output>>(output: O, colour: bool) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    Dispatch::new()
        .format(move |out, message, record| {
            if colour {
                write_line(out, colours.color(record.level()), message);
            } else {
                write_line(out, record.level(), message);
            }
        })
        .chain(output)
}

/// Format one log line as `[HH:MM:SS LEVEL] message`
fn write_line<L: std::fmt::Display>(out: FormatCallback, level: L, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");
    out.finish(format_args!("[{timestamp} {level}] {message}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[rstest]
    #[case("off", LogLevel::Off)]
    #[case("warn", LogLevel::Warn)]
    #[case("INFO", LogLevel::Info)]
    #[case(" Trace\n", LogLevel::Trace)]
    fn test_parse_env_level(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(parse_env_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_env_level_unknown() {
        assert_error!(
            parse_env_level("loud"),
            "Unknown log level in AUTODENGUE_LOG_LEVEL: loud"
        );
    }

    #[rstest]
    #[case(LogLevel::Off, LevelFilter::Off)]
    #[case(LogLevel::Warn, LevelFilter::Warn)]
    #[case(LogLevel::Debug, LevelFilter::Debug)]
    fn test_level_filter(#[case] level: LogLevel, #[case] expected: LevelFilter) {
        assert_eq!(LevelFilter::from(level), expected);
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::default().to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_create_log_file() {
        let dir = tempfile::tempdir().unwrap();
        create_log_file(dir.path(), RUN_LOG_FILE_NAME).unwrap();
        assert!(dir.path().join(RUN_LOG_FILE_NAME).is_file());
        assert!(create_log_file(&dir.path().join("missing"), RUN_LOG_FILE_NAME).is_err());
    }
}
