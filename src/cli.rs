//! Command-line argument parsing for the `rinha` binary.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line configuration for the Rinha interpreter.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the Rinha source file to run.
    pub file: PathBuf,

    /// Verbosity of the CLI driver's own log output. Never affects
    /// interpreter-fatal diagnostics, which are always printed on failure.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Log level for the CLI driver's own operational messages.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
