// ABOUTME: Tracing setup for the console and the append-only deployment log.
// ABOUTME: The log file always records INFO and above; console verbosity follows CLI flags.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::error::{Error, Result};

pub const LOG_FILENAME: &str = "deployment.log";

/// Where console log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    /// Keeps stdout clean for machine-readable output.
    Stderr,
}

#[derive(Debug, Clone, Copy)]
pub struct LogSettings<'a> {
    /// Default console filter when `RUST_LOG` is unset.
    pub console_level: &'a str,
    pub console: ConsoleTarget,
    pub log_file: &'a Path,
}

/// Install the global subscriber.
///
/// The returned guard flushes the log file when dropped and must be held
/// until the process exits.
pub fn init(settings: LogSettings<'_>) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(settings.log_file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(env_filter("info"));

    let console_layer = match settings.console {
        ConsoleTarget::Stdout => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stdout)
            .with_filter(env_filter(settings.console_level))
            .boxed(),
        ConsoleTarget::Stderr => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter(settings.console_level))
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(guard)
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
