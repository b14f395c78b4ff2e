// ABOUTME: Entry point for the anthony-deploy CLI application.
// ABOUTME: Parses arguments, sets up logging, and races the pipeline against Ctrl-C.

mod cli;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anthony_deploy::config::CONFIG_FILENAME;
use anthony_deploy::deploy::{DeployError, DeployOptions, run_deployment};
use anthony_deploy::error::Result;
use anthony_deploy::logging::{self, ConsoleTarget, LOG_FILENAME, LogSettings};
use anthony_deploy::output::{Output, OutputMode};
use anthony_deploy::runner::SystemRunner;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    let project_root = match resolve_project_root(cli.project_root.clone()) {
        Ok(root) => root,
        Err(e) => {
            output.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| project_root.join(LOG_FILENAME));
    let _guard = match logging::init(log_settings(&cli, &log_file)) {
        Ok(guard) => guard,
        Err(e) => {
            output.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let options = DeployOptions::new(&project_root)
        .config_path(
            cli.config
                .clone()
                .unwrap_or_else(|| project_root.join(CONFIG_FILENAME)),
        )
        .skip_tests(cli.skip_tests)
        .skip_backup(cli.skip_backup);

    output.start_timer();

    let result = tokio::select! {
        result = run_deployment(cli.environment, options, Arc::new(SystemRunner)) => result,
        _ = tokio::signal::ctrl_c() => {
            let error = DeployError::interrupted();
            tracing::warn!("{}", error);
            output.error(&error.to_string());
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(report) => {
            output.deployed(&report);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            output.failed(&failure);
            ExitCode::FAILURE
        }
    }
}

fn resolve_project_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root),
        None => Ok(env::current_dir()?),
    }
}

/// Console verbosity: `-v` shows debug, `-q` only errors, and `--json`
/// moves log lines to stderr so stdout stays machine-readable.
fn log_settings<'a>(cli: &Cli, log_file: &'a std::path::Path) -> LogSettings<'a> {
    let console_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if cli.json {
        "warn"
    } else {
        "info"
    };
    let console = if cli.quiet || cli.json {
        ConsoleTarget::Stderr
    } else {
        ConsoleTarget::Stdout
    };

    LogSettings {
        console_level,
        console,
        log_file,
    }
}
