// ABOUTME: Prerequisite checks for required external tools.
// ABOUTME: Verifies the interpreter, git, and per-environment container or cluster tooling.

use crate::config::EnvironmentConfig;
use crate::deploy::DeployError;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runner::{CommandResult, Runner};
use crate::types::Environment;

/// Check that every tool the environment needs is invocable.
///
/// A missing tool is fatal. An interpreter version that differs from the
/// configured one is only a warning.
pub async fn check_prerequisites(
    environment: Environment,
    config: &EnvironmentConfig,
    runner: &Runner,
    diag: &mut Diagnostics,
) -> Result<(), DeployError> {
    tracing::info!("Checking prerequisites...");

    let python = require(
        runner,
        &["python", "--version"],
        "Python is required but not found",
    )
    .await?;
    check_python_version(&python, &config.python_version, diag);

    require(runner, &["git", "--version"], "Git is required but not found").await?;

    match environment {
        Environment::Docker => {
            const MESSAGE: &str = "Docker and Docker Compose are required for Docker deployment";
            require(runner, &["docker", "--version"], MESSAGE).await?;
            require(runner, &["docker-compose", "--version"], MESSAGE).await?;
        }
        Environment::Kubernetes => {
            const MESSAGE: &str = "kubectl and Helm are required for Kubernetes deployment";
            require(runner, &["kubectl", "version", "--client"], MESSAGE).await?;
            require(runner, &["helm", "version"], MESSAGE).await?;
        }
        Environment::Local | Environment::Github => {}
    }

    tracing::info!("Prerequisites check completed successfully");
    Ok(())
}

async fn require(
    runner: &Runner,
    argv: &[&str],
    message: &str,
) -> Result<CommandResult, DeployError> {
    runner.run_checked(argv).await.map_err(|e| {
        tracing::error!("{}", message);
        DeployError::missing_tool(message).with_source(e)
    })
}

fn check_python_version(output: &CommandResult, expected: &str, diag: &mut Diagnostics) {
    match parse_python_version(output) {
        Some(current) if current.starts_with(expected) => {
            tracing::debug!("Python {} matches configured {}", current, expected);
        }
        Some(current) => diag.warn(Warning::python_version(format!(
            "Python version mismatch. Expected: {expected}, Got: {current}"
        ))),
        None => diag.warn(Warning::python_version(format!(
            "Could not determine Python version. Expected: {expected}"
        ))),
    }
}

/// Extract the version token from `python --version` output.
///
/// Older interpreters print the banner to stderr.
pub fn parse_python_version(output: &CommandResult) -> Option<&str> {
    let banner = if output.stdout.trim().is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    banner.split_whitespace().nth(1)
}
