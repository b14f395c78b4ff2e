// ABOUTME: The single process-spawning primitive used by every deployment step.
// ABOUTME: Wraps an injectable ProcessRunner with logging, timeouts, and exit-code checks.

mod error;
mod system;

pub use error::ExecError;
pub use system::SystemRunner;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::deploy::DeployError;

/// Default upper bound for a single external command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A fully resolved command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    /// The argv joined with spaces, for logs and error messages.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Captured outcome of an external process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Capability to execute an external command.
///
/// `SystemRunner` spawns real processes. Tests substitute a recording fake.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError>;
}

/// Per-call options for [`Runner::run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory. Defaults to the project root.
    pub cwd: Option<PathBuf>,
    /// Fail on nonzero exit when true.
    pub check: bool,
    /// Overrides the runner's default timeout.
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            check: true,
            timeout: None,
        }
    }
}

impl RunOptions {
    pub fn checked() -> Self {
        Self::default()
    }

    pub fn unchecked() -> Self {
        Self {
            check: false,
            ..Self::default()
        }
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Runs external commands relative to the project root.
#[derive(Clone)]
pub struct Runner {
    process: Arc<dyn ProcessRunner>,
    project_root: PathBuf,
    timeout: Duration,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("project_root", &self.project_root)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Runner {
    pub fn new(process: Arc<dyn ProcessRunner>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            process,
            project_root: project_root.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A runner that spawns real processes.
    pub fn system(project_root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(SystemRunner), project_root)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Run a command.
    ///
    /// Logs the argv and any stdout. A timeout or spawn failure is always an
    /// error. A nonzero exit is an error only when `options.check` is set;
    /// otherwise the result is returned for the caller to inspect.
    pub async fn run<S: AsRef<str>>(
        &self,
        argv: &[S],
        options: RunOptions,
    ) -> Result<CommandResult, DeployError> {
        let spec = CommandSpec {
            argv: argv.iter().map(|arg| arg.as_ref().to_string()).collect(),
            cwd: options.cwd.unwrap_or_else(|| self.project_root.clone()),
            timeout: options.timeout.unwrap_or(self.timeout),
        };
        let command = spec.display();

        tracing::info!("Running command: {}", command);

        let result = match self.process.execute(&spec).await {
            Ok(result) => result,
            Err(ExecError::Timeout(timeout)) => {
                tracing::error!("Command timed out after {} seconds", timeout.as_secs());
                return Err(DeployError::timeout(format!("Command timed out: {command}")));
            }
            Err(e) => {
                tracing::error!("Unexpected error running command: {}", e);
                return Err(
                    DeployError::spawn(format!("Failed to run {command}: {e}")).with_source(e)
                );
            }
        };

        if !result.stdout.is_empty() {
            tracing::info!("Command output: {}", result.stdout.trim_end());
        }

        if !result.success() {
            if options.check {
                tracing::error!("Command failed with exit code {}", result.exit_code);
                tracing::error!("Error output: {}", result.stderr.trim_end());
                return Err(DeployError::command_failed(format!(
                    "Command failed: {command}"
                )));
            }
            tracing::warn!("Command exited with code {}", result.exit_code);
        }

        Ok(result)
    }

    pub async fn run_checked<S: AsRef<str>>(
        &self,
        argv: &[S],
    ) -> Result<CommandResult, DeployError> {
        self.run(argv, RunOptions::checked()).await
    }

    pub async fn run_unchecked<S: AsRef<str>>(
        &self,
        argv: &[S],
    ) -> Result<CommandResult, DeployError> {
        self.run(argv, RunOptions::unchecked()).await
    }
}
