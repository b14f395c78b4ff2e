// ABOUTME: Generic pipeline struct parameterized by state marker.
// ABOUTME: Carries config, runner, backup, and diagnostics through every stage.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backup::{BackupManager, BackupRecord};
use crate::config::{DeploymentConfig, EnvironmentConfig};
use crate::diagnostics::{Diagnostics, Warning};
use crate::health::ProbeOutcome;
use crate::runner::{ProcessRunner, Runner};
use crate::types::Environment;

use super::error::DeployError;
use super::options::DeployOptions;
use super::state::{Initialized, Stage};

/// A deployment run in progress, parameterized by its current stage.
///
/// Each transition consumes the pipeline, so stages cannot be skipped or
/// repeated.
#[derive(Debug)]
pub struct Pipeline<S> {
    pub(crate) environment: Environment,
    pub(crate) options: DeployOptions,
    pub(crate) config: DeploymentConfig,
    pub(crate) runner: Runner,
    pub(crate) backups: BackupManager,
    pub(crate) backup: Option<BackupRecord>,
    pub(crate) probe: Option<ProbeOutcome>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) _state: S,
}

impl Pipeline<Initialized> {
    /// Load the deployment config and prepare the backup root.
    ///
    /// Never fails: config problems fall back to defaults with a warning.
    pub fn new(
        environment: Environment,
        options: DeployOptions,
        process: Arc<dyn ProcessRunner>,
    ) -> Self {
        tracing::info!("Initializing deployment for environment: {}", environment);

        let mut diagnostics = Diagnostics::default();
        let config = DeploymentConfig::load(&options.config_path, &mut diagnostics);

        if let Err(e) = std::fs::create_dir_all(&options.backup_root) {
            tracing::warn!(
                "Could not create backup directory {}: {}",
                options.backup_root.display(),
                e
            );
        }

        let runner =
            Runner::new(process, options.project_root.clone()).with_timeout(options.command_timeout);
        let backups = BackupManager::new(&options.project_root, &options.backup_root);

        Pipeline {
            environment,
            options,
            config,
            runner,
            backups,
            backup: None,
            probe: None,
            diagnostics,
            _state: Initialized,
        }
    }
}

impl<S> Pipeline<S> {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Settings for the target environment.
    pub fn environment_config(&self) -> &EnvironmentConfig {
        self.config.for_environment(self.environment)
    }

    /// The backup taken for this run, if any.
    pub fn backup_record(&self) -> Option<&BackupRecord> {
        self.backup.as_ref()
    }

    pub fn warnings(&self) -> &[Warning] {
        self.diagnostics.warnings()
    }

    /// Move to the next stage.
    pub(crate) fn transition<T>(self, state: T) -> Pipeline<T> {
        Pipeline {
            environment: self.environment,
            options: self.options,
            config: self.config,
            runner: self.runner,
            backups: self.backups,
            backup: self.backup,
            probe: self.probe,
            diagnostics: self.diagnostics,
            _state: state,
        }
    }

    /// Abandon the run at `stage`.
    pub(crate) fn fail(self, stage: Stage, error: DeployError) -> PipelineFailure {
        PipelineFailure {
            stage,
            error,
            backup: self.backup.map(|b| b.path),
            warnings: self.diagnostics.into_warnings(),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug)]
pub struct DeployReport {
    pub environment: Environment,
    pub backup: Option<BackupRecord>,
    pub probe: ProbeOutcome,
    pub warnings: Vec<Warning>,
}

/// A run that reached the FAILED state.
#[derive(Debug)]
pub struct PipelineFailure {
    /// Stage that failed.
    pub stage: Stage,
    pub error: DeployError,
    /// Last successful backup, for manual recovery.
    pub backup: Option<PathBuf>,
    pub warnings: Vec<Warning>,
}

impl PipelineFailure {
    /// Failure before the pipeline existed (for example an unknown environment).
    pub fn at_init(error: DeployError) -> Self {
        Self {
            stage: Stage::Init,
            error,
            backup: None,
            warnings: Vec::new(),
        }
    }

    pub fn backup_path(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Log the failure and where the last backup lives.
    pub fn log(&self) {
        tracing::error!("Deployment failed: {}", self.error);
        match &self.backup {
            Some(path) => tracing::info!("Backup available at: {}", path.display()),
            None => tracing::info!("No backup was taken for this run"),
        }
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
