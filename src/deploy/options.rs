// ABOUTME: Invocation options for a deployment run.
// ABOUTME: Paths, skip flags, and timing with the production defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::backup::BACKUP_DIR;
use crate::config::CONFIG_FILENAME;
use crate::health::HealthProbe;
use crate::runner::DEFAULT_TIMEOUT;
use crate::strategy::DOCKER_GRACE_PERIOD;

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub backup_root: PathBuf,
    pub skip_tests: bool,
    pub skip_backup: bool,
    pub command_timeout: Duration,
    pub docker_grace: Duration,
    pub health: HealthProbe,
}

impl DeployOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            config_path: project_root.join(CONFIG_FILENAME),
            backup_root: project_root.join(BACKUP_DIR),
            project_root,
            skip_tests: false,
            skip_backup: false,
            command_timeout: DEFAULT_TIMEOUT,
            docker_grace: DOCKER_GRACE_PERIOD,
            health: HealthProbe::default(),
        }
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn skip_tests(mut self, skip: bool) -> Self {
        self.skip_tests = skip;
        self
    }

    pub fn skip_backup(mut self, skip: bool) -> Self {
        self.skip_backup = skip;
        self
    }

    pub fn docker_grace(mut self, grace: Duration) -> Self {
        self.docker_grace = grace;
        self
    }

    pub fn health(mut self, health: HealthProbe) -> Self {
        self.health = health;
        self
    }
}
