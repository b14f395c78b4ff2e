// ABOUTME: Per-environment deployment strategies.
// ABOUTME: Each strategy is a fixed, ordered sequence of external commands.

mod docker;
mod github;
mod kubernetes;
mod local;

pub use github::{COMMIT_MESSAGE, WORKFLOW_FILE};
pub use kubernetes::{IMAGE_TAG, RELEASE_NAME};
pub use local::{DEMO_DATA_SCRIPT, VENV_DIR};

use std::time::Duration;

use crate::config::EnvironmentConfig;
use crate::deploy::DeployError;
use crate::diagnostics::Diagnostics;
use crate::runner::Runner;
use crate::types::Environment;

/// How long the compose stack gets to come up before migrations run.
pub const DOCKER_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Everything a strategy needs to run its steps.
pub struct DeployContext<'a> {
    pub runner: &'a Runner,
    pub config: &'a EnvironmentConfig,
    pub skip_tests: bool,
    pub docker_grace: Duration,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> DeployContext<'a> {
    pub fn new(
        runner: &'a Runner,
        config: &'a EnvironmentConfig,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            runner,
            config,
            skip_tests: false,
            docker_grace: DOCKER_GRACE_PERIOD,
            diagnostics,
        }
    }

    pub fn skip_tests(mut self, skip: bool) -> Self {
        self.skip_tests = skip;
        self
    }

    pub fn docker_grace(mut self, grace: Duration) -> Self {
        self.docker_grace = grace;
        self
    }
}

/// Run the strategy for `environment`.
pub async fn deploy(
    environment: Environment,
    ctx: &mut DeployContext<'_>,
) -> Result<(), DeployError> {
    match environment {
        Environment::Local => local::deploy(ctx).await,
        Environment::Docker => docker::deploy(ctx).await,
        Environment::Kubernetes => kubernetes::deploy(ctx).await,
        Environment::Github => github::deploy(ctx).await,
    }
}

/// Resolve `name` and run its strategy. An unknown name fails before any
/// command runs.
pub async fn deploy_named(
    name: &str,
    ctx: &mut DeployContext<'_>,
) -> Result<Environment, DeployError> {
    let environment: Environment = name.parse()?;
    deploy(environment, ctx).await?;
    Ok(environment)
}
