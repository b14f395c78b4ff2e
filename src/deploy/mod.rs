// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Drives INIT → PREREQS → BACKUP → DEPLOY → HEALTHCHECK → CLEANUP → DONE.

mod error;
mod options;
mod pipeline;
mod state;
mod transitions;

pub use error::{DeployError, DeployErrorKind};
pub use options::DeployOptions;
pub use pipeline::{DeployReport, Pipeline, PipelineFailure};
pub use state::{
    BackedUp, Completed, Deployed, HealthChecked, Initialized, PrereqsChecked, Stage,
};
pub use transitions::TransitionResult;

use std::sync::Arc;

use crate::runner::ProcessRunner;
use crate::types::Environment;

/// Run the full pipeline for `environment`.
///
/// Any fatal error stops the run, is logged together with the backup
/// location, and is returned. Nothing is retried at this level.
pub async fn run_deployment(
    environment: Environment,
    options: DeployOptions,
    process: Arc<dyn ProcessRunner>,
) -> Result<DeployReport, PipelineFailure> {
    tracing::info!("Starting deployment to {} environment", environment);

    let result = run_stages(Pipeline::new(environment, options, process)).await;

    match &result {
        Ok(report) => tracing::info!(
            "Deployment to {} finished with {} warning(s)",
            report.environment,
            report.warnings.len()
        ),
        Err(failure) => failure.log(),
    }
    result
}

/// Like [`run_deployment`], resolving the environment by name first. An
/// unknown name fails at INIT before any command runs.
pub async fn run_named(
    name: &str,
    options: DeployOptions,
    process: Arc<dyn ProcessRunner>,
) -> Result<DeployReport, PipelineFailure> {
    match name.parse::<Environment>() {
        Ok(environment) => run_deployment(environment, options, process).await,
        Err(e) => {
            let failure = PipelineFailure::at_init(e);
            failure.log();
            Err(failure)
        }
    }
}

async fn run_stages(pipeline: Pipeline<Initialized>) -> Result<DeployReport, PipelineFailure> {
    let environment = pipeline.environment();

    let pipeline = pipeline.check_prerequisites().await?;
    let pipeline = pipeline.backup()?;
    let pipeline = pipeline.deploy().await?;
    let pipeline = pipeline.health_check().await;

    tracing::info!("Deployment to {} completed successfully!", environment);

    Ok(pipeline.cleanup().finish())
}
