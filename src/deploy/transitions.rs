// ABOUTME: Stage transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self and returns the next stage or a failure report.

use crate::prereqs;
use crate::strategy::{self, DeployContext};

use super::pipeline::{DeployReport, Pipeline, PipelineFailure};
use super::state::{
    BackedUp, Completed, Deployed, HealthChecked, Initialized, PrereqsChecked, Stage,
};
use crate::health::ProbeOutcome;

/// Result type for transitions that can move the pipeline to FAILED.
pub type TransitionResult<T> = Result<Pipeline<T>, PipelineFailure>;

// =============================================================================
// Initialized -> PrereqsChecked
// =============================================================================

impl Pipeline<Initialized> {
    /// Verify the tools the target environment needs.
    #[must_use = "pipeline state must be used"]
    pub async fn check_prerequisites(mut self) -> TransitionResult<PrereqsChecked> {
        let environment = self.environment;
        let result = prereqs::check_prerequisites(
            environment,
            self.config.for_environment(environment),
            &self.runner,
            &mut self.diagnostics,
        )
        .await;

        match result {
            Ok(()) => Ok(self.transition(PrereqsChecked)),
            Err(e) => Err(self.fail(Stage::Prereqs, e)),
        }
    }
}

// =============================================================================
// PrereqsChecked -> BackedUp
// =============================================================================

impl Pipeline<PrereqsChecked> {
    /// Take the pre-deploy backup unless backups are skipped.
    #[must_use = "pipeline state must be used"]
    pub fn backup(mut self) -> TransitionResult<BackedUp> {
        if self.options.skip_backup {
            tracing::info!("Skipping backup");
            return Ok(self.transition(BackedUp));
        }

        match self.backups.create_backup(self.environment) {
            Ok(record) => {
                self.backup = Some(record);
                Ok(self.transition(BackedUp))
            }
            Err(e) => Err(self.fail(Stage::Backup, e)),
        }
    }
}

// =============================================================================
// BackedUp -> Deployed
// =============================================================================

impl Pipeline<BackedUp> {
    /// Run the environment's strategy.
    #[must_use = "pipeline state must be used"]
    pub async fn deploy(mut self) -> TransitionResult<Deployed> {
        let environment = self.environment;
        let mut ctx = DeployContext::new(
            &self.runner,
            self.config.for_environment(environment),
            &mut self.diagnostics,
        )
        .skip_tests(self.options.skip_tests)
        .docker_grace(self.options.docker_grace);

        let result = strategy::deploy(environment, &mut ctx).await;

        match result {
            Ok(()) => Ok(self.transition(Deployed)),
            Err(e) => Err(self.fail(Stage::Deploy(environment), e)),
        }
    }
}

// =============================================================================
// Deployed -> HealthChecked
// =============================================================================

impl Pipeline<Deployed> {
    /// Probe the health endpoint. Never fails the run.
    #[must_use = "pipeline state must be used"]
    pub async fn health_check(mut self) -> Pipeline<HealthChecked> {
        let probe = self.options.health;
        let outcome = probe.probe(self.environment, &mut self.diagnostics).await;
        self.probe = Some(outcome);
        self.transition(HealthChecked)
    }
}

// =============================================================================
// HealthChecked -> Completed
// =============================================================================

impl Pipeline<HealthChecked> {
    /// Rotate out old backups. Never fails the run.
    #[must_use = "pipeline state must be used"]
    pub fn cleanup(mut self) -> Pipeline<Completed> {
        self.backups.cleanup_old_backups(&mut self.diagnostics);
        self.transition(Completed)
    }
}

// =============================================================================
// Completed -> DONE
// =============================================================================

impl Pipeline<Completed> {
    pub fn finish(self) -> DeployReport {
        DeployReport {
            environment: self.environment,
            backup: self.backup,
            probe: self.probe.unwrap_or(ProbeOutcome::NotApplicable),
            warnings: self.diagnostics.into_warnings(),
        }
    }
}
