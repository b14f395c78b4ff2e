// ABOUTME: GitHub Actions deployment by pushing the working tree.
// ABOUTME: Requires the CI workflow, then commits and pushes only when there are changes.

use super::DeployContext;
use crate::deploy::DeployError;

pub const WORKFLOW_FILE: &str = ".github/workflows/ci.yml";
pub const COMMIT_MESSAGE: &str = "Deploy Anthony Store updates";

pub(super) async fn deploy(ctx: &mut DeployContext<'_>) -> Result<(), DeployError> {
    tracing::info!("Setting up GitHub Actions deployment...");

    let result = run_steps(ctx).await;
    if let Err(e) = &result {
        tracing::error!("GitHub deployment setup failed: {}", e);
    }
    result
}

async fn run_steps(ctx: &DeployContext<'_>) -> Result<(), DeployError> {
    ctx.runner.run_checked(&["git", "status"]).await?;

    if !ctx.runner.project_root().join(WORKFLOW_FILE).is_file() {
        tracing::error!("GitHub Actions workflow file not found");
        return Err(DeployError::missing_workflow(
            "GitHub Actions workflow file missing",
        ));
    }

    ctx.runner.run_checked(&["git", "add", "."]).await?;

    let status = ctx
        .runner
        .run_unchecked(&["git", "status", "--porcelain"])
        .await?;

    if status.stdout.trim().is_empty() {
        tracing::info!("No changes to deploy");
        return Ok(());
    }

    ctx.runner
        .run_checked(&["git", "commit", "-m", COMMIT_MESSAGE])
        .await?;
    ctx.runner
        .run_checked(&["git", "push", "origin", "main"])
        .await?;

    tracing::info!("Changes pushed to GitHub successfully!");
    tracing::info!("GitHub Actions will handle the deployment");
    Ok(())
}
