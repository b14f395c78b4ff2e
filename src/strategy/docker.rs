// ABOUTME: Docker Compose deployment.
// ABOUTME: Builds and starts the stack, migrates inside the web container, and tears down on failure.

use super::DeployContext;
use super::local::DEMO_DATA_SCRIPT;
use crate::deploy::DeployError;
use crate::diagnostics::Warning;

const COMPOSE: &str = "docker-compose";
const WEB_SERVICE: &str = "web";

pub(super) async fn deploy(ctx: &mut DeployContext<'_>) -> Result<(), DeployError> {
    tracing::info!("Starting Docker deployment...");

    match run_steps(ctx).await {
        Ok(()) => {
            tracing::info!("Docker deployment completed successfully!");
            tracing::info!("Application is running at http://localhost:8000");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Docker deployment failed: {}", e);
            tear_down(ctx).await;
            Err(e)
        }
    }
}

async fn run_steps(ctx: &mut DeployContext<'_>) -> Result<(), DeployError> {
    ctx.runner.run_checked(&[COMPOSE, "build"]).await?;
    ctx.runner.run_checked(&[COMPOSE, "up", "-d"]).await?;

    tracing::info!("Waiting for services to be ready...");
    tokio::time::sleep(ctx.docker_grace).await;

    ctx.runner
        .run_checked(&[
            COMPOSE,
            "exec",
            "-T",
            WEB_SERVICE,
            "python",
            "manage.py",
            "migrate",
        ])
        .await
        .map_err(|e| e.wrap("Database migration failed"))?;

    let fixtures = ctx
        .runner
        .run_unchecked(&[
            COMPOSE,
            "exec",
            "-T",
            WEB_SERVICE,
            "python",
            DEMO_DATA_SCRIPT,
        ])
        .await?;
    if !fixtures.success() {
        ctx.diagnostics.warn(Warning::fixtures_failed(format!(
            "Demo data setup exited with code {}. Continuing without demo data",
            fixtures.exit_code
        )));
    }

    Ok(())
}

/// Best-effort `down` so a failed deploy does not leave a half-started stack.
async fn tear_down(ctx: &mut DeployContext<'_>) {
    match ctx.runner.run_unchecked(&[COMPOSE, "down"]).await {
        Ok(result) if result.success() => tracing::info!("Compose stack stopped"),
        Ok(result) => ctx.diagnostics.warn(Warning::compose(format!(
            "{COMPOSE} down exited with code {}",
            result.exit_code
        ))),
        Err(e) => ctx.diagnostics.warn(Warning::compose(format!(
            "Failed to stop compose stack: {e}"
        ))),
    }
}
