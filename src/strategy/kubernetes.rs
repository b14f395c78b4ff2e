// ABOUTME: Kubernetes deployment through Helm.
// ABOUTME: Ensures the namespace, builds the image, and upgrades the release in place.

use super::DeployContext;
use crate::deploy::DeployError;

pub const RELEASE_NAME: &str = "anthony-store";
pub const IMAGE_TAG: &str = "anthony-store:latest";

pub(super) async fn deploy(ctx: &mut DeployContext<'_>) -> Result<(), DeployError> {
    tracing::info!("Starting Kubernetes deployment...");

    let result = run_steps(ctx).await;
    if let Err(e) = &result {
        tracing::error!("Kubernetes deployment failed: {}", e);
    }
    result
}

async fn run_steps(ctx: &DeployContext<'_>) -> Result<(), DeployError> {
    let namespace = ctx.config.namespace();
    let chart = ctx.config.helm_chart();

    // Already-exists is the common failure here.
    let created = ctx
        .runner
        .run_unchecked(&["kubectl", "create", "namespace", namespace])
        .await?;
    if !created.success() {
        tracing::info!("Namespace {} not created, assuming it exists", namespace);
    }

    ctx.runner
        .run_checked(&["docker", "build", "-t", IMAGE_TAG, "."])
        .await
        .map_err(|e| e.wrap("Image build failed"))?;

    ctx.runner
        .run_checked(&[
            "helm",
            "upgrade",
            "--install",
            RELEASE_NAME,
            chart,
            "--namespace",
            namespace,
            "--set",
            "image.tag=latest",
            "--wait",
        ])
        .await
        .map_err(|e| e.wrap("Helm release failed"))?;

    let services = ctx
        .runner
        .run_checked(&["kubectl", "get", "services", "--namespace", namespace])
        .await?;

    tracing::info!("Kubernetes deployment completed successfully!");
    tracing::info!("Service information:");
    tracing::info!("{}", services.stdout.trim_end());
    Ok(())
}
