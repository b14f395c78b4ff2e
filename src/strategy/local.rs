// ABOUTME: Local deployment into a Python virtual environment.
// ABOUTME: Sets up the venv, runs tests, migrations, static collection, and demo data.

use std::path::{Path, PathBuf};

use super::DeployContext;
use crate::deploy::DeployError;
use crate::diagnostics::Warning;

pub const VENV_DIR: &str = "venv";
pub const DEMO_DATA_SCRIPT: &str = "scripts/setup_demo_data.py";

const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Paths inside a virtual environment.
struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    fn new(project_root: &Path) -> Self {
        Self {
            root: project_root.join(VENV_DIR),
        }
    }

    fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    fn python(&self) -> String {
        self.bin_dir().join("python").to_string_lossy().into_owned()
    }

    fn pip(&self) -> String {
        self.bin_dir().join("pip").to_string_lossy().into_owned()
    }
}

pub(super) async fn deploy(ctx: &mut DeployContext<'_>) -> Result<(), DeployError> {
    tracing::info!("Starting local deployment...");

    let result = run_steps(ctx).await;
    match &result {
        Ok(()) => {
            tracing::info!("Local deployment completed successfully!");
            tracing::info!("You can now run: python manage.py runserver");
        }
        Err(e) => tracing::error!("Local deployment failed: {}", e),
    }
    result
}

async fn run_steps(ctx: &mut DeployContext<'_>) -> Result<(), DeployError> {
    let python = setup_virtual_environment(ctx).await?;
    run_tests(ctx, &python).await;
    run_migrations(ctx, &python).await?;
    collect_static_files(ctx, &python).await?;
    load_fixtures(ctx, &python).await;
    Ok(())
}

/// Create the venv if needed, upgrade pip, and install requirements.
/// Returns the venv's python.
async fn setup_virtual_environment(ctx: &DeployContext<'_>) -> Result<String, DeployError> {
    tracing::info!("Setting up virtual environment...");

    let project_root = ctx.runner.project_root().to_path_buf();
    let venv = VirtualEnv::new(&project_root);

    let setup = async {
        if !venv.root.exists() {
            ctx.runner
                .run_checked(&["python", "-m", "venv", VENV_DIR])
                .await?;
            tracing::info!("Virtual environment created");
        }

        let python = venv.python();
        ctx.runner
            .run_checked(&[python.as_str(), "-m", "pip", "install", "--upgrade", "pip"])
            .await?;

        if project_root.join(REQUIREMENTS_FILE).is_file() {
            let pip = venv.pip();
            ctx.runner
                .run_checked(&[pip.as_str(), "install", "-r", REQUIREMENTS_FILE])
                .await?;
            tracing::info!("Dependencies installed successfully");
        }

        Ok::<_, DeployError>(python)
    };

    setup.await.map_err(|e| {
        tracing::error!("Virtual environment setup failed: {}", e);
        e.wrap("Failed to setup virtual environment")
    })
}

/// Run the test suite with coverage. Failures never stop the deployment.
async fn run_tests(ctx: &mut DeployContext<'_>, python: &str) {
    if ctx.skip_tests {
        tracing::info!("Skipping tests");
        return;
    }

    tracing::info!("Running tests...");

    let argv = [
        python,
        "-m",
        "pytest",
        "--cov=apps",
        "--cov-report=term-missing",
        "--cov-report=html",
        "--cov-fail-under=80",
        "-v",
    ];

    match ctx.runner.run_unchecked(&argv).await {
        Ok(result) if result.success() => tracing::info!("All tests passed successfully"),
        Ok(result) => ctx.diagnostics.warn(Warning::tests_failed(format!(
            "Some tests failed (exit code {}), but continuing deployment. Please review test results",
            result.exit_code
        ))),
        Err(e) => ctx.diagnostics.warn(Warning::tests_failed(format!(
            "Test execution failed: {e}. Continuing deployment without test validation"
        ))),
    }
}

async fn run_migrations(ctx: &DeployContext<'_>, python: &str) -> Result<(), DeployError> {
    if !ctx.config.migrations {
        tracing::info!("Migrations disabled for this environment");
        return Ok(());
    }

    tracing::info!("Running database migrations...");

    let migrate = async {
        ctx.runner
            .run_checked(&[python, "manage.py", "makemigrations"])
            .await?;
        ctx.runner
            .run_checked(&[python, "manage.py", "migrate"])
            .await
    };

    migrate.await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        e.wrap("Database migration failed")
    })?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

async fn collect_static_files(ctx: &DeployContext<'_>, python: &str) -> Result<(), DeployError> {
    if !ctx.config.static_files {
        tracing::info!("Static file collection disabled for this environment");
        return Ok(());
    }

    tracing::info!("Collecting static files...");

    ctx.runner
        .run_checked(&[python, "manage.py", "collectstatic", "--noinput"])
        .await
        .map_err(|e| {
            tracing::error!("Static file collection failed: {}", e);
            e.wrap("Failed to collect static files")
        })?;

    tracing::info!("Static files collected successfully");
    Ok(())
}

/// Load demo data when the setup script exists. Failures never stop the
/// deployment.
async fn load_fixtures(ctx: &mut DeployContext<'_>, python: &str) {
    if !ctx.config.fixtures {
        tracing::info!("Fixture loading disabled for this environment");
        return;
    }

    let script = ctx.runner.project_root().join(DEMO_DATA_SCRIPT);
    if !script.is_file() {
        tracing::info!("Demo data script not found, skipping");
        return;
    }

    tracing::info!("Loading initial data...");

    let script = script.to_string_lossy().into_owned();
    match ctx.runner.run_checked(&[python, script.as_str()]).await {
        Ok(_) => tracing::info!("Demo data loaded successfully"),
        Err(e) => ctx.diagnostics.warn(Warning::fixtures_failed(format!(
            "Fixture loading failed: {e}. Continuing without demo data"
        ))),
    }
}
