// ABOUTME: Diagnostics accumulator for advisory failures during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deployment operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if a warning of the given kind was collected.
    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn tests_failed(message: impl Into<String>) -> Self {
        Self::new(WarningKind::TestsFailed, message)
    }

    pub fn fixtures_failed(message: impl Into<String>) -> Self {
        Self::new(WarningKind::FixturesFailed, message)
    }

    pub fn health_check(message: impl Into<String>) -> Self {
        Self::new(WarningKind::HealthCheck, message)
    }

    pub fn backup_rotation(message: impl Into<String>) -> Self {
        Self::new(WarningKind::BackupRotation, message)
    }

    pub fn config_write(message: impl Into<String>) -> Self {
        Self::new(WarningKind::ConfigWrite, message)
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::new(WarningKind::ConfigParse, message)
    }

    pub fn python_version(message: impl Into<String>) -> Self {
        Self::new(WarningKind::PythonVersion, message)
    }

    pub fn compose(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Compose, message)
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The test suite failed or could not run.
    TestsFailed,
    /// Demo data could not be loaded.
    FixturesFailed,
    /// The post-deploy health probe never saw a healthy response.
    HealthCheck,
    /// Old backups could not be pruned.
    BackupRotation,
    /// The default config file could not be written.
    ConfigWrite,
    /// The config file was unreadable and defaults were used.
    ConfigParse,
    /// The interpreter version differs from the configured one.
    PythonVersion,
    /// Tearing down the compose stack after a failure did not succeed.
    Compose,
}
