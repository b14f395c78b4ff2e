// ABOUTME: Error type for fatal deployment failures.
// ABOUTME: A single tagged error carries the failure kind, a message, and an optional cause.

use std::error::Error as StdError;

/// Category of a fatal deployment failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// A required tool is not installed or not invocable.
    MissingTool,
    /// An external command exceeded its timeout.
    Timeout,
    /// An external command exited nonzero where success was required.
    CommandFailed,
    /// An external command could not be started.
    Spawn,
    /// Creating the pre-deploy backup failed.
    Backup,
    /// The environment name is not a known deployment target.
    UnknownEnvironment,
    /// The CI workflow file required for GitHub deployment is missing.
    MissingWorkflow,
    /// The user cancelled the deployment.
    Interrupted,
}

/// A non-recoverable deployment failure.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DeployError {
    kind: DeployErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl DeployError {
    pub fn new(kind: DeployErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn missing_tool(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::MissingTool, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Timeout, message)
    }

    pub fn command_failed(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::CommandFailed, message)
    }

    pub fn spawn(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Spawn, message)
    }

    pub fn backup(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Backup, message)
    }

    pub fn unknown_environment(name: &str) -> Self {
        Self::new(
            DeployErrorKind::UnknownEnvironment,
            format!("Unknown environment: {name}"),
        )
    }

    pub fn missing_workflow(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::MissingWorkflow, message)
    }

    pub fn interrupted() -> Self {
        Self::new(DeployErrorKind::Interrupted, "Deployment cancelled by user")
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Prefix the message with the step that failed. Kind and cause are kept.
    pub fn wrap(mut self, step: &str) -> Self {
        self.message = format!("{step}: {}", self.message);
        self
    }

    pub fn kind(&self) -> DeployErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_message() {
        let err = DeployError::command_failed("Command failed: git push origin main");
        assert_eq!(err.to_string(), "Command failed: git push origin main");
        assert_eq!(err.kind(), DeployErrorKind::CommandFailed);
    }

    #[test]
    fn wrap_keeps_kind_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DeployError::timeout("Command timed out: helm upgrade")
            .with_source(io)
            .wrap("Helm release failed");

        assert_eq!(err.kind(), DeployErrorKind::Timeout);
        assert_eq!(
            err.message(),
            "Helm release failed: Command timed out: helm upgrade"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn unknown_environment_names_the_input() {
        let err = DeployError::unknown_environment("staging");
        assert_eq!(err.kind(), DeployErrorKind::UnknownEnvironment);
        assert!(err.to_string().contains("staging"));
    }
}
