// ABOUTME: Pipeline state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the stage order at compile time.

use std::fmt;

use crate::types::Environment;

/// Config loaded, nothing run yet.
/// Available actions: `check_prerequisites()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Required tools are present.
/// Available actions: `backup()`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrereqsChecked;

/// Backup taken (or skipped on request).
/// Available actions: `deploy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BackedUp;

/// Environment strategy completed.
/// Available actions: `health_check()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Deployed;

/// Health probe finished, whatever its outcome.
/// Available actions: `cleanup()`
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthChecked;

/// Old backups rotated out.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;

/// Runtime view of the pipeline position, for logs and failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Prereqs,
    Backup,
    Deploy(Environment),
    HealthCheck,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Init => f.write_str("init"),
            Stage::Prereqs => f.write_str("prerequisites"),
            Stage::Backup => f.write_str("backup"),
            Stage::Deploy(env) => write!(f, "deploy ({env})"),
            Stage::HealthCheck => f.write_str("health check"),
            Stage::Cleanup => f.write_str("cleanup"),
            Stage::Done => f.write_str("done"),
            Stage::Failed => f.write_str("failed"),
        }
    }
}
