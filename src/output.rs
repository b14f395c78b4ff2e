// ABOUTME: Final result reporting for a deployment run.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::{DeployReport, PipelineFailure};
use crate::diagnostics::Warning;
use crate::health::ProbeOutcome;

/// Output mode for the result summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Summary with warnings, after the log stream
    Normal,
    /// Only the final line (CI)
    Quiet,
    /// One JSON object for scripting
    Json,
}

/// Prints the outcome of a run. Progress itself goes through tracing.
pub struct Output {
    mode: OutputMode,
    started: Instant,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: Instant::now(),
        }
    }

    /// Restart the run clock.
    pub fn start_timer(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Report a run that reached DONE.
    pub fn deployed(&self, report: &DeployReport) {
        let backup = report
            .backup
            .as_ref()
            .map(|b| b.path.display().to_string());

        match self.mode {
            OutputMode::Normal => {
                self.print_warnings(&report.warnings);
                println!(
                    "Deployed to {} ({:.1}s)",
                    report.environment,
                    self.elapsed_secs()
                );
                if let Some(path) = &backup {
                    println!("Backup: {path}");
                }
                match report.probe {
                    ProbeOutcome::Healthy { attempt } => {
                        println!("Health: ok (attempt {attempt})")
                    }
                    ProbeOutcome::Unhealthy { .. } => println!("Health: failing"),
                    ProbeOutcome::NotApplicable => {}
                }
            }
            OutputMode::Quiet => println!("Deployed to {}", report.environment),
            OutputMode::Json => {
                let summary = Summary {
                    event: "success",
                    environment: Some(report.environment.as_str()),
                    message: format!("Deployed to {}", report.environment),
                    stage: None,
                    backup,
                    healthy: match report.probe {
                        ProbeOutcome::NotApplicable => None,
                        ProbeOutcome::Healthy { .. } => Some(true),
                        ProbeOutcome::Unhealthy { .. } => Some(false),
                    },
                    warnings: messages(&report.warnings),
                    duration_secs: self.elapsed_secs(),
                };
                if let Ok(json) = serde_json::to_string(&summary) {
                    println!("{json}");
                }
            }
        }
    }

    /// Report a run that reached FAILED, with the backup to recover from.
    pub fn failed(&self, failure: &PipelineFailure) {
        let backup = failure.backup_path().map(|p| p.display().to_string());

        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                if self.mode == OutputMode::Normal {
                    self.print_warnings(&failure.warnings);
                }
                eprintln!("Error: {failure}");
                if let Some(path) = &backup {
                    eprintln!("Backup available at: {path}");
                }
            }
            OutputMode::Json => self.json_error(
                failure.error.to_string(),
                Some(failure.stage.to_string()),
                backup,
                messages(&failure.warnings),
            ),
        }
    }

    /// Report an error outside the pipeline (setup problems, Ctrl-C).
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.json_error(message.to_string(), None, None, Vec::new()),
        }
    }

    fn print_warnings(&self, warnings: &[Warning]) {
        for warning in warnings {
            eprintln!("Warning: {}", warning.message);
        }
    }

    fn json_error(
        &self,
        message: String,
        stage: Option<String>,
        backup: Option<String>,
        warnings: Vec<&str>,
    ) {
        let summary = Summary {
            event: "error",
            environment: None,
            message,
            stage,
            backup,
            healthy: None,
            warnings,
            duration_secs: self.elapsed_secs(),
        };
        if let Ok(json) = serde_json::to_string(&summary) {
            eprintln!("{json}");
        }
    }
}

fn messages(warnings: &[Warning]) -> Vec<&str> {
    warnings.iter().map(|w| w.message.as_str()).collect()
}

#[derive(Serialize)]
struct Summary<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a str>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    healthy: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<&'a str>,
    duration_secs: f64,
}
