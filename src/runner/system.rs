// ABOUTME: Process runner backed by real OS processes.
// ABOUTME: Spawns with tokio, captures output as text, and kills the child on timeout.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{CommandResult, CommandSpec, ExecError, ProcessRunner};

/// Runs commands as child processes of the deployer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandResult, ExecError> {
        let (program, args) = spec.argv.split_first().ok_or(ExecError::EmptyCommand)?;

        let child = Command::new(program)
            .args(args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(spec.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExecError::Timeout(spec.timeout))?
            .map_err(|source| ExecError::Output {
                program: program.clone(),
                source,
            })?;

        Ok(CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
