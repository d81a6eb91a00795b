use crate::error::{HarnessError, Result};
use crate::traits::CommandExecutor;
use std::collections::BTreeMap;
use std::fmt;
use tokio::process::Command;
use tracing::debug;

/// A fully resolved test command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment
    pub env: BTreeMap<String, String>,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands as child processes
///
/// A non-zero exit is not an error here: test tools exit 1 when tests fail
/// and still print their summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "Spawning test command");
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .envs(&spec.env)
            .output()
            .await
            .map_err(|e| HarnessError::command_failed(spec.to_string(), e.to_string()))?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
