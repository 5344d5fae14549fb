use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::utils::{error::ExecutionError, types::CapturedOutput};

/// Boundary between the orchestration core and the operating system
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` (program first) to completion and capture both streams as text
    async fn execute(&self, command: &[String], timeout: Option<Duration>) -> Result<CapturedOutput, ExecutionError>;
}

/// Executes commands as real child processes
#[derive(Debug, Default, Clone)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &[String], timeout: Option<Duration>) -> Result<CapturedOutput, ExecutionError> {
        let (program, args) = command.split_first().ok_or(ExecutionError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Spawning {} with {} argument(s)", program, args.len());

        let child = cmd.spawn().map_err(|e| spawn_error(program, e))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecutionError::Timeout {
                    program: program.clone(),
                    seconds: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        };

        let output = result.map_err(|e| ExecutionError::Io {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        Ok(CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Failures before the child exists
fn spawn_error(program: &str, e: std::io::Error) -> ExecutionError {
    match e.kind() {
        ErrorKind::NotFound => ExecutionError::CommandNotFound(program.to_string()),
        _ => ExecutionError::Spawn {
            program: program.to_string(),
            reason: e.to_string(),
        },
    }
}
