use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::error::TargetError;

/// A scan subject (domain or host), trimmed and safe to use as a file stem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target(String);

impl Target {
    /// Parse a raw line into a target
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }

        let escapes = trimmed == "." || trimmed == "..";
        let has_bad_chars = trimmed
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control());
        if escapes || has_bad_chars {
            return Err(TargetError::Unsafe(trimmed.to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(TargetError::LooksLikeOption(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw text captured from a finished child process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Create a captured output with the given exit code and streams
    pub fn new(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// How a single tool invocation ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExecutionStatus {
    Success,
    NonZeroExit(Option<i32>),
    CommandNotFound,
    ExecutionError(String),
    TimedOut(u64),
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "completed successfully"),
            ExecutionStatus::NonZeroExit(Some(code)) => write!(f, "failed with error code {}", code),
            ExecutionStatus::NonZeroExit(None) => write!(f, "terminated by signal"),
            ExecutionStatus::CommandNotFound => write!(f, "command not found"),
            ExecutionStatus::ExecutionError(reason) => write!(f, "execution error: {}", reason),
            ExecutionStatus::TimedOut(seconds) => write!(f, "timed out after {}s", seconds),
        }
    }
}

/// Result of one (tool, target) invocation
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub tool_id: String,
    pub target: String,
    pub command: Vec<String>,
    pub status: ExecutionStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Artifact written for this invocation, if any
    pub artifact: Option<PathBuf>,
    /// Set when output was captured but could not be persisted
    pub persist_error: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    /// Create an outcome for an invocation that produced no output
    pub fn without_output(tool_id: &str, target: &Target, command: Vec<String>, status: ExecutionStatus) -> Self {
        Self {
            tool_id: tool_id.to_string(),
            target: target.to_string(),
            command,
            status,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            artifact: None,
            persist_error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create an outcome from a process that ran to completion
    pub fn from_captured(tool_id: &str, target: &Target, command: Vec<String>, captured: CapturedOutput) -> Self {
        let status = if captured.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::NonZeroExit(captured.exit_code)
        };

        Self {
            tool_id: tool_id.to_string(),
            target: target.to_string(),
            command,
            status,
            exit_code: captured.exit_code,
            stdout: captured.stdout,
            stderr: captured.stderr,
            artifact: None,
            persist_error: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Whether the process ran and produced streams worth persisting
    pub fn has_output(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success | ExecutionStatus::NonZeroExit(_))
    }

    /// Text written to the artifact: raw stdout on success, labeled streams otherwise
    pub fn artifact_payload(&self) -> String {
        if self.success() {
            self.stdout.clone()
        } else {
            format!("STDOUT:\n{}\n\nSTDERR:\n{}", self.stdout, self.stderr)
        }
    }
}
