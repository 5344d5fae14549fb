use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the toolkit
#[derive(Debug, Error)]
pub enum RatError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Result sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Tool and phase lookup errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Tool '{tool}' does not belong to phase '{phase}'")]
    ToolNotInPhase { tool: String, phase: String },
}

/// Child process execution errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("I/O error while running '{program}': {reason}")]
    Io { program: String, reason: String },

    #[error("'{program}' timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    #[error("Empty command line")]
    EmptyCommand,
}

/// Artifact persistence errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Target '{0}' cannot be used as an artifact file name")]
    UnsafeTarget(String),

    #[error("Failed to write {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// Target list errors
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Target is empty")]
    Empty,

    #[error("Target '{0}' contains path separators or control characters")]
    Unsafe(String),

    #[error("Target '{0}' starts with '-' and would be read as a tool option")]
    LooksLikeOption(String),

    #[error("Target file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("No targets found in {0}")]
    NoTargets(PathBuf),
}

/// Result type alias for toolkit operations
pub type RatResult<T> = Result<T, RatError>;
