use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::engine::command_builder::CommandBuilder;
use crate::engine::result_sink::ResultSink;
use crate::tools::{BuildContext, CommandExecutor};
use crate::utils::{
    config::WordlistConfig,
    error::{ExecutionError, RatResult},
    types::{ExecutionOutcome, ExecutionStatus, Target},
};

/// Runs one tool against one target and persists whatever it produced
pub struct ToolRunner {
    builder: CommandBuilder,
    executor: Arc<dyn CommandExecutor>,
    sink: ResultSink,
    timeout: Option<Duration>,
}

impl ToolRunner {
    /// Create a runner over every known tool with no time limit
    pub fn new(executor: Arc<dyn CommandExecutor>, sink: ResultSink) -> Self {
        Self {
            builder: CommandBuilder::new(),
            executor,
            sink,
            timeout: None,
        }
    }

    pub fn with_builder(mut self, builder: CommandBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Kill tools that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Build, execute and persist a single invocation.
    ///
    /// Only an unregistered `tool_id` is an error; every failure after the
    /// command is built is reported through the outcome's status.
    pub async fn run_one(&self, tool_id: &str, target: &Target, wordlists: &WordlistConfig) -> RatResult<ExecutionOutcome> {
        let tool = self.builder.resolve(tool_id)?;
        let tool_id = tool.id();
        let phase = tool.phase();
        let ctx = BuildContext::new(wordlists, self.sink.output_root());
        let command = tool.build_command(target, &ctx);

        info!("Running {} on {}: {}", tool_id, target, command.join(" "));

        // Some tools write side files (graphs, html reports) into their own directory.
        if let Err(e) = self.sink.ensure_tool_dir(phase, tool_id) {
            warn!("Could not prepare output directory for {}: {}", tool_id, e);
        }

        let started = Instant::now();
        let result = self.executor.execute(&command, self.timeout).await;
        let elapsed = started.elapsed();

        let mut outcome = match result {
            Ok(captured) => ExecutionOutcome::from_captured(tool_id, target, command, captured),
            Err(ExecutionError::CommandNotFound(program)) => {
                error!("Error executing {} on {}: Command not found ({})", tool_id, target, program);
                ExecutionOutcome::without_output(tool_id, target, command, ExecutionStatus::CommandNotFound)
            }
            Err(ExecutionError::Timeout { seconds, .. }) => {
                error!("Error executing {} on {}: timed out after {}s", tool_id, target, seconds);
                ExecutionOutcome::without_output(tool_id, target, command, ExecutionStatus::TimedOut(seconds))
            }
            Err(e) => {
                error!("Error executing {} on {}: {}", tool_id, target, e);
                ExecutionOutcome::without_output(
                    tool_id,
                    target,
                    command,
                    ExecutionStatus::ExecutionError(e.to_string()),
                )
            }
        };
        outcome.elapsed = elapsed;

        match &outcome.status {
            ExecutionStatus::Success => info!("{} on {} completed in {:.2?}", tool_id, target, elapsed),
            ExecutionStatus::NonZeroExit(_) => warn!(
                "{} on {} {}: {}",
                tool_id,
                target,
                outcome.status,
                outcome.stderr.trim()
            ),
            _ => {}
        }

        if outcome.has_output() {
            match self.sink.write(phase, tool_id, target, &outcome.artifact_payload()) {
                Ok(path) => outcome.artifact = Some(path),
                Err(e) => {
                    error!("Error saving results for {} on {}: {}", tool_id, target, e);
                    outcome.persist_error = Some(e.to_string());
                }
            }
        }

        Ok(outcome)
    }
}
