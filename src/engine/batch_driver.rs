use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::engine::tool_runner::ToolRunner;
use crate::tools::{Phase, ToolSpec};
use crate::utils::{
    config::WordlistConfig,
    error::{RatError, RatResult, RegistryError},
    types::{ExecutionOutcome, Target},
};

/// Shared stop request, checked between invocations
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous stop request before the next batch
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Observer for batch progress, used by the CLI to print live status lines
pub trait ProgressReporter: Send {
    fn tool_started(&mut self, _tool_id: &str, _target_count: usize) {}

    fn invocation_started(&mut self, _tool_id: &str, _target: &Target) {}

    fn invocation_finished(&mut self, _outcome: &ExecutionOutcome) {}

    fn invocation_rejected(&mut self, _tool_id: &str, _error: &RatError) {}

    fn cancelled(&mut self, _remaining: usize) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Which tools of a phase to run
#[derive(Debug, Clone, PartialEq)]
pub enum ToolSelection {
    All,
    Single(String),
}

/// Applies the runner across tools × targets, one invocation at a time
pub struct BatchDriver<'a> {
    runner: &'a ToolRunner,
    cancel: CancellationFlag,
}

impl<'a> BatchDriver<'a> {
    pub fn new(runner: &'a ToolRunner) -> Self {
        Self {
            runner,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every listed tool against every target, tool-major.
    ///
    /// Per-invocation failures never stop the batch. An unknown tool id is
    /// reported once and its targets are skipped.
    pub async fn run_batch<S: AsRef<str>>(
        &self,
        tool_ids: &[S],
        targets: &[Target],
        wordlists: &WordlistConfig,
        reporter: &mut dyn ProgressReporter,
    ) -> Vec<ExecutionOutcome> {
        let total = tool_ids.len() * targets.len();
        let mut processed = 0;
        let mut outcomes = Vec::with_capacity(total);

        'tools: for tool_id in tool_ids {
            let tool_id = tool_id.as_ref();
            reporter.tool_started(tool_id, targets.len());

            for (index, target) in targets.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    let remaining = total - processed;
                    warn!("Batch cancelled, {} invocation(s) not started", remaining);
                    reporter.cancelled(remaining);
                    break 'tools;
                }

                reporter.invocation_started(tool_id, target);
                match self.runner.run_one(tool_id, target, wordlists).await {
                    Ok(outcome) => {
                        reporter.invocation_finished(&outcome);
                        outcomes.push(outcome);
                        processed += 1;
                    }
                    Err(e) => {
                        error!("Skipping {}: {}", tool_id, e);
                        reporter.invocation_rejected(tool_id, &e);
                        processed += targets.len() - index;
                        continue 'tools;
                    }
                }
            }
        }

        outcomes
    }

    /// Run one phase: the whole tool set tool-major, or one tool across all targets
    pub async fn run_phase(
        &self,
        phase: Phase,
        selection: &ToolSelection,
        targets: &[Target],
        wordlists: &WordlistConfig,
        reporter: &mut dyn ProgressReporter,
    ) -> RatResult<Vec<ExecutionOutcome>> {
        let tool_ids: Vec<&str> = match selection {
            ToolSelection::All => phase.tools().iter().map(ToolSpec::id).collect(),
            ToolSelection::Single(tool_id) => {
                let tool = ToolSpec::from_id(tool_id)
                    .ok_or_else(|| RegistryError::UnknownTool(tool_id.clone()))?;
                if tool.phase() != phase {
                    return Err(RegistryError::ToolNotInPhase {
                        tool: tool_id.clone(),
                        phase: phase.name().to_string(),
                    }
                    .into());
                }
                vec![tool.id()]
            }
        };

        if let Err(e) = self.runner.sink().prepare(phase) {
            warn!("Could not prepare {} output directories: {}", phase, e);
        }

        info!(
            "Starting {} with {} tool(s) across {} target(s)",
            phase.title(),
            tool_ids.len(),
            targets.len()
        );
        let outcomes = self.run_batch(tool_ids.as_slice(), targets, wordlists, reporter).await;
        info!(
            "{} finished: {} of {} invocation(s) succeeded",
            phase.title(),
            outcomes.iter().filter(|o| o.success()).count(),
            outcomes.len()
        );

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();

        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());

        flag.reset();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn test_tool_selection_equality() {
        assert_eq!(ToolSelection::Single("whois".to_string()), ToolSelection::Single("whois".to_string()));
        assert_ne!(ToolSelection::All, ToolSelection::Single("whois".to_string()));
    }
}
