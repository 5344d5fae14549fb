use chrono::{DateTime, Local};
use clap::Parser;
use colored::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cli::{CliArgs, Commands, GlobalArgs, Menu, OutputFormatter, WordlistArgs};
use crate::engine::{BatchDriver, CancellationFlag, ProgressReporter, ResultSink, ToolRunner, ToolSelection};
use crate::tools::{BuildContext, CommandExecutor, DependencyChecker, Phase, ProcessExecutor, ToolSpec};
use crate::utils::{
    config::{RatConfig, WordlistConfig, WordlistSlot},
    error::{RatError, RatResult, TargetError},
    logging::{init_logging, read_log},
    targets::{import_targets, load_targets, TargetList},
    types::{ExecutionOutcome, Target},
};

/// Prints live progress lines while a batch runs
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn tool_started(&mut self, tool_id: &str, target_count: usize) {
        println!("{}", format!("\n[*] Starting {} on {} target(s)...", tool_id, target_count).blue().bold());
    }

    fn invocation_started(&mut self, tool_id: &str, target: &Target) {
        println!("{}", OutputFormatter::format_running(tool_id, target));
    }

    fn invocation_finished(&mut self, outcome: &ExecutionOutcome) {
        println!("{}", OutputFormatter::format_outcome(outcome));
        if self.verbose {
            println!("{}", OutputFormatter::format_info(&format!("Finished in {:.2?}", outcome.elapsed)));
        }
    }

    fn invocation_rejected(&mut self, _tool_id: &str, error: &RatError) {
        println!("{}", OutputFormatter::format_error(error));
    }

    fn cancelled(&mut self, remaining: usize) {
        println!(
            "{}",
            OutputFormatter::format_warning(&format!("Operation cancelled by user, {} invocation(s) skipped.", remaining))
        );
    }
}

/// Snapshot shown on the main menu and by `rat status`
#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub targets: Option<usize>,
    pub artifacts: usize,
    pub last_run: Option<DateTime<Local>>,
}

impl StatusSummary {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(count) = self.targets.filter(|count| *count > 0) {
            lines.push(format!("[✓] {} target(s) loaded", count));
        }
        if self.artifacts > 0 {
            lines.push(format!("[✓] {} result file(s) generated", self.artifacts));
        }
        if let Some(last_run) = self.last_run {
            lines.push(format!("[✓] Last run: {}", last_run.format("%Y-%m-%d %H:%M:%S")));
        }
        lines
    }
}

/// Main CLI runner that handles command execution
pub struct CliRunner {
    config: RatConfig,
    runner: ToolRunner,
    executor: Arc<dyn CommandExecutor>,
    wordlists: WordlistConfig,
    cancel: CancellationFlag,
    batch_active: Arc<AtomicBool>,
    verbose: bool,
}

impl CliRunner {
    /// Create a CLI runner that spawns real processes
    pub fn new(config: RatConfig) -> Self {
        Self::with_executor(config, Arc::new(ProcessExecutor::new()))
    }

    /// Create a CLI runner over a custom executor
    pub fn with_executor(config: RatConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        let runner = ToolRunner::new(executor.clone(), ResultSink::new(&config.output_root))
            .with_timeout(config.tool_timeout());

        Self {
            wordlists: config.wordlists.clone(),
            config,
            runner,
            executor,
            cancel: CancellationFlag::new(),
            batch_active: Arc::new(AtomicBool::new(false)),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &RatConfig {
        &self.config
    }

    pub fn wordlists(&self) -> &WordlistConfig {
        &self.wordlists
    }

    pub fn wordlists_mut(&mut self) -> &mut WordlistConfig {
        &mut self.wordlists
    }

    /// Apply `--*-wordlist` overrides, each validated against the filesystem
    pub fn apply_wordlist_args(&mut self, args: &WordlistArgs) -> RatResult<()> {
        let overrides = [
            (WordlistSlot::Dirb, &args.dirb_wordlist),
            (WordlistSlot::Gobuster, &args.gobuster_wordlist),
            (WordlistSlot::Hydra, &args.hydra_wordlist),
        ];
        for (slot, path) in overrides {
            if let Some(path) = path {
                self.wordlists.set(slot, path.clone())?;
                info!("Using {} wordlist {}", slot, path.display());
            }
        }
        Ok(())
    }

    /// Stop new invocations on Ctrl-C during a batch; exit when idle
    pub fn install_interrupt_handler(&self) {
        let cancel = self.cancel.clone();
        let batch_active = self.batch_active.clone();

        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if batch_active.load(Ordering::SeqCst) {
                    warn!("Interrupt received, stopping after the current tool");
                    eprintln!(
                        "{}",
                        OutputFormatter::format_warning("Interrupt received, stopping after the current tool...")
                    );
                    cancel.cancel();
                } else {
                    info!("Operation cancelled by user");
                    eprintln!("{}", "\n\nOperation cancelled by user. Exiting...".yellow());
                    std::process::exit(130);
                }
            }
        });
    }

    /// Load the given target list, or the configured default one
    pub fn load_targets(&self, path: Option<&Path>) -> RatResult<TargetList> {
        let path = path.unwrap_or(&self.config.targets_file);
        let list = load_targets(path)?;
        if list.is_empty() {
            return Err(TargetError::NoTargets(path.to_path_buf()).into());
        }
        Ok(list)
    }

    /// Run a phase selection against `targets`, printing progress as it goes
    pub async fn run_phase(
        &self,
        phase: Phase,
        selection: &ToolSelection,
        targets: &[Target],
    ) -> RatResult<Vec<ExecutionOutcome>> {
        self.cancel.reset();
        self.batch_active.store(true, Ordering::SeqCst);

        let driver = BatchDriver::new(&self.runner).with_cancellation(self.cancel.clone());
        let mut reporter = ConsoleReporter::new(self.verbose);
        let result = driver
            .run_phase(phase, selection, targets, &self.wordlists, &mut reporter)
            .await;

        self.batch_active.store(false, Ordering::SeqCst);
        result
    }

    /// Tool listing, optionally with the command each tool would run
    pub fn list_tools(&self, phase: Option<Phase>, target: Option<&str>) -> RatResult<String> {
        let tools: Vec<ToolSpec> = match phase {
            Some(phase) => phase.tools(),
            None => ToolSpec::ALL.to_vec(),
        };

        let target = target.map(Target::parse).transpose()?;
        let ctx = BuildContext::new(&self.wordlists, &self.config.output_root);
        let preview = target.as_ref().map(|t| (t, &ctx));

        let mut output = format!("{}\n", "Available Tools:".bold());
        output.push_str(&OutputFormatter::format_tool_list(&tools, preview));
        Ok(output)
    }

    /// Copy a validated target list over the default targets file
    pub fn import_targets(&self, source: &Path) -> RatResult<String> {
        let count = import_targets(source, &self.config.targets_file)?;
        Ok(OutputFormatter::format_success(&format!("Successfully imported {} targets.", count)))
    }

    /// Dependency report, installing missing packages when asked
    pub async fn check_dependencies(&self, install: bool) -> RatResult<String> {
        let checker = DependencyChecker::new(self.executor.clone(), self.config.probe_timeout());
        let report = checker.check().await;
        let mut output = OutputFormatter::format_dependency_report(&report);

        if install && !report.missing().is_empty() {
            output.push_str(&format!("\n{}\n", OutputFormatter::format_info("Updating package repository...")));
            for (name, result) in checker.install_missing(&report).await? {
                match result {
                    Ok(()) => output.push_str(&format!("{}\n", OutputFormatter::format_success(&format!("{} installed successfully.", name)))),
                    Err(reason) => {
                        error!("Failed to install {}: {}", name, reason);
                        output.push_str(&format!(
                            "{}\n",
                            OutputFormatter::format_error(&RatError::Dependency(format!("Failed to install {}: {}", name, reason)))
                        ));
                    }
                }
            }
        }

        Ok(output)
    }

    pub fn view_logs(&self) -> RatResult<String> {
        match read_log(&self.config.log_file)? {
            Some(content) => Ok(format!("{}\n{}", OutputFormatter::format_header("Log File Contents"), content)),
            None => Ok(OutputFormatter::format_warning("Log file not found.")),
        }
    }

    /// Delete one phase tree, or all of them
    pub fn clear_results(&self, phase: Option<Phase>) -> RatResult<String> {
        let sink = self.runner.sink();
        match phase {
            Some(phase) => {
                sink.clear_phase(phase)?;
                Ok(OutputFormatter::format_success(&format!("Results for {} have been cleared.", phase)))
            }
            None => {
                sink.clear_all()?;
                Ok(OutputFormatter::format_success("All results have been cleared."))
            }
        }
    }

    pub fn status(&self) -> StatusSummary {
        let targets = load_targets(&self.config.targets_file).ok().map(|list| list.len());
        let last_run = std::fs::metadata(&self.config.log_file)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Local>::from);

        StatusSummary {
            targets,
            artifacts: self.runner.sink().count_artifacts(),
            last_run,
        }
    }
}

/// Merge the configuration file (if any) with command-line overrides
pub fn resolve_config(global: &GlobalArgs) -> RatResult<RatConfig> {
    let mut config = match &global.config {
        Some(path) => RatConfig::load(path)?,
        None => RatConfig::default(),
    };

    if let Some(root) = &global.output_root {
        config.output_root = root.clone();
    }
    if let Some(log_file) = &global.log_file {
        config.log_file = log_file.clone();
    }
    if let Some(timeout) = global.timeout {
        config.tool_timeout_secs = Some(timeout);
    }

    Ok(config)
}

fn confirm(prompt: &str) -> bool {
    use std::io::{BufRead, Write};

    print!("{}", prompt.red());
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer).is_ok() && answer.trim().eq_ignore_ascii_case("y")
}

async fn execute_command(runner: &mut CliRunner, command: Commands) -> RatResult<()> {
    match command {
        Commands::Run { phase, tool, targets, wordlists, json } => {
            runner.apply_wordlist_args(&wordlists)?;
            let list = runner.load_targets(targets.as_deref())?;
            for (line, reason) in &list.rejected {
                println!("{}", OutputFormatter::format_warning(&format!("Skipping line {}: {}", line, reason)));
            }
            println!("{}", OutputFormatter::format_success(&format!("Successfully loaded {} target(s).", list.len())));

            let selection = match tool {
                Some(tool) => ToolSelection::Single(tool),
                None => ToolSelection::All,
            };

            println!("{}", OutputFormatter::format_header(phase.title()));
            let outcomes = runner.run_phase(phase, &selection, &list.targets).await?;
            println!("{}", OutputFormatter::format_summary(&outcomes));
            if json {
                println!("{}", OutputFormatter::format_outcomes_json(&outcomes));
            }
        }

        Commands::Tools { phase, target } => {
            println!("{}", runner.list_tools(phase, target.as_deref())?);
        }

        Commands::Import { file } => {
            println!("{}", runner.import_targets(&file)?);
        }

        Commands::Deps { install } => {
            println!("{}", OutputFormatter::format_header("Checking Dependencies"));
            println!("{}", runner.check_dependencies(install).await?);
        }

        Commands::Logs => {
            println!("{}", runner.view_logs()?);
        }

        Commands::Clear { phase, yes } => {
            let scope = phase.map_or("all results".to_string(), |p| format!("results for {}", p));
            if yes || confirm(&format!("\nAre you sure you want to clear {}? (y/n): ", scope)) {
                println!("{}", runner.clear_results(phase)?);
            }
        }

        Commands::Status => {
            let lines = runner.status().lines();
            if lines.is_empty() {
                println!("{}", OutputFormatter::format_info("No targets, results or previous runs found."));
            }
            for line in lines {
                println!("{}", line.green().bold());
            }
        }

        Commands::Menu => {
            let stdin = std::io::stdin();
            let mut menu = Menu::new(runner, stdin.lock(), std::io::stdout());
            menu.run().await?;
        }
    }

    Ok(())
}

/// Main entry point for CLI execution
pub async fn run_cli() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match resolve_config(&args.global) {
        Ok(config) => config,
        Err(e) => {
            let log_file = args
                .global
                .log_file
                .clone()
                .unwrap_or_else(|| RatConfig::default().log_file);
            if init_logging(&log_file, args.global.verbose).is_ok() {
                error!("Failed to load configuration: {}", e);
            }
            eprintln!("{}", OutputFormatter::format_error(&e));
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log_file, args.global.verbose) {
        eprintln!("{}", OutputFormatter::format_warning(&e.to_string()));
    }

    let mut runner = CliRunner::new(config).with_verbose(args.global.verbose);
    runner.install_interrupt_handler();

    let command = args.command.unwrap_or(Commands::Menu);
    if let Err(e) = execute_command(&mut runner, command).await {
        error!("Unhandled error: {}", e);
        eprintln!("{}", OutputFormatter::format_error(&e));
        eprintln!("{}", "Check the log file for more details.".red());
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MockExecutor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn runner_in(dir: &TempDir) -> CliRunner {
        let config = RatConfig {
            output_root: dir.path().to_path_buf(),
            targets_file: dir.path().join("targets.txt"),
            log_file: dir.path().join("rat_debug.log"),
            ..RatConfig::default()
        };
        CliRunner::with_executor(config, Arc::new(MockExecutor::new()))
    }

    #[test]
    fn test_resolve_config_overrides() {
        let global = GlobalArgs {
            output_root: Some(PathBuf::from("/tmp/results")),
            timeout: Some(90),
            ..GlobalArgs::default()
        };

        let config = resolve_config(&global).unwrap();

        assert_eq!(config.output_root, PathBuf::from("/tmp/results"));
        assert_eq!(config.tool_timeout_secs, Some(90));
        assert_eq!(config.targets_file, PathBuf::from("targets.txt"));
    }

    #[test]
    fn test_load_targets_requires_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("targets.txt"), "\n\n").unwrap();
        let runner = runner_in(&dir);

        let result = runner.load_targets(None);
        assert!(matches!(result, Err(RatError::Target(TargetError::NoTargets(_)))));
    }

    #[test]
    fn test_wordlist_override_must_exist() {
        let dir = TempDir::new().unwrap();
        let mut runner = runner_in(&dir);
        let args = WordlistArgs {
            hydra_wordlist: Some(dir.path().join("missing.txt")),
            ..WordlistArgs::default()
        };

        assert!(runner.apply_wordlist_args(&args).is_err());
    }

    #[test]
    fn test_status_summary() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("targets.txt"), "a.com\nb.com\n").unwrap();
        std::fs::write(dir.path().join("rat_debug.log"), "entry\n").unwrap();
        let runner = runner_in(&dir);

        let status = runner.status();

        assert_eq!(status.targets, Some(2));
        assert_eq!(status.artifacts, 0);
        assert!(status.last_run.is_some());
        assert_eq!(status.lines().len(), 2);
    }

    #[test]
    fn test_list_tools_rejects_unsafe_preview_target() {
        let dir = TempDir::new().unwrap();
        let runner = runner_in(&dir);

        assert!(runner.list_tools(None, Some("../x")).is_err());
        assert!(runner.list_tools(Some(Phase::Scanning), Some("a.com")).is_ok());
    }
}
