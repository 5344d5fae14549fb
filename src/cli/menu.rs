use colored::*;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{error, info, warn};

use crate::cli::{CliRunner, OutputFormatter};
use crate::engine::ToolSelection;
use crate::tools::Phase;
use crate::utils::{
    config::WordlistSlot,
    error::{RatError, RatResult, TargetError},
};

/// Line-oriented interactive menu over any input and output stream
pub struct Menu<'a, R, W> {
    runner: &'a mut CliRunner,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(runner: &'a mut CliRunner, input: R, output: W) -> Self {
        Self { runner, input, output }
    }

    /// Show the main menu until the user quits or input ends
    pub async fn run(&mut self) -> RatResult<()> {
        loop {
            self.print_main_menu()?;

            let choice = match self.prompt("\nSelect an option: ")? {
                Some(choice) => choice,
                None => break,
            };

            if let Some(phase) = phase_by_number(&choice) {
                self.phase_menu(phase).await?;
                continue;
            }

            match choice.to_lowercase().as_str() {
                "i" => self.import_targets()?,
                "d" => self.check_dependencies().await?,
                "l" => match self.runner.view_logs() {
                    Ok(text) => self.say(&text)?,
                    Err(e) => self.report_error("Error reading log file", &e)?,
                },
                "c" => self.clear_results()?,
                "q" => break,
                _ => self.say(&OutputFormatter::format_warning("Invalid option. Please try again."))?,
            }
        }

        self.say(&"Exiting...".yellow().to_string())
    }

    fn print_main_menu(&mut self) -> RatResult<()> {
        self.say(&format!("\n{}", OutputFormatter::format_header("Main Menu")))?;

        for line in self.runner.status().lines() {
            self.say(&line.green().bold().to_string())?;
        }

        for (index, phase) in Phase::ALL.iter().enumerate() {
            self.say(&format!(
                " {} {} {}",
                format!("[{}]", index + 1).cyan().bold(),
                phase.title(),
                format!("- {}", phase.description()).dimmed()
            ))?;
        }
        self.say(&format!(" {} Import Targets", "[I]".cyan().bold()))?;
        self.say(&format!(" {} Check Dependencies", "[D]".cyan().bold()))?;
        self.say(&format!(" {} View Logs", "[L]".cyan().bold()))?;
        self.say(&format!(" {} Clear Results", "[C]".cyan().bold()))?;
        self.say(&format!(" {} Quit", "[Q]".cyan().bold()))
    }

    async fn phase_menu(&mut self, phase: Phase) -> RatResult<()> {
        let tools = phase.tools();

        loop {
            self.say(&format!("\n{}", OutputFormatter::format_header(phase.title())))?;
            for (index, tool) in tools.iter().enumerate() {
                self.say(&format!(" {} {}", format!("[{}]", index + 1).cyan().bold(), tool.id()))?;
            }
            self.say(&format!(" {} Run All Tools", "[A]".cyan().bold()))?;
            if phase.uses_wordlists() {
                self.say(&format!(" {} Configure Wordlists", "[W]".cyan().bold()))?;
            }
            self.say(&format!(" {} Back", "[B]".cyan().bold()))?;

            let choice = match self.prompt("\nSelect a tool: ")? {
                Some(choice) => choice.to_lowercase(),
                None => return Ok(()),
            };

            let selection = match choice.as_str() {
                "b" => return Ok(()),
                "a" => ToolSelection::All,
                "w" if phase.uses_wordlists() => {
                    self.configure_wordlists()?;
                    continue;
                }
                other => match other.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| tools.get(i)) {
                    Some(tool) => ToolSelection::Single(tool.id().to_string()),
                    None => {
                        self.say(&OutputFormatter::format_warning("Invalid option. Please try again."))?;
                        continue;
                    }
                },
            };

            self.run_selection(phase, &selection).await?;
            self.prompt("\nPress Enter to continue...")?;
        }
    }

    async fn run_selection(&mut self, phase: Phase, selection: &ToolSelection) -> RatResult<()> {
        let list = match self.runner.load_targets(None) {
            Ok(list) => list,
            Err(e @ RatError::Target(TargetError::FileNotFound(_))) => {
                self.say(&OutputFormatter::format_warning(&e.to_string()))?;
                let path = match self.prompt("Enter path to target list file: ")? {
                    Some(path) if !path.is_empty() => path,
                    _ => return self.report_error("Error loading targets", &e),
                };
                info!("Default target list missing, using {}", path);
                match self.runner.load_targets(Some(Path::new(&path))) {
                    Ok(list) => list,
                    Err(e) => return self.report_error("Error loading targets", &e),
                }
            }
            Err(e) => return self.report_error("Error loading targets", &e),
        };
        self.say(&OutputFormatter::format_success(&format!(
            "Successfully loaded {} target(s).",
            list.len()
        )))?;

        match self.runner.run_phase(phase, selection, &list.targets).await {
            Ok(outcomes) => self.say(&OutputFormatter::format_summary(&outcomes)),
            Err(e) => self.report_error(&format!("Error running {}", phase), &e),
        }
    }

    fn configure_wordlists(&mut self) -> RatResult<()> {
        for slot in WordlistSlot::ALL {
            let current = self.runner.wordlists().get(slot).display().to_string();
            self.say(&OutputFormatter::format_info(&format!("Current {} wordlist: {}", slot, current)))?;

            loop {
                let path = match self.prompt("Enter new path (or press Enter to keep current): ")? {
                    Some(path) if !path.is_empty() => path,
                    _ => break,
                };

                match self.runner.wordlists_mut().set(slot, &path) {
                    Ok(()) => {
                        self.say(&OutputFormatter::format_success(&format!("{} wordlist set to {}", slot, path)))?;
                        break;
                    }
                    Err(e) => {
                        warn!("Rejected {} wordlist: {}", slot, e);
                        self.say(&OutputFormatter::format_warning(&format!("Wordlist not found: {}", path)))?;
                        let retry = self.prompt("Try again? (y/n): ")?;
                        if !matches!(retry.as_deref(), Some("y") | Some("Y")) {
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn import_targets(&mut self) -> RatResult<()> {
        let path = match self.prompt("Enter path to targets file: ")? {
            Some(path) if !path.is_empty() => path,
            _ => return Ok(()),
        };

        match self.runner.import_targets(Path::new(&path)) {
            Ok(text) => self.say(&text),
            Err(e) => self.report_error("Error importing targets", &e),
        }
    }

    async fn check_dependencies(&mut self) -> RatResult<()> {
        self.say(&OutputFormatter::format_header("Checking Dependencies"))?;
        match self.runner.check_dependencies(false).await {
            Ok(report) => self.say(&report)?,
            Err(e) => return self.report_error("Error checking dependencies", &e),
        }

        let install = self.prompt("Attempt to install missing tools? (y/n): ")?;
        if matches!(install.as_deref(), Some("y") | Some("Y")) {
            match self.runner.check_dependencies(true).await {
                Ok(result) => self.say(&result)?,
                Err(e) => self.report_error("Error installing dependencies", &e)?,
            }
        }
        Ok(())
    }

    fn clear_results(&mut self) -> RatResult<()> {
        let scope = match self.prompt("Clear which phase? [1-3] or [A]ll: ")? {
            Some(scope) => scope.to_lowercase(),
            None => return Ok(()),
        };
        let phase = match scope.as_str() {
            "a" => None,
            other => match phase_by_number(other).map_or_else(|| other.parse::<Phase>(), Ok) {
                Ok(phase) => Some(phase),
                Err(e) => return self.report_error("Error clearing results", &RatError::from(e)),
            },
        };

        let confirmed = self.prompt(&"Are you sure you want to clear these results? (y/n): ".red().to_string())?;
        if !matches!(confirmed.as_deref(), Some("y") | Some("Y")) {
            return self.say(&OutputFormatter::format_info("Nothing was deleted."));
        }

        match self.runner.clear_results(phase) {
            Ok(text) => self.say(&text),
            Err(e) => self.report_error("Error clearing results", &e),
        }
    }

    /// Show a failure and mirror it to the log file
    fn report_error(&mut self, context: &str, e: &RatError) -> RatResult<()> {
        error!("{}: {}", context, e);
        self.say(&OutputFormatter::format_error(e))
    }

    /// Print `message` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> RatResult<Option<String>> {
        write!(self.output, "{}", message).map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, text: &str) -> RatResult<()> {
        writeln!(self.output, "{}", text).map_err(io_error)
    }
}

/// Menu number (1-based) to phase
fn phase_by_number(choice: &str) -> Option<Phase> {
    let index = choice.parse::<usize>().ok()?.checked_sub(1)?;
    Phase::ALL.get(index).copied()
}

fn io_error(e: std::io::Error) -> RatError {
    RatError::Internal(format!("Terminal I/O failed: {}", e))
}
