use colored::*;
use serde_json::json;

use crate::tools::{BuildContext, DependencyReport, ToolSpec};
use crate::utils::{
    error::RatError,
    types::{ExecutionOutcome, ExecutionStatus, Target},
};

/// Formats toolkit output for the terminal
pub struct OutputFormatter;

impl OutputFormatter {
    /// Banner line with a title between two separators
    pub fn format_header(title: &str) -> String {
        let separator = "=".repeat(60);
        format!(
            "{}\n{}\n{}",
            separator.cyan(),
            format!("   {}", title).cyan().bold(),
            separator.cyan()
        )
    }

    /// Line printed before an invocation starts
    pub fn format_running(tool_id: &str, target: &Target) -> String {
        format!("{}", format!("\n[*] Running {} on {}...", tool_id, target).cyan())
    }

    /// Lines describing one finished invocation
    pub fn format_outcome(outcome: &ExecutionOutcome) -> String {
        let mut lines = vec![format!("{}", format!("[*] Executing: {}", outcome.command.join(" ")).blue())];

        match &outcome.status {
            ExecutionStatus::Success => {
                lines.push(format!("{}", format!("[✓] {} completed successfully.", outcome.tool_id).green()));
            }
            ExecutionStatus::NonZeroExit(_) => {
                lines.push(format!("{}", format!("[!] {} {}", outcome.tool_id, outcome.status).yellow()));
                if !outcome.stderr.trim().is_empty() {
                    lines.push(format!("{}", format!("Error output: {}", outcome.stderr.trim()).red()));
                }
            }
            ExecutionStatus::CommandNotFound => {
                lines.push(format!(
                    "{}",
                    format!("[!] Error executing {} on {}: Command not found", outcome.tool_id, outcome.target).red()
                ));
            }
            other => {
                lines.push(format!(
                    "{}",
                    format!("[!] Error executing {} on {}: {}", outcome.tool_id, outcome.target, other).red()
                ));
            }
        }

        if let Some(path) = &outcome.artifact {
            lines.push(format!("{}", format!("[✓] Results saved to {}", path.display()).green()));
        }
        if let Some(reason) = &outcome.persist_error {
            lines.push(format!("{}", format!("[!] Error saving results: {}", reason).red()));
        }

        lines.join("\n")
    }

    /// Closing summary of a batch
    pub fn format_summary(outcomes: &[ExecutionOutcome]) -> String {
        let succeeded = outcomes.iter().filter(|o| o.success()).count();
        let failed = outcomes.len() - succeeded;
        let saved = outcomes.iter().filter(|o| o.artifact.is_some()).count();

        format!(
            "\n{} {} succeeded, {} failed, {} result file(s) written",
            "Summary:".bold(),
            succeeded.to_string().green().bold(),
            if failed > 0 { failed.to_string().red().bold() } else { failed.to_string().normal() },
            saved
        )
    }

    /// Outcomes as pretty JSON
    pub fn format_outcomes_json(outcomes: &[ExecutionOutcome]) -> String {
        let output = json!({
            "outcomes": outcomes,
            "total": outcomes.len(),
            "succeeded": outcomes.iter().filter(|o| o.success()).count(),
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    /// Numbered tool list, with the resolved command line when a target is given
    pub fn format_tool_list(tools: &[ToolSpec], preview: Option<(&Target, &BuildContext<'_>)>) -> String {
        let mut output = String::new();

        for (index, tool) in tools.iter().enumerate() {
            output.push_str(&format!(
                " {} {} {}\n",
                format!("[{}]", index + 1).cyan().bold(),
                tool.id(),
                format!("({})", tool.phase()).dimmed()
            ));
            if let Some((target, ctx)) = preview {
                output.push_str(&format!("      {}\n", tool.build_command(target, ctx).join(" ").blue()));
            }
        }

        output
    }

    /// Dependency check results and install hints
    pub fn format_dependency_report(report: &DependencyReport) -> String {
        let mut output = String::new();

        match report.package_manager {
            Some(manager) => output.push_str(&format!("{}\n", format!("[i] Detected package manager: {}", manager).cyan())),
            None => output.push_str(&format!(
                "{}\n",
                "[!] Unsupported package manager. Only apt and pacman are supported.".red()
            )),
        }

        for status in &report.statuses {
            if status.installed() {
                output.push_str(&format!("{}\n", format!("[✓] {} is installed.", status.dependency.name).green()));
                match &status.version {
                    Some(version) => output.push_str(&format!("{}\n", format!("   - Version info: {}", version).cyan())),
                    None => output.push_str(&format!("{}\n", "   - Could not retrieve version info".yellow())),
                }
            } else {
                output.push_str(&format!("{}\n", format!("[✗] {} is not installed.", status.dependency.name).red()));
            }
        }

        output.push_str(&format!(
            "\n{}\n",
            format!(
                "[i] Found {} of {} required tools.",
                report.installed().len(),
                report.statuses.len()
            )
            .blue()
        ));

        let missing = report.missing();
        if missing.is_empty() {
            output.push_str(&format!("{}\n", "[✓] All required tools are installed.".green()));
        } else {
            let names: Vec<&str> = missing.iter().map(|s| s.dependency.name).collect();
            output.push_str(&format!("{}\n", format!("[!] Missing tools: {}", names.join(", ")).yellow()));

            let commands = report.manual_install_commands();
            if !commands.is_empty() {
                output.push_str(&format!("\n{}\n", "To manually install missing tools:".cyan()));
                for command in commands {
                    output.push_str(&format!("{}\n", command.yellow()));
                }
            }
        }

        output
    }

    /// Format error message for CLI display
    pub fn format_error(error: &RatError) -> String {
        format!("{} {}", "[!]".red().bold(), error.to_string().red())
    }

    /// Format success message for CLI display
    pub fn format_success(message: &str) -> String {
        format!("{} {}", "[✓]".green().bold(), message.green())
    }

    /// Format info message for CLI display
    pub fn format_info(message: &str) -> String {
        format!("{} {}", "[i]".cyan().bold(), message.cyan())
    }

    /// Format warning message for CLI display
    pub fn format_warning(message: &str) -> String {
        format!("{} {}", "[!]".yellow().bold(), message.yellow())
    }
}
