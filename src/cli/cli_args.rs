use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::tools::Phase;

/// RAT - Reconnaissance and Analysis Toolkit
#[derive(Parser, Debug)]
#[command(name = "rat")]
#[command(about = "Reconnaissance and analysis toolkit for external security-assessment tools")]
#[command(version = "0.1.0")]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory that holds the phase result trees
    #[arg(long, global = true)]
    pub output_root: Option<PathBuf>,

    /// Diagnostic log file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Kill any tool running longer than this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one tool, or a whole phase, against the target list
    Run {
        /// Phase to run (recon, scanning, enumeration)
        #[arg(value_enum)]
        phase: Phase,

        /// Run only this tool
        #[arg(short, long)]
        tool: Option<String>,

        /// Target list file
        #[arg(long)]
        targets: Option<PathBuf>,

        #[command(flatten)]
        wordlists: WordlistArgs,

        /// Print outcomes as JSON when done
        #[arg(long)]
        json: bool,
    },

    /// List registered tools
    Tools {
        /// Only tools of this phase
        #[arg(short, long, value_enum)]
        phase: Option<Phase>,

        /// Show the command each tool would run against this target
        #[arg(long)]
        target: Option<String>,
    },

    /// Validate a target list and make it the default one
    Import {
        /// File with one target per line
        file: PathBuf,
    },

    /// Check that the external tools are installed
    Deps {
        /// Install missing packages with apt or pacman
        #[arg(long)]
        install: bool,
    },

    /// Show the diagnostic log
    Logs,

    /// Delete stored results
    Clear {
        /// Only this phase
        #[arg(short, long, value_enum)]
        phase: Option<Phase>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show loaded targets, stored results and last run time
    Status,

    /// Interactive menu
    Menu,
}

/// Wordlist overrides for the enumeration tools
#[derive(Args, Debug, Clone, Default)]
pub struct WordlistArgs {
    /// Wordlist for dirb
    #[arg(long, value_name = "FILE")]
    pub dirb_wordlist: Option<PathBuf>,

    /// Wordlist for gobuster
    #[arg(long, value_name = "FILE")]
    pub gobuster_wordlist: Option<PathBuf>,

    /// Password list for hydra
    #[arg(long, value_name = "FILE")]
    pub hydra_wordlist: Option<PathBuf>,
}
