//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BranchForge - template stamping with a git bracket
#[derive(Parser)]
#[command(
    name = "bf",
    author,
    version,
    about = "Stamp templates onto a fresh git branch and prepare the pull request",
    long_about = None,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full workflow: branch, stamp, commit, push, prepare the PR
    Run {
        /// Git repository to operate on
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Source template directory
        #[arg(short, long)]
        template_dir: PathBuf,

        /// Destination for processed files (inside the repository)
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Branch the new branch is cut from
        #[arg(short, long, default_value = "main")]
        base_branch: String,

        /// Name of the branch to create
        #[arg(short = 'n', long)]
        branch: String,

        /// Commit message (also used as the PR title)
        #[arg(short, long)]
        message: String,

        /// Branch the pull request targets (defaults to the base branch)
        #[arg(long)]
        pr_base: Option<String>,

        /// Path to the stamp configuration JSON
        #[arg(short = 's', long)]
        stamp: PathBuf,

        /// Apply $$FILE_ renaming rules
        #[arg(long)]
        rename: bool,
    },

    /// Prepare a pull-request comparison URL without running the workflow
    PrUrl {
        /// Git repository to operate on
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Base branch of the comparison
        #[arg(short, long)]
        base: String,

        /// Head branch of the comparison
        #[arg(long)]
        head: String,
    },
}
