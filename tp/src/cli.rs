//! CLI argument parsing for templatepress

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tp")]
#[command(author, version, about = "Template stamping engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a template directory into an output directory
    Process {
        /// Source template directory
        #[arg(required = true)]
        template_dir: PathBuf,

        /// Destination directory for processed files
        #[arg(required = true)]
        output_dir: PathBuf,

        /// Path to the stamp configuration JSON
        #[arg(short, long)]
        config: PathBuf,

        /// Apply $$FILE_ renaming rules while copying
        #[arg(short, long)]
        rename: bool,
    },

    /// Apply renaming rules to files already in a directory
    Rename {
        /// Directory whose files should be renamed in place
        #[arg(required = true)]
        directory: PathBuf,

        /// Path to the stamp configuration JSON
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List the renaming rules a configuration defines
    Rules {
        /// Path to the stamp configuration JSON
        #[arg(short, long)]
        config: PathBuf,
    },
}
