//! BranchForge - template stamping with a git bracket
//!
//! CLI entry point for running the stamp-and-push workflow.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use branchforge::cli::{Cli, Command};
use branchforge::config::Config;
use branchforge::git::GitRunner;
use branchforge::progress::{LogBus, RunLogWriter};
use branchforge::workflow::{self, RunOptions};
use branchforge::{RunOutcome, pr};
use templatepress::StampConfig;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("branchforge")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("branchforge.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Run {
            repo,
            template_dir,
            output_dir,
            base_branch,
            branch,
            message,
            pr_base,
            stamp,
            rename,
        } => {
            let stamp_config = StampConfig::load(&stamp)?;
            let options = RunOptions {
                repo_dir: repo,
                template_dir,
                output_dir,
                pr_base: pr_base.unwrap_or_else(|| base_branch.clone()),
                base_branch,
                new_branch: branch,
                commit_message: message,
                rename_enabled: rename,
                stamp_config,
            };
            cmd_run(&config, options).await
        }
        Command::PrUrl { repo, base, head } => cmd_pr_url(&config, repo, &base, &head).await,
    }
}

async fn cmd_run(config: &Config, options: RunOptions) -> Result<()> {
    let run_id = Uuid::now_v7().to_string();
    info!(%run_id, "starting run");

    let bus = LogBus::with_default_capacity();

    // Terminal printer - drains the bus so progress is visible as it happens
    let mut printer_rx = bus.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match printer_rx.recv().await {
                Ok(line) => println!("{}", line.dimmed()),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Persistent run log
    let writer = RunLogWriter::create(&config.runs_dir, &run_id).context("Failed to create run log")?;
    let log_path = writer.path().to_path_buf();
    let writer_handle = tokio::spawn(writer.run(bus.subscribe()));

    let reporter = bus.reporter();
    let outcome = workflow::run(&options, config, &reporter).await;

    // Close the bus so both consumers drain and exit
    drop(reporter);
    drop(bus);
    let _ = printer.await;
    let _ = writer_handle.await;

    report_outcome(&outcome, &log_path)
}

fn report_outcome(outcome: &RunOutcome, log_path: &std::path::Path) -> Result<()> {
    println!("Run log: {}", log_path.display().to_string().dimmed());

    if outcome.success {
        println!("{} Run completed successfully", "✓".green());
        if let Some(url) = &outcome.pr_url {
            println!("  Open the pull request: {}", url.cyan());
        }
        Ok(())
    } else {
        println!(
            "{} Run failed: {}",
            "✗".red(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }
}

async fn cmd_pr_url(config: &Config, repo: PathBuf, base: &str, head: &str) -> Result<()> {
    let sink = |line: &str| println!("{}", line.dimmed());
    let git = GitRunner::new(repo, &sink);
    git.ensure_repo().await?;

    let remote_url = git
        .remote_url(&config.remote)
        .await?
        .ok_or_else(|| eyre!("Repository has no remote named {}", config.remote))?;
    let slug = pr::parse_remote_url(&remote_url)?;

    println!("{}", pr::compare_url(&slug, base, head).cyan());
    Ok(())
}
