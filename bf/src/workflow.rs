//! End-to-end run sequencing: git bracket, template pass, PR preparation
//!
//! One run is a single logical sequence; there is no cancellation and no
//! rollback of already-written output files when a later step fails.
//! Concurrent runs against the same output directory are unsupported.

use std::path::PathBuf;

use eyre::{Result, eyre};
use serde::Serialize;
use tracing::{debug, info};

use templatepress::{StampConfig, TemplateProcessor};

use crate::config::Config;
use crate::git::GitRunner;
use crate::pr::{self, PrClient, PrRequest};
use crate::progress::Reporter;

/// Parameters for a single stamping run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Git repository the run operates on
    pub repo_dir: PathBuf,
    /// Source template directory
    pub template_dir: PathBuf,
    /// Destination for processed files (inside the repository, so the
    /// commit picks them up)
    pub output_dir: PathBuf,
    /// Branch the new branch is cut from
    pub base_branch: String,
    /// Branch to create for the stamped files
    pub new_branch: String,
    /// Commit message, also used as the PR title
    pub commit_message: String,
    /// Branch the pull request targets
    pub pr_base: String,
    /// Apply $$FILE_ renaming rules
    pub rename_enabled: bool,
    /// The stamp configuration driving substitution and renaming
    pub stamp_config: StampConfig,
}

/// Exit contract for a run: the absence of a fatal error plus
/// `success: true` is the only positive outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

/// Run the full workflow, folding any fatal error into the outcome.
///
/// The log stream carries the details either way; callers only branch on
/// `success`.
pub async fn run(options: &RunOptions, config: &Config, reporter: &Reporter) -> RunOutcome {
    info!(new_branch = %options.new_branch, "workflow::run: starting");
    match run_inner(options, config, reporter).await {
        Ok(pr_url) => RunOutcome {
            success: true,
            error: None,
            pr_url,
        },
        Err(e) => {
            reporter.emit(format!("Error: {:#}", e));
            RunOutcome {
                success: false,
                error: Some(format!("{:#}", e)),
                pr_url: None,
            }
        }
    }
}

async fn run_inner(options: &RunOptions, config: &Config, reporter: &Reporter) -> Result<Option<String>> {
    let git = GitRunner::new(&options.repo_dir, reporter);
    git.ensure_repo().await?;

    git.checkout(&options.base_branch).await?;
    git.pull(&config.remote, &options.base_branch).await?;
    git.create_branch(&options.new_branch, Some(&options.base_branch)).await?;

    reporter.emit("Processing templates...");
    let processor = TemplateProcessor::new(reporter);
    processor
        .process(
            &options.template_dir,
            &options.output_dir,
            &options.stamp_config,
            options.rename_enabled,
        )
        .await?;

    if options.rename_enabled {
        reporter.emit("Checking for file renaming rules...");
        processor.rename_in_place(&options.output_dir, &options.stamp_config).await?;
    } else {
        reporter.emit("File renaming is disabled, skipping the rename pass");
    }

    git.add(".").await?;
    git.commit(&options.commit_message).await?;
    git.push(&config.remote, &options.new_branch, true).await?;

    reporter.emit(format!(
        "Preparing pull request from {} to {}...",
        options.new_branch, options.pr_base
    ));

    let pr_url = match prepare_pr(options, config, &git, reporter).await {
        Ok(url) => {
            reporter.emit(format!("PR URL: {}", url));
            Some(url)
        }
        Err(e) => {
            // A run that pushed its branch is still a success; the PR can
            // be opened by hand.
            debug!(error = %e, "workflow: PR preparation failed");
            reporter.emit(format!("Failed to prepare PR URL: {}", e));
            None
        }
    };

    Ok(pr_url)
}

async fn prepare_pr(
    options: &RunOptions,
    config: &Config,
    git: &GitRunner<'_>,
    reporter: &Reporter,
) -> Result<String> {
    let remote_url = git
        .remote_url(&config.remote)
        .await?
        .ok_or_else(|| eyre!("Repository has no remote named {}", config.remote))?;

    let slug = pr::parse_remote_url(&remote_url)?;

    let client = PrClient::new(config.github_token(), reporter);
    let outcome = client
        .prepare(
            &slug,
            &PrRequest {
                base: &options.pr_base,
                head: &options.new_branch,
                title: &options.commit_message,
                body: &config.pr_body,
            },
        )
        .await;

    Ok(outcome.url)
}
