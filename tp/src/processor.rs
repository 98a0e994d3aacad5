//! Template processing - recursive copy with substitution and renaming
//!
//! Two failure tiers: a single file that cannot be read, written, or moved
//! is logged and skipped; a source tree that cannot be enumerated fails the
//! whole call. Already-written output files are never rolled back.

use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::LogSink;
use crate::config::StampConfig;
use crate::rename::apply_renaming;
use crate::substitute::Substituter;

/// Counters for a completed pass, consumed for logging only - the positive
/// outcome signal is the absence of a fatal error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSummary {
    /// Files written to the output directory
    pub processed: usize,
    /// Files that landed under a rule-renamed path
    pub renamed: usize,
    /// Files skipped after a read or write failure
    pub failed: usize,
}

/// Walks a template tree, substituting placeholders and applying renaming
/// rules. Files are handled one at a time in enumeration order; walk order
/// is not sorted and nothing relies on it beyond log readability.
pub struct TemplateProcessor<'a> {
    substituter: Substituter,
    log: &'a dyn LogSink,
}

impl<'a> TemplateProcessor<'a> {
    pub fn new(log: &'a dyn LogSink) -> Self {
        Self {
            substituter: Substituter::new(),
            log,
        }
    }

    /// Copy `source_dir` into `dest_dir`, substituting `{{ key }}` tokens in
    /// every file and, when `rename_enabled`, applying `$$FILE_` renaming
    /// rules to output names.
    ///
    /// `dest_dir` and all intermediate directories are created if absent;
    /// existing output files are overwritten. A missing source directory is
    /// fatal; an empty one succeeds with zero files processed.
    pub async fn process(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        config: &StampConfig,
        rename_enabled: bool,
    ) -> Result<ProcessSummary> {
        debug!(?source_dir, ?dest_dir, rename_enabled, "TemplateProcessor::process: called");

        if !source_dir.is_dir() {
            return Err(eyre!("Template directory not found: {}", source_dir.display()));
        }

        tokio::fs::create_dir_all(dest_dir)
            .await
            .context(format!("Failed to create output directory: {}", dest_dir.display()))?;

        let files = self.collect_files(source_dir)?;
        self.log.log(&format!("Found {} files to process", files.len()));

        let rules = if rename_enabled { config.rename_rules() } else { Vec::new() };
        if rename_enabled {
            self.log.log(&format!("Found {} file renaming rules", rules.len()));
        }

        let mut summary = ProcessSummary::default();

        for rel in files {
            let source_path = source_dir.join(&rel);

            let target_rel = if rules.is_empty() {
                rel.clone()
            } else {
                let candidate = apply_renaming(&rel, &rules);
                if candidate != rel {
                    self.log
                        .log(&format!("File renamed: {} -> {}", rel.display(), candidate.display()));
                }
                candidate
            };

            let target_path = dest_dir.join(&target_rel);

            match self.process_file(&source_path, &target_path, config).await {
                Ok(()) => {
                    self.log.log(&format!("Processed: {}", target_rel.display()));
                    summary.processed += 1;
                    if target_rel != rel {
                        summary.renamed += 1;
                    }
                }
                Err(e) => {
                    warn!(file = %rel.display(), error = %e, "failed to process file");
                    self.log.log(&format!("Error processing file {}: {}", rel.display(), e));
                    summary.failed += 1;
                }
            }
        }

        self.log.log(&format!(
            "Template processing complete: {} processed, {} renamed, {} failed",
            summary.processed, summary.renamed, summary.failed
        ));
        Ok(summary)
    }

    /// Apply renaming rules to files already on disk, moving each match in
    /// place. Returns the number of files actually renamed.
    ///
    /// A configuration with no `$$FILE_` keys is an explicit no-op, not an
    /// error. Per-file move failures are logged and skipped.
    pub async fn rename_in_place(&self, directory: &Path, config: &StampConfig) -> Result<usize> {
        debug!(?directory, "TemplateProcessor::rename_in_place: called");

        if !directory.is_dir() {
            return Err(eyre!("Directory not found: {}", directory.display()));
        }

        let files = self.collect_files(directory)?;
        self.log.log(&format!("Checking {} files for renaming rules", files.len()));

        let rules = config.rename_rules();
        if rules.is_empty() {
            self.log.log("No file renaming rules found in configuration");
            return Ok(0);
        }
        self.log.log(&format!("Found {} file renaming rules", rules.len()));

        let mut renamed = 0usize;

        for rel in files {
            let candidate = apply_renaming(&rel, &rules);
            if candidate == rel {
                continue;
            }

            let from = directory.join(&rel);
            let to = directory.join(&candidate);

            match self.move_file(&from, &to).await {
                Ok(()) => {
                    self.log
                        .log(&format!("Renamed: {} -> {}", rel.display(), candidate.display()));
                    renamed += 1;
                }
                Err(e) => {
                    warn!(file = %rel.display(), error = %e, "failed to rename file");
                    self.log.log(&format!("Error renaming file {}: {}", rel.display(), e));
                }
            }
        }

        self.log.log(&format!("Renamed {} files based on configuration rules", renamed));
        Ok(renamed)
    }

    /// Enumerate regular files under `root` as root-relative paths.
    ///
    /// Directories are skipped (and logged), never copied as empty entries.
    /// Any enumeration error is fatal to the whole operation.
    fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = entry.context(format!("Failed to enumerate {}", root.display()))?;
            let rel = entry
                .path()
                .strip_prefix(root)
                .context("walk entry outside of root")?
                .to_path_buf();

            if entry.file_type().is_file() {
                files.push(rel);
            } else if !rel.as_os_str().is_empty() {
                self.log.log(&format!("Skipping directory: {}", rel.display()));
            }
        }

        debug!(count = files.len(), "TemplateProcessor::collect_files: enumerated");
        Ok(files)
    }

    async fn process_file(&self, source: &Path, target: &Path, config: &StampConfig) -> Result<()> {
        let content = tokio::fs::read_to_string(source)
            .await
            .context(format!("Failed to read {}", source.display()))?;

        let substituted = self.substituter.apply(&content, config);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::write(target, substituted)
            .await
            .context(format!("Failed to write {}", target.display()))?;

        Ok(())
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::rename(from, to)
            .await
            .context(format!("Failed to move {} to {}", from.display(), to.display()))?;

        Ok(())
    }
}
