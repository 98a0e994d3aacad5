//! Git command sequencing for the stamping workflow
//!
//! Shells out to the `git` CLI rather than linking a libgit2 binding; the
//! workflow needs exactly the porcelain commands a developer would type, and
//! stderr from the real tool makes failures directly actionable.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use templatepress::LogSink;

/// Error types for git operations
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Runs git commands against one repository directory, logging each
/// operation through the run log stream.
pub struct GitRunner<'a> {
    repo_dir: PathBuf,
    log: &'a dyn LogSink,
}

impl<'a> GitRunner<'a> {
    pub fn new(repo_dir: impl Into<PathBuf>, log: &'a dyn LogSink) -> Self {
        let repo_dir = repo_dir.into();
        debug!(?repo_dir, "GitRunner::new: called");
        Self { repo_dir, log }
    }

    /// Run one git command, capturing stdout and folding a non-zero exit
    /// into [`GitError::CommandFailed`] with the command's stderr.
    async fn git(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(?args, repo_dir = ?self.repo_dir, "GitRunner::git: running");
        let output = Command::new("git").args(args).current_dir(&self.repo_dir).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(?args, %stderr, "GitRunner::git: command failed");
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Check whether the directory is inside a git working tree.
    pub async fn is_repo(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"]).await.is_ok()
    }

    /// Fail early with [`GitError::NotARepo`] outside a working tree.
    pub async fn ensure_repo(&self) -> Result<(), GitError> {
        if self.is_repo().await {
            Ok(())
        } else {
            Err(GitError::NotARepo(self.repo_dir.display().to_string()))
        }
    }

    /// Checkout an existing branch.
    pub async fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.log.log(&format!("Checking out branch: {}", branch));
        self.git(&["checkout", branch]).await?;
        self.log.log(&format!("Successfully checked out branch: {}", branch));
        Ok(())
    }

    /// Pull the latest changes for a branch from a remote.
    pub async fn pull(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.log.log(&format!("Pulling latest changes from {}/{}", remote, branch));
        self.git(&["pull", remote, branch]).await?;
        self.log.log("Successfully pulled latest changes");
        Ok(())
    }

    /// Create and switch to a new branch, optionally from a start point.
    pub async fn create_branch(&self, name: &str, from: Option<&str>) -> Result<(), GitError> {
        match from {
            Some(from) => {
                self.log.log(&format!("Creating new branch {} from {}", name, from));
                self.git(&["checkout", "-b", name, from]).await?;
            }
            None => {
                self.log.log(&format!("Creating new branch {}", name));
                self.git(&["checkout", "-b", name]).await?;
            }
        }
        self.log.log(&format!("Successfully created branch: {}", name));
        Ok(())
    }

    /// Stage a pathspec (default everything: `.`).
    pub async fn add(&self, pathspec: &str) -> Result<(), GitError> {
        self.log.log(&format!("Staging changes: {}", pathspec));
        self.git(&["add", pathspec]).await?;
        self.log.log("Successfully staged changes");
        Ok(())
    }

    /// Commit staged changes.
    pub async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.log.log(&format!("Committing with message: \"{}\"", message));
        self.git(&["commit", "-m", message]).await?;
        self.log.log("Successfully committed changes");
        Ok(())
    }

    /// Push a branch to a remote, setting the upstream on first push.
    pub async fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), GitError> {
        self.log.log(&format!("Pushing {} to {}", branch, remote));
        if set_upstream {
            self.git(&["push", "--set-upstream", remote, branch]).await?;
        } else {
            self.git(&["push", remote, branch]).await?;
        }
        self.log.log(&format!("Successfully pushed {} to {}", branch, remote));
        Ok(())
    }

    /// Look up a remote's URL. `None` when the remote does not exist.
    pub async fn remote_url(&self, remote: &str) -> Result<Option<String>, GitError> {
        match self.git(&["remote", "get-url", remote]).await {
            Ok(url) => Ok(Some(url.trim().to_string())),
            Err(GitError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The repository directory this runner operates on.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn quiet() -> impl Fn(&str) + Send + Sync {
        |_: &str| {}
    }

    async fn setup_git_repo(dir: &Path) {
        Command::new("git").args(["init"]).current_dir(dir).output().await.unwrap();
        Command::new("git")
            .args(["config", "user.email", "test@test.com"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        Command::new("git")
            .args(["commit", "--allow-empty", "-m", "initial"])
            .current_dir(dir)
            .output()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_is_repo() {
        let repo = tempdir().unwrap();
        let plain = tempdir().unwrap();
        setup_git_repo(repo.path()).await;

        let sink = quiet();
        assert!(GitRunner::new(repo.path(), &sink).is_repo().await);
        assert!(!GitRunner::new(plain.path(), &sink).is_repo().await);
    }

    #[tokio::test]
    async fn test_create_branch_and_checkout() {
        let repo = tempdir().unwrap();
        setup_git_repo(repo.path()).await;

        let sink = quiet();
        let git = GitRunner::new(repo.path(), &sink);

        git.create_branch("feature/stamp", None).await.unwrap();

        let head = git.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await.unwrap();
        assert_eq!(head.trim(), "feature/stamp");
    }

    #[tokio::test]
    async fn test_add_and_commit() {
        let repo = tempdir().unwrap();
        setup_git_repo(repo.path()).await;

        std::fs::write(repo.path().join("file.txt"), "content").unwrap();

        let sink = quiet();
        let git = GitRunner::new(repo.path(), &sink);
        git.add(".").await.unwrap();
        git.commit("add file").await.unwrap();

        let subject = git.git(&["log", "-1", "--format=%s"]).await.unwrap();
        assert_eq!(subject.trim(), "add file");
    }

    #[tokio::test]
    async fn test_checkout_missing_branch_fails() {
        let repo = tempdir().unwrap();
        setup_git_repo(repo.path()).await;

        let sink = quiet();
        let git = GitRunner::new(repo.path(), &sink);
        let result = git.checkout("does-not-exist").await;
        assert!(matches!(result, Err(GitError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_remote_url() {
        let repo = tempdir().unwrap();
        setup_git_repo(repo.path()).await;

        let sink = quiet();
        let git = GitRunner::new(repo.path(), &sink);

        assert_eq!(git.remote_url("origin").await.unwrap(), None);

        git.git(&["remote", "add", "origin", "https://github.com/acme/widgets.git"])
            .await
            .unwrap();
        assert_eq!(
            git.remote_url("origin").await.unwrap(),
            Some("https://github.com/acme/widgets.git".to_string())
        );
    }
}
