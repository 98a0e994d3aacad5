//! Pull request preparation
//!
//! The default path is pure URL construction: resolve owner/repo from the
//! remote URL and build the host's compare page for the two branches. When a
//! GitHub token is available the client first attempts a real pull request
//! through the API and degrades to the compare URL if that fails - an API
//! failure never fails the run.

use regex::Regex;
use tracing::{debug, warn};

use templatepress::LogSink;

/// Error types for PR preparation
#[derive(Debug, thiserror::Error)]
pub enum PrError {
    #[error("Could not determine owner/repo from remote URL: {0}")]
    UnrecognizedRemote(String),

    #[error("GitHub API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    ApiStatus { status: u16, message: String },
}

/// Owner/repository pair resolved from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

/// Parse `https://host/owner/repo(.git)`, `git@host:owner/repo(.git)` and
/// `ssh://git@host/owner/repo(.git)` remote URL forms.
pub fn parse_remote_url(url: &str) -> Result<RepoSlug, PrError> {
    let url = url.trim();
    let pattern = Regex::new(r"^(?:https?://|ssh://git@|git@)([^/:]+)[/:]([^/]+)/(.+?)(?:\.git)?/?$")
        .expect("remote URL pattern is a valid regex");

    let caps = pattern
        .captures(url)
        .ok_or_else(|| PrError::UnrecognizedRemote(url.to_string()))?;

    let slug = RepoSlug {
        host: caps[1].to_string(),
        owner: caps[2].to_string(),
        repo: caps[3].to_string(),
    };
    debug!(?slug, "parse_remote_url: resolved");
    Ok(slug)
}

/// Build the ready-to-open comparison URL for a pending pull request.
pub fn compare_url(slug: &RepoSlug, base: &str, head: &str) -> String {
    format!(
        "https://{}/{}/{}/compare/{}...{}?expand=1",
        slug.host, slug.owner, slug.repo, base, head
    )
}

/// Everything needed to describe the pull request.
#[derive(Debug, Clone)]
pub struct PrRequest<'a> {
    pub base: &'a str,
    pub head: &'a str,
    pub title: &'a str,
    pub body: &'a str,
}

/// What `prepare` produced: a URL, and whether the API actually opened the
/// pull request or the URL is the compare page to open by hand.
#[derive(Debug, Clone)]
pub struct PrOutcome {
    pub url: String,
    pub created: bool,
}

/// Prepares pull requests, with an optional token-authenticated API path.
pub struct PrClient<'a> {
    token: Option<String>,
    log: &'a dyn LogSink,
}

impl<'a> PrClient<'a> {
    pub fn new(token: Option<String>, log: &'a dyn LogSink) -> Self {
        Self { token, log }
    }

    /// Prepare a pull request for the given repository and branches.
    ///
    /// With a token and a github.com remote, try the API first; otherwise
    /// (or on API failure) fall back to constructing the comparison URL,
    /// which never touches the network.
    pub async fn prepare(&self, slug: &RepoSlug, request: &PrRequest<'_>) -> PrOutcome {
        if let Some(token) = &self.token {
            if slug.host == "github.com" {
                self.log.log(&format!(
                    "Creating pull request from {} to {} via the GitHub API",
                    request.head, request.base
                ));
                match self.create_via_api(token, slug, request).await {
                    Ok(url) => {
                        self.log.log(&format!("Successfully created pull request: {}", url));
                        return PrOutcome { url, created: true };
                    }
                    Err(e) => {
                        warn!(error = %e, "PR creation via API failed, falling back to compare URL");
                        self.log.log(&format!("Failed to create pull request via API: {}", e));
                    }
                }
            } else {
                self.log
                    .log(&format!("Host {} is not github.com, skipping the API path", slug.host));
            }
        }

        let url = compare_url(slug, request.base, request.head);
        self.log.log(&format!("Prepared comparison URL: {}", url));
        PrOutcome { url, created: false }
    }

    async fn create_via_api(&self, token: &str, slug: &RepoSlug, request: &PrRequest<'_>) -> Result<String, PrError> {
        let endpoint = format!("https://api.github.com/repos/{}/{}/pulls", slug.owner, slug.repo);
        debug!(%endpoint, "PrClient::create_via_api: posting");

        let client = reqwest::Client::new();
        let response = client
            .post(&endpoint)
            .header("Authorization", format!("token {}", token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "branchforge")
            .json(&serde_json::json!({
                "title": request.title,
                "body": request.body,
                "head": request.head,
                "base": request.base,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = body["message"].as_str().unwrap_or("unknown error").to_string();
            return Err(PrError::ApiStatus {
                status: status.as_u16(),
                message,
            });
        }

        body["html_url"]
            .as_str()
            .map(str::to_string)
            .ok_or(PrError::ApiStatus {
                status: status.as_u16(),
                message: "response missing html_url".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(host: &str, owner: &str, repo: &str) -> RepoSlug {
        RepoSlug {
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    #[test]
    fn test_parse_https_remote() {
        assert_eq!(
            parse_remote_url("https://github.com/acme/widgets.git").unwrap(),
            slug("github.com", "acme", "widgets")
        );
        assert_eq!(
            parse_remote_url("https://github.com/acme/widgets").unwrap(),
            slug("github.com", "acme", "widgets")
        );
    }

    #[test]
    fn test_parse_ssh_remotes() {
        assert_eq!(
            parse_remote_url("git@github.com:acme/widgets.git").unwrap(),
            slug("github.com", "acme", "widgets")
        );
        assert_eq!(
            parse_remote_url("ssh://git@github.com/acme/widgets.git").unwrap(),
            slug("github.com", "acme", "widgets")
        );
    }

    #[test]
    fn test_parse_keeps_dots_in_repo_name() {
        assert_eq!(
            parse_remote_url("https://github.com/acme/my.site.git").unwrap(),
            slug("github.com", "acme", "my.site")
        );
    }

    #[test]
    fn test_parse_other_host() {
        assert_eq!(
            parse_remote_url("https://git.example.org/team/tool.git").unwrap(),
            slug("git.example.org", "team", "tool")
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_remote_url("/local/path/to/repo"),
            Err(PrError::UnrecognizedRemote(_))
        ));
        assert!(parse_remote_url("").is_err());
    }

    #[test]
    fn test_compare_url_shape() {
        let url = compare_url(&slug("github.com", "acme", "widgets"), "main", "feature/stamp");
        assert_eq!(url, "https://github.com/acme/widgets/compare/main...feature/stamp?expand=1");
    }

    #[tokio::test]
    async fn test_prepare_without_token_builds_compare_url() {
        let sink = |_: &str| {};
        let client = PrClient::new(None, &sink);
        let outcome = client
            .prepare(
                &slug("github.com", "acme", "widgets"),
                &PrRequest {
                    base: "main",
                    head: "feature/stamp",
                    title: "stamp",
                    body: "body",
                },
            )
            .await;

        assert!(!outcome.created);
        assert_eq!(
            outcome.url,
            "https://github.com/acme/widgets/compare/main...feature/stamp?expand=1"
        );
    }

    #[tokio::test]
    async fn test_prepare_with_token_skips_api_for_other_hosts() {
        let sink = |_: &str| {};
        let client = PrClient::new(Some("token".to_string()), &sink);
        let outcome = client
            .prepare(
                &slug("git.example.org", "team", "tool"),
                &PrRequest {
                    base: "main",
                    head: "feature",
                    title: "t",
                    body: "b",
                },
            )
            .await;

        assert!(!outcome.created);
        assert!(outcome.url.starts_with("https://git.example.org/"));
    }
}
