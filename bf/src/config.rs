//! Configuration for branchforge

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote used for pull and push
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Body text for prepared pull requests
    #[serde(default = "default_pr_body")]
    pub pr_body: String,

    /// GitHub token for the API path; the BRANCHFORGE_GITHUB_TOKEN
    /// environment variable takes precedence over this field
    #[serde(default)]
    pub github_token: Option<String>,

    /// Directory where per-run logs are written
    #[serde(default = "default_runs_dir")]
    pub runs_dir: PathBuf,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_pr_body() -> String {
    "Generated by branchforge".to_string()
}

fn default_runs_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("branchforge")
        .join("runs")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            pr_body: default_pr_body(),
            github_token: None,
            runs_dir: default_runs_dir(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("branchforge").join("config.yml")),
            Some(PathBuf::from("branchforge.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the GitHub token, environment first, then config file.
    pub fn github_token(&self) -> Option<String> {
        std::env::var("BRANCHFORGE_GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.github_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.remote, "origin");
        assert!(config.github_token.is_none());
        assert!(!config.pr_body.is_empty());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "remote: upstream\npr_body: custom body\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.remote, "upstream");
        assert_eq!(config.pr_body, "custom body");
        // Unspecified fields keep their defaults
        assert_eq!(config.runs_dir, default_runs_dir());
    }

    #[test]
    fn test_save_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yml");

        let mut config = Config::default();
        config.remote = "fork".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.remote, "fork");
    }
}
