// Command-line configuration.
// Parses flags (with environment fallbacks) into a validated runtime config.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cache::{FreshnessCache, PULL_REQUESTS_TTL, REPOSITORIES_TTL, paths};
use crate::error::{DashError, Result};
use crate::github::client::GITHUB_API_BASE;

/// orgdash - dashboard for a GitHub organization
///
/// Lists the organization's repositories with language breakdown, latest
/// commit and README excerpt, plus an organization-wide language summary.
/// With --admin, open pull requests can be reviewed and closed.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Organization login
    #[arg(value_name = "ORG")]
    pub org: String,

    /// GitHub token (also via GITHUB_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API URL
    #[arg(long = "api-url", value_name = "URL", default_value = GITHUB_API_BASE)]
    pub api_url: String,

    /// Seconds the repository list stays fresh
    #[arg(long = "repos-ttl", value_name = "SECS", default_value_t = REPOSITORIES_TTL.as_secs())]
    pub repos_ttl: u64,

    /// Seconds the pull request list stays fresh
    #[arg(long = "pulls-ttl", value_name = "SECS", default_value_t = PULL_REQUESTS_TTL.as_secs())]
    pub pulls_ttl: u64,

    /// Seconds between freshness checks
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub poll: u64,

    /// Cache directory (also via ORGDASH_CACHE_DIR)
    #[arg(long = "cache-dir", env = "ORGDASH_CACHE_DIR", value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Enable the pull request admin tab
    #[arg(long)]
    pub admin: bool,

    /// Print the repository summary to stdout instead of starting the TUI
    #[arg(long)]
    pub print: bool,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub org: String,
    pub token: String,
    pub api_url: String,
    pub repos_ttl: Duration,
    pub pulls_ttl: Duration,
    pub poll_interval: Duration,
    pub cache_dir: PathBuf,
    pub admin: bool,
    pub print: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let org = cli.org.trim().to_string();
        if org.is_empty() || org.contains('/') {
            return Err(DashError::InvalidConfig(format!(
                "'{}' is not an organization login",
                cli.org
            )));
        }

        let token = cli
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(DashError::MissingToken)?;

        if cli.poll == 0 {
            return Err(DashError::InvalidConfig(
                "--poll must be at least 1 second".to_string(),
            ));
        }

        let cache_dir = cli
            .cache_dir
            .or_else(paths::cache_dir)
            .ok_or_else(|| DashError::InvalidConfig("no cache directory available".to_string()))?;

        Ok(Self {
            org,
            token,
            api_url: cli.api_url,
            repos_ttl: Duration::from_secs(cli.repos_ttl),
            pulls_ttl: Duration::from_secs(cli.pulls_ttl),
            poll_interval: Duration::from_secs(cli.poll),
            cache_dir,
            admin: cli.admin,
            print: cli.print,
        })
    }

    pub fn repositories_cache(&self) -> FreshnessCache {
        FreshnessCache::new(
            paths::repositories_path(&self.cache_dir, &self.org),
            self.repos_ttl,
        )
    }

    pub fn pull_requests_cache(&self) -> FreshnessCache {
        FreshnessCache::new(
            paths::pull_requests_path(&self.cache_dir, &self.org),
            self.pulls_ttl,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["orgdash", "acme", "--token", "t", "--cache-dir", "/tmp/c"]);
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.org, "acme");
        assert_eq!(config.api_url, GITHUB_API_BASE);
        assert_eq!(config.repos_ttl, REPOSITORIES_TTL);
        assert_eq!(config.pulls_ttl, PULL_REQUESTS_TTL);
        assert!(config.pulls_ttl < config.repos_ttl);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(!config.admin);
        assert!(!config.print);
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&[
            "orgdash",
            "acme",
            "--token",
            "t",
            "--repos-ttl",
            "30",
            "--pulls-ttl",
            "5",
            "--poll",
            "2",
            "--cache-dir",
            "/tmp/c",
            "--admin",
            "--print",
        ]);
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.repos_ttl, Duration::from_secs(30));
        assert_eq!(config.pulls_ttl, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert!(config.admin);
        assert!(config.print);
        assert_eq!(config.repositories_cache().ttl(), Duration::from_secs(30));
        assert_eq!(config.pull_requests_cache().ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_cache_slots_live_under_org_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cache_dir = temp_dir.path().to_str().unwrap();
        let cli = parse(&["orgdash", "acme", "--token", "t", "--cache-dir", cache_dir]);
        let config = Config::from_cli(cli).unwrap();

        config
            .repositories_cache()
            .store(Vec::<u32>::new(), chrono::Utc::now());
        config
            .pull_requests_cache()
            .store(Vec::<u32>::new(), chrono::Utc::now());

        let org_dir = temp_dir.path().join("orgs").join("acme");
        assert!(org_dir.join("repositories.json").exists());
        assert!(org_dir.join("pull_requests.json").exists());
    }

    #[test]
    fn test_org_is_required() {
        assert!(Cli::try_parse_from(["orgdash"]).is_err());
    }

    #[test]
    fn test_rejects_owner_repo_form() {
        let cli = parse(&["orgdash", "acme/widgets", "--token", "t", "--cache-dir", "/c"]);
        assert!(matches!(
            Config::from_cli(cli),
            Err(DashError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_blank_token_is_missing() {
        let cli = parse(&["orgdash", "acme", "--token", " ", "--cache-dir", "/c"]);
        assert!(matches!(Config::from_cli(cli), Err(DashError::MissingToken)));
    }

    #[test]
    fn test_zero_poll_rejected() {
        let cli = parse(&[
            "orgdash",
            "acme",
            "--token",
            "t",
            "--poll",
            "0",
            "--cache-dir",
            "/c",
        ]);
        assert!(matches!(
            Config::from_cli(cli),
            Err(DashError::InvalidConfig(_))
        ));
    }
}
