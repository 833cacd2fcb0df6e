// GitHub API endpoint functions.
// Provides typed methods for the repository, commit, readme, and pull request endpoints.

use serde_json::json;
use tracing::debug;

use crate::error::{DashError, Result};
use crate::model::LanguageBytes;

use super::client::GitHubClient;
use super::types::{CommitInfo, PullRequestInfo, RepositoryInfo};

/// Page size used for every paginated listing.
pub const PER_PAGE: u32 = 100;

/// Upper bound on pages fetched from one listing.
const MAX_PAGES: u32 = 50;

impl GitHubClient {
    /// Get one page of repositories for an organization.
    pub async fn get_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepositoryInfo>> {
        let params = [
            ("type", "all"),
            ("sort", "updated"),
            ("direction", "desc"),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ];
        self.get_json_with_params(&format!("/orgs/{}/repos", org), &params)
            .await
    }

    /// Get every repository of an organization, following pages until a short one.
    pub async fn get_all_org_repos(&self, org: &str) -> Result<Vec<RepositoryInfo>> {
        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch = self.get_org_repos(org, page, PER_PAGE).await?;
            let len = batch.len();
            repos.extend(batch);
            debug!(org, page, len, "fetched repository page");
            if len < PER_PAGE as usize {
                break;
            }
        }
        Ok(repos)
    }

    /// Get the language byte counts of a repository.
    pub async fn get_languages(&self, owner: &str, repo: &str) -> Result<LanguageBytes> {
        self.get_json(&format!("/repos/{}/{}/languages", owner, repo))
            .await
    }

    /// Get the most recent commit on the default branch, if any.
    pub async fn get_latest_commit(&self, owner: &str, repo: &str) -> Result<Option<CommitInfo>> {
        let params = [("per_page", "1")];
        let result: Result<Vec<CommitInfo>> = self
            .get_json_with_params(&format!("/repos/{}/{}/commits", owner, repo), &params)
            .await;
        match result {
            Ok(commits) => Ok(commits.into_iter().next()),
            // GitHub answers 409 for the commits of an empty repository.
            Err(DashError::NotFound(_) | DashError::Conflict(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get the raw README of a repository, if it has one.
    pub async fn get_readme(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        match self
            .get_raw(&format!("/repos/{}/{}/readme", owner, repo))
            .await
        {
            Ok(text) => Ok(Some(text)),
            Err(DashError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get one page of open pull requests for a repository.
    pub async fn get_open_pulls(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestInfo>> {
        let params = [
            ("state", "open"),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ];
        self.get_json_with_params(&format!("/repos/{}/{}/pulls", owner, repo), &params)
            .await
    }

    /// Get every open pull request of a repository.
    pub async fn get_all_open_pulls(&self, owner: &str, repo: &str) -> Result<Vec<PullRequestInfo>> {
        let mut pulls = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch = self.get_open_pulls(owner, repo, page, PER_PAGE).await?;
            let len = batch.len();
            pulls.extend(batch);
            if len < PER_PAGE as usize {
                break;
            }
        }
        Ok(pulls)
    }

    /// Close a pull request. Closing an already closed one is accepted by GitHub.
    pub async fn close_pull(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestInfo> {
        self.patch_json(
            &format!("/repos/{}/{}/pulls/{}", owner, repo, number),
            &json!({ "state": "closed" }),
        )
        .await
    }
}
