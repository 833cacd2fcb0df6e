// GitHub API response types.
// Defines structs for deserializing GitHub REST API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user or organization account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Repository as returned by the organization listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Entry of the commit listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitDetail,
    /// GitHub account linked to the commit author, if any.
    pub author: Option<Owner>,
}

/// Git-level commit data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<GitSignature>,
}

/// Git author or committer signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSignature {
    pub name: String,
    pub date: DateTime<Utc>,
}

/// Pull request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullState {
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

/// Pull request as returned by the pulls endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: PullState,
    pub user: Option<Owner>,
    pub created_at: DateTime<Utc>,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_info_without_linked_account() {
        let json = r#"{
            "sha": "abc123",
            "html_url": "https://github.com/acme/widgets/commit/abc123",
            "commit": {
                "message": "Fix build",
                "author": { "name": "Dana", "email": "d@example.com", "date": "2024-03-01T12:00:00Z" }
            },
            "author": null
        }"#;

        let info: CommitInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.sha, "abc123");
        assert!(info.author.is_none());
        assert_eq!(info.commit.author.unwrap().name, "Dana");
    }

    #[test]
    fn test_unknown_pull_state() {
        let state: PullState = serde_json::from_str(r#""merged""#).unwrap();
        assert_eq!(state, PullState::Unknown);
    }
}
