// Builds dashboard snapshots from the GitHub API.
// Lists repositories and fans out the per-repository language, commit, and README fetches.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::error::{DashError, Result};
use crate::github::{CommitInfo, GitHubClient, PullState, RepositoryInfo};
use crate::model::{Commit, LanguageBytes, PullRequest, Repository};

/// Repositories whose auxiliary fetches run at the same time.
const CONCURRENT_REPOS: usize = 8;

/// Maximum README excerpt length in characters.
pub const EXCERPT_CHARS: usize = 200;

/// Fetch every repository of `org` with its languages, latest commit, and README excerpt.
///
/// Listing failures abort. Auxiliary failures leave the corresponding field empty.
pub async fn fetch_repositories(client: &GitHubClient, org: &str) -> Result<Vec<Repository>> {
    let infos = client.get_all_org_repos(org).await?;
    info!(org, count = infos.len(), "listed repositories");

    let repos: Vec<Repository> = stream::iter(infos)
        .map(|info| complete_repository(client, org, info))
        .buffered(CONCURRENT_REPOS)
        .collect()
        .await;
    Ok(repos)
}

async fn complete_repository(client: &GitHubClient, org: &str, info: RepositoryInfo) -> Repository {
    let name = info.name.as_str();
    let (languages, commit, readme) = tokio::join!(
        client.get_languages(org, name),
        client.get_latest_commit(org, name),
        client.get_readme(org, name),
    );

    let languages = languages.unwrap_or_else(|e| {
        warn!(repo = name, error = %e, "failed to fetch languages");
        LanguageBytes::new()
    });
    let last_commit = commit
        .unwrap_or_else(|e| {
            warn!(repo = name, error = %e, "failed to fetch latest commit");
            None
        })
        .map(to_commit);
    let readme_excerpt = readme
        .unwrap_or_else(|e| {
            warn!(repo = name, error = %e, "failed to fetch README");
            None
        })
        .and_then(|text| readme_excerpt(&text));

    Repository {
        readme_url: format!("{}#readme", info.html_url),
        url: info.html_url,
        name: info.name,
        description: info.description.filter(|d| !d.trim().is_empty()),
        languages,
        last_commit,
        readme_excerpt,
        stars: info.stargazers_count,
        updated_at: info.updated_at,
    }
}

fn to_commit(info: CommitInfo) -> Commit {
    let (git_author, date) = match info.commit.author {
        Some(sig) => (Some(sig.name), sig.date),
        None => (None, DateTime::<Utc>::UNIX_EPOCH),
    };
    let author = info
        .author
        .map(|owner| owner.login)
        .or(git_author)
        .unwrap_or_else(|| "unknown".to_string());

    Commit {
        message: info.commit.message,
        author,
        date,
        sha: info.sha,
        url: info.html_url,
    }
}

/// First prose paragraph of a README, collapsed to one line and truncated.
pub fn readme_excerpt(text: &str) -> Option<String> {
    let mut words: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        // An underline right below paragraph text turns that text into a heading.
        if is_setext_underline(line) && !words.is_empty() {
            words.clear();
            continue;
        }

        let is_prose = !line.is_empty()
            && !line.starts_with('#')
            && !line.starts_with('<')
            && !line.starts_with("![")
            && !line.starts_with("[![")
            && !line.starts_with("```")
            && !line.starts_with("---")
            && !line.starts_with("===");

        if is_prose {
            words.extend(line.split_whitespace());
        } else if !words.is_empty() {
            break;
        }
    }

    if words.is_empty() {
        return None;
    }

    let paragraph = words.join(" ");
    match paragraph.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => Some(format!("{}…", paragraph[..cut].trim_end())),
        None => Some(paragraph),
    }
}

fn is_setext_underline(line: &str) -> bool {
    !line.is_empty() && (line.chars().all(|c| c == '=') || line.chars().all(|c| c == '-'))
}

/// Fetch the open pull requests of every repository in `org`, newest first.
///
/// Any failure aborts the whole listing.
pub async fn fetch_pull_requests(client: &GitHubClient, org: &str) -> Result<Vec<PullRequest>> {
    let repos = client.get_all_org_repos(org).await?;

    let per_repo: Vec<Vec<PullRequest>> = stream::iter(repos)
        .map(|repo| async move {
            let pulls = client.get_all_open_pulls(org, &repo.name).await?;
            Ok::<_, DashError>(
                pulls
                    .into_iter()
                    .map(|pr| PullRequest {
                        repo: repo.name.clone(),
                        number: pr.number,
                        title: pr.title,
                        author: pr.user.map(|u| u.login).unwrap_or_else(|| "ghost".to_string()),
                        url: pr.html_url,
                        created_at: pr.created_at,
                        state: pr.state,
                    })
                    .collect(),
            )
        })
        .buffered(CONCURRENT_REPOS)
        .try_collect()
        .await?;

    let mut pulls: Vec<PullRequest> = per_repo.into_iter().flatten().collect();
    pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    info!(org, count = pulls.len(), "listed open pull requests");
    Ok(pulls)
}

/// Close a pull request and report the state GitHub returned.
pub async fn close_pull_request(
    client: &GitHubClient,
    org: &str,
    repo: &str,
    number: u64,
) -> Result<PullState> {
    let pr = client.close_pull(org, repo, number).await?;
    info!(org, repo, number, state = ?pr.state, "closed pull request");
    Ok(pr.state)
}

/// Drop a pull request from a displayed list. Unknown entries are ignored.
pub fn remove_pull_request(pulls: &[PullRequest], repo: &str, number: u64) -> Vec<PullRequest> {
    pulls
        .iter()
        .filter(|pr| !(pr.repo == repo && pr.number == number))
        .cloned()
        .collect()
}
