// Background refresh of the cached data sets.
// Fetches run on the tokio runtime, write the cache, and report back over a channel.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::cache::{CacheEntry, FreshnessCache};
use crate::error::{DashError, Result};
use crate::fetch;
use crate::github::{GitHubClient, PullState};
use crate::model::{PullRequest, Repository};

/// Result of a background operation, applied on the UI thread.
#[derive(Debug)]
pub enum FetchMessage {
    Repositories(Result<CacheEntry<Vec<Repository>>>),
    PullRequests(Result<CacheEntry<Vec<PullRequest>>>),
    PullClosed {
        repo: String,
        number: u64,
        result: Result<PullState>,
    },
}

/// Spawns fetches and owns the two cache slots.
pub struct Refresher {
    client: Arc<GitHubClient>,
    org: String,
    repos_cache: FreshnessCache,
    pulls_cache: FreshnessCache,
    runtime: Handle,
    tx: UnboundedSender<FetchMessage>,
}

impl Refresher {
    pub fn new(
        client: Arc<GitHubClient>,
        org: impl Into<String>,
        repos_cache: FreshnessCache,
        pulls_cache: FreshnessCache,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<FetchMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let refresher = Self {
            client,
            org: org.into(),
            repos_cache,
            pulls_cache,
            runtime,
            tx,
        };
        (refresher, rx)
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub fn repos_cache(&self) -> &FreshnessCache {
        &self.repos_cache
    }

    pub fn pulls_cache(&self) -> &FreshnessCache {
        &self.pulls_cache
    }

    /// Fetch the repository list and replace its cache slot on success.
    pub fn refresh_repositories(&self) {
        let client = Arc::clone(&self.client);
        let org = self.org.clone();
        let cache = self.repos_cache.clone();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = match fetch::fetch_repositories(&client, &org).await {
                Ok(repos) => store_blocking(cache, repos).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(org = %org, error = %e, "repository refresh failed");
            }
            let _ = tx.send(FetchMessage::Repositories(result));
        });
    }

    /// Fetch the open pull requests and replace their cache slot on success.
    pub fn refresh_pull_requests(&self) {
        let client = Arc::clone(&self.client);
        let org = self.org.clone();
        let cache = self.pulls_cache.clone();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = match fetch::fetch_pull_requests(&client, &org).await {
                Ok(pulls) => store_blocking(cache, pulls).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(org = %org, error = %e, "pull request refresh failed");
            }
            let _ = tx.send(FetchMessage::PullRequests(result));
        });
    }

    /// Close a pull request in the background.
    pub fn close_pull_request(&self, repo: &str, number: u64) {
        let client = Arc::clone(&self.client);
        let org = self.org.clone();
        let repo = repo.to_string();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let result = fetch::close_pull_request(&client, &org, &repo, number).await;
            let _ = tx.send(FetchMessage::PullClosed {
                repo,
                number,
                result,
            });
        });
    }
}

/// Write a cache slot on the blocking pool, stamped with the current time.
pub async fn store_blocking<T>(cache: FreshnessCache, payload: T) -> Result<CacheEntry<T>>
where
    T: Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || cache.store(payload, Utc::now()))
        .await
        .map_err(|e| DashError::Other(format!("cache write task failed: {}", e)))
}

/// Use the cached repository list if fresh, otherwise fetch and store it.
///
/// If the fetch fails and a stale entry exists, the stale entry is returned.
pub async fn load_or_fetch_repositories(
    client: &GitHubClient,
    cache: &FreshnessCache,
    org: &str,
) -> Result<CacheEntry<Vec<Repository>>> {
    let now = Utc::now();
    if let Some(entry) = cache.load_fresh(now) {
        info!(org, "using cached repositories");
        return Ok(entry);
    }

    match fetch::fetch_repositories(client, org).await {
        Ok(repos) => store_blocking(cache.clone(), repos).await,
        Err(e) => match cache.load() {
            Some(stale) => {
                warn!(org, error = %e, "refresh failed, using stale cache");
                Ok(stale)
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    use super::*;

    fn repository(name: &str) -> Repository {
        Repository {
            name: name.to_string(),
            url: format!("https://github.com/acme/{}", name),
            readme_url: format!("https://github.com/acme/{}#readme", name),
            description: None,
            languages: Default::default(),
            last_commit: None,
            readme_excerpt: None,
            stars: 0,
            updated_at: None,
        }
    }

    async fn mock_empty_org(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", "/orgs/acme/repos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/orgs/acme/repos")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        let cache = FreshnessCache::new(temp_dir.path().join("r.json"), Duration::from_secs(60));
        cache.store(vec![repository("cached")], Utc::now());

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let entry = load_or_fetch_repositories(&client, &cache, "acme")
            .await
            .unwrap();

        listing.assert_async().await;
        assert_eq!(entry.payload[0].name, "cached");
    }

    #[tokio::test]
    async fn test_stale_cache_is_refetched() {
        let mut server = Server::new_async().await;
        let listing = mock_empty_org(&mut server).await;
        let temp_dir = TempDir::new().unwrap();
        let cache = FreshnessCache::new(temp_dir.path().join("r.json"), Duration::from_secs(60));
        cache.store(
            vec![repository("old")],
            Utc::now() - chrono::Duration::seconds(120),
        );

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let entry = load_or_fetch_repositories(&client, &cache, "acme")
            .await
            .unwrap();

        listing.assert_async().await;
        assert!(entry.payload.is_empty());
        assert!(cache.is_slot_fresh(Utc::now()));
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_stale_cache() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/orgs/acme/repos")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        let cache = FreshnessCache::new(temp_dir.path().join("r.json"), Duration::from_secs(60));
        cache.store(
            vec![repository("old")],
            Utc::now() - chrono::Duration::seconds(120),
        );

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let entry = load_or_fetch_repositories(&client, &cache, "acme")
            .await
            .unwrap();

        assert_eq!(entry.payload[0].name, "old");
    }

    #[tokio::test]
    async fn test_corrupt_cache_fetches_like_a_miss() {
        let mut server = Server::new_async().await;
        let listing = mock_empty_org(&mut server).await;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("r.json");
        std::fs::write(&path, "garbage").unwrap();
        let cache = FreshnessCache::new(&path, Duration::from_secs(60));

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let entry = load_or_fetch_repositories(&client, &cache, "acme")
            .await
            .unwrap();

        listing.assert_async().await;
        assert!(entry.payload.is_empty());
    }

    #[tokio::test]
    async fn test_store_blocking_writes_slot() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FreshnessCache::new(temp_dir.path().join("r.json"), Duration::from_secs(60));

        let entry = store_blocking(cache.clone(), vec![repository("fresh")])
            .await
            .unwrap();

        assert_eq!(entry.payload[0].name, "fresh");
        let loaded: CacheEntry<Vec<Repository>> = cache.load().unwrap();
        assert_eq!(loaded.payload[0].name, "fresh");
        assert_eq!(loaded.captured_at, entry.captured_at);
        assert!(cache.is_slot_fresh(Utc::now()));
    }

    #[tokio::test]
    async fn test_background_refresh_writes_cache_and_reports() {
        let mut server = Server::new_async().await;
        mock_empty_org(&mut server).await;
        let temp_dir = TempDir::new().unwrap();
        let repos_cache =
            FreshnessCache::new(temp_dir.path().join("r.json"), Duration::from_secs(60));
        let pulls_cache =
            FreshnessCache::new(temp_dir.path().join("p.json"), Duration::from_secs(60));
        let client = Arc::new(GitHubClient::with_base_url("t", &server.url()).unwrap());

        let (refresher, mut rx) = Refresher::new(
            client,
            "acme",
            repos_cache.clone(),
            pulls_cache.clone(),
            Handle::current(),
        );

        refresher.refresh_repositories();
        match rx.recv().await {
            Some(FetchMessage::Repositories(Ok(entry))) => assert!(entry.payload.is_empty()),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(repos_cache.is_slot_fresh(Utc::now()));

        refresher.refresh_pull_requests();
        match rx.recv().await {
            Some(FetchMessage::PullRequests(Ok(entry))) => assert!(entry.payload.is_empty()),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(pulls_cache.is_slot_fresh(Utc::now()));
    }

    #[tokio::test]
    async fn test_background_close_reports_error() {
        let mut server = Server::new_async().await;
        server
            .mock("PATCH", "/repos/acme/a/pulls/4")
            .with_status(404)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        let client = Arc::new(GitHubClient::with_base_url("t", &server.url()).unwrap());
        let (refresher, mut rx) = Refresher::new(
            client,
            "acme",
            FreshnessCache::new(temp_dir.path().join("r.json"), Duration::from_secs(60)),
            FreshnessCache::new(temp_dir.path().join("p.json"), Duration::from_secs(60)),
            Handle::current(),
        );

        refresher.close_pull_request("a", 4);

        match rx.recv().await {
            Some(FetchMessage::PullClosed {
                repo,
                number,
                result,
            }) => {
                assert_eq!(repo, "a");
                assert_eq!(number, 4);
                assert!(matches!(result, Err(DashError::NotFound(_))));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
