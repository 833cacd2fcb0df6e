// GitHub API HTTP client.
// Handles authentication, rate limiting, and request/response processing.

use std::sync::Mutex;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{DashError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// GitHub API client with authentication and rate limit tracking.
///
/// Shared between background fetch tasks, so all methods take `&self`.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token against api.github.com.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Create a client against a custom API base (GitHub Enterprise, tests).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| DashError::InvalidConfig(format!("token: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("orgdash"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Get the latest rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|rl| rl.clone())
            .unwrap_or_default()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.send(self.client.get(self.url(endpoint))).await?;
        decode(response).await
    }

    /// Make a GET request with query parameters and decode the JSON body.
    pub async fn get_json_with_params<T, P>(&self, endpoint: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: serde::Serialize + ?Sized,
    {
        let request = self.client.get(self.url(endpoint)).query(params);
        let response = self.send(request).await?;
        decode(response).await
    }

    /// Make a GET request asking for the raw file contents.
    pub async fn get_raw(&self, endpoint: &str) -> Result<String> {
        let request = self
            .client
            .get(self.url(endpoint))
            .header(ACCEPT, RAW_MEDIA_TYPE);
        let response = self.send(request).await?;
        Ok(response.text().await?)
    }

    /// Make a PATCH request with a JSON body and decode the JSON response.
    pub async fn patch_json<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let request = self.client.patch(self.url(endpoint)).json(body);
        let response = self.send(request).await?;
        decode(response).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "GitHub response");

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };
        if let Some(limit) = header_u64(response, "x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header_u64(response, "x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_u64(response, "x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(DashError::Unauthorized),
            StatusCode::NOT_FOUND => Err(DashError::NotFound(response.url().to_string())),
            StatusCode::CONFLICT => Err(DashError::Conflict(response.url().to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(rate_limited(&response)),
            StatusCode::FORBIDDEN => {
                if header_u64(&response, "x-ratelimit-remaining") == Some(0) {
                    Err(rate_limited(&response))
                } else {
                    Err(DashError::Other(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    )))
                }
            }
            status => Err(DashError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Rate limit error carrying the reset time from this response's own headers.
fn rate_limited(response: &Response) -> DashError {
    let reset_at = header_u64(response, "x-ratelimit-reset")
        .and_then(|reset| chrono::DateTime::from_timestamp(reset as i64, 0))
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    DashError::RateLimited { reset_at }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sends_bearer_token_and_api_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("authorization", "Bearer secret")
            .match_header("x-github-api-version", GITHUB_API_VERSION)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("secret", &server.url()).unwrap();
        let _: serde_json::Value = client.get_json("/ping").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_tracks_rate_limit_headers() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_header("x-ratelimit-limit", "5000")
            .with_header("x-ratelimit-remaining", "4321")
            .with_header("x-ratelimit-reset", "1700000000")
            .with_body("{}")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let _: serde_json::Value = client.get_json("/ping").await.unwrap();

        let rate = client.rate_limit();
        assert_eq!(rate.limit, 5000);
        assert_eq!(rate.remaining, 4321);
        assert_eq!(rate.reset, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(401)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("bad", &server.url()).unwrap();
        let result: Result<serde_json::Value> = client.get_json("/ping").await;

        assert!(matches!(result, Err(DashError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orgs/ghost/repos")
            .with_status(404)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let result: Result<serde_json::Value> = client.get_json("/orgs/ghost/repos").await;

        assert!(matches!(result, Err(DashError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_forbidden_with_exhausted_quota_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1700000000")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let result: Result<serde_json::Value> = client.get_json("/ping").await;

        assert!(matches!(result, Err(DashError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_forbidden_uses_own_quota_header_not_last_seen() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exhausted")
            .with_status(200)
            .with_header("x-ratelimit-remaining", "0")
            .with_body("{}")
            .create_async()
            .await;
        server
            .mock("GET", "/private")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "4999")
            .with_body("resource not accessible")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let _: serde_json::Value = client.get_json("/exhausted").await.unwrap();
        assert_eq!(client.rate_limit().remaining, 0);

        let result: Result<serde_json::Value> = client.get_json("/private").await;
        assert!(matches!(result, Err(DashError::Other(_))));
    }

    #[tokio::test]
    async fn test_conflict_is_not_reported_as_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orgs/acme/repos")
            .with_status(409)
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let result: Result<serde_json::Value> = client.get_json("/orgs/acme/repos").await;

        match result {
            Err(e @ DashError::Conflict(_)) => {
                assert_ne!(e.user_message(), "Organization or repository not found")
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forbidden_without_rate_limit_is_other() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(403)
            .with_body("nope")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url("t", &server.url()).unwrap();
        let result: Result<serde_json::Value> = client.get_json("/ping").await;

        match result {
            Err(DashError::Other(msg)) => assert!(msg.contains("nope")),
            other => panic!("expected Other, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Nothing listens on port 9 of localhost in the test environment.
        let client = GitHubClient::with_base_url("t", "http://127.0.0.1:9").unwrap();
        let result: Result<serde_json::Value> = client.get_json("/ping").await;

        assert!(matches!(result, Err(DashError::Unreachable(_))));
    }
}
