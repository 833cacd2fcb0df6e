// Error types for orgdash.
// Classifies GitHub API failures, cache failures, and configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("GitHub API unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request conflicts with the current state of {0}")]
    Conflict(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Malformed cache entry: {0}")]
    Malformed(String),

    #[error("Missing GitHub token (pass --token or set GITHUB_TOKEN)")]
    MissingToken,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl DashError {
    /// Short message for the status line.
    pub fn user_message(&self) -> String {
        match self {
            DashError::Unreachable(_) => "GitHub is unreachable, showing cached data".to_string(),
            DashError::NotFound(_) => "Organization or repository not found".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
