//! orgdash: terminal dashboard for a GitHub organization.
//!
//! Repositories with language breakdown, latest commit and README excerpt,
//! an organization-wide language summary, and an admin view for closing
//! open pull requests. Fetched data is kept in TTL-checked cache slots.

pub mod aggregate;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod github;
pub mod model;
pub mod refresh;
pub mod report;
pub mod state;
pub mod ui;
