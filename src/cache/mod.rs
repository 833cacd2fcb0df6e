// Cache module for local filesystem caching.
// Keeps the last fetched repository and pull request lists with their capture time.

pub mod paths;
pub mod store;

pub use store::{CacheEntry, FreshnessCache, PULL_REQUESTS_TTL, REPOSITORIES_TTL, is_fresh};
