// Freshness cache for fetched dashboard data.
// One JSON slot per data set, stamped with its capture time and checked against a TTL.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::{DashError, Result};

/// Default TTL for the repository list: 10 minutes.
pub const REPOSITORIES_TTL: Duration = Duration::from_secs(10 * 60);

/// Default TTL for the open pull request list: 2 minutes.
pub const PULL_REQUESTS_TTL: Duration = Duration::from_secs(2 * 60);

/// Cached payload together with the time it was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub payload: T,
    /// When the data was fetched.
    pub captured_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, captured_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            captured_at,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        is_fresh(self.captured_at, now, ttl)
    }
}

/// True iff `now - captured_at < ttl`. A capture time in the future counts as age zero.
pub fn is_fresh(captured_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let age = now
        .signed_duration_since(captured_at)
        .to_std()
        .unwrap_or(Duration::ZERO);
    age < ttl
}

/// A single cache slot on disk with its own TTL.
#[derive(Debug, Clone)]
pub struct FreshnessCache {
    path: PathBuf,
    ttl: Duration,
}

impl FreshnessCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load the slot. Missing, unreadable, or corrupt slots are a cache miss.
    pub fn load<T: DeserializeOwned>(&self) -> Option<CacheEntry<T>> {
        match read_entry(&self.path) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unusable cache entry");
                None
            }
        }
    }

    /// Load the slot only if it is younger than the TTL at `now`.
    pub fn load_fresh<T: DeserializeOwned>(&self, now: DateTime<Utc>) -> Option<CacheEntry<T>> {
        self.load()
            .filter(|entry: &CacheEntry<T>| entry.is_fresh(now, self.ttl))
    }

    /// Check whether the slot currently holds fresh data.
    pub fn is_slot_fresh(&self, now: DateTime<Utc>) -> bool {
        self.load::<serde_json::Value>()
            .is_some_and(|entry| entry.is_fresh(now, self.ttl))
    }

    /// Replace the slot with `payload` captured at `now`.
    ///
    /// A failed write is logged; the returned entry is valid either way.
    pub fn store<T: Serialize>(&self, payload: T, now: DateTime<Utc>) -> CacheEntry<T> {
        let entry = CacheEntry::new(payload, now);
        if let Err(e) = write_entry(&self.path, &entry) {
            warn!(path = %self.path.display(), error = %e, "failed to write cache entry");
        }
        entry
    }

    /// Delete the slot.
    pub fn invalidate(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn read_entry<T: DeserializeOwned>(path: &Path) -> Result<Option<CacheEntry<T>>> {
    if !path.exists() {
        debug!(path = %path.display(), "cache miss");
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let entry: CacheEntry<T> =
        serde_json::from_str(&contents).map_err(|e| DashError::Malformed(e.to_string()))?;
    Ok(Some(entry))
}

fn write_entry<T: Serialize>(path: &Path, entry: &CacheEntry<T>) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
