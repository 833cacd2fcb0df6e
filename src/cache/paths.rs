// Cache path utilities.
// Constructs filesystem paths for the per-organization cache slots.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/orgdash on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgdash").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the log file written while the TUI owns the terminal.
pub fn log_path(base: &Path) -> PathBuf {
    base.join("orgdash.log")
}

/// Path to an organization's directory.
pub fn org_dir(base: &Path, org: &str) -> PathBuf {
    base.join("orgs").join(sanitize_name(org))
}

/// Path to the cached repository list of an organization.
pub fn repositories_path(base: &Path, org: &str) -> PathBuf {
    org_dir(base, org).join("repositories.json")
}

/// Path to the cached open pull request list of an organization.
pub fn pull_requests_path(base: &Path, org: &str) -> PathBuf {
    org_dir(base, org).join("pull_requests.json")
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple"), "simple");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name("../escape"), ".._escape");
    }

    #[test]
    fn test_slot_paths() {
        let base = Path::new("/tmp/orgdash");

        assert!(repositories_path(base, "acme").ends_with("orgs/acme/repositories.json"));
        assert!(pull_requests_path(base, "acme").ends_with("orgs/acme/pull_requests.json"));
        assert_ne!(repositories_path(base, "acme"), repositories_path(base, "other"));
    }
}
