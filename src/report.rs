// Plain-text summary for --print mode.

use std::fmt::Write;

use crate::aggregate;
use crate::cache::CacheEntry;
use crate::model::Repository;
use crate::ui::format_relative_time;

/// One line per repository followed by the organization language summary.
pub fn render(org: &str, entry: &CacheEntry<Vec<Repository>>) -> String {
    let mut out = String::new();
    let repos = &entry.payload;

    let _ = writeln!(
        out,
        "{}: {} repositories (updated {})",
        org,
        repos.len(),
        format_relative_time(&entry.captured_at)
    );

    let name_width = repos.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for repo in repos {
        let top_language = aggregate::shares(&repo.languages)
            .into_iter()
            .max_by_key(|s| s.percentage)
            .map(|s| format!("{} {}%", s.name, s.percentage))
            .unwrap_or_else(|| "-".to_string());
        let commit = repo
            .last_commit
            .as_ref()
            .map(|c| format!("{} {}", c.short_sha(), c.summary()))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<width$}  ★{:<5} {:<18} {}",
            repo.name,
            repo.stars,
            top_language,
            commit,
            width = name_width
        );
    }

    let stats = aggregate::aggregate(repos);
    if !stats.is_empty() {
        let _ = writeln!(out, "\nLanguages:");
        for stat in stats {
            let _ = writeln!(out, "  {:>3}%  {}", stat.percentage, stat.name);
        }
    }
    out
}
