// Organization-wide language summary.
// Merges per-repository byte counts into rounded percentage shares with display colors.

use crate::model::{LanguageBytes, LanguageStat, Repository};

/// Color for languages missing from the table.
pub const DEFAULT_COLOR: &str = "#8b8b8b";

const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("C", "#555555"),
    ("C#", "#178600"),
    ("C++", "#f34b7d"),
    ("CSS", "#563d7c"),
    ("Dart", "#00b4ab"),
    ("Dockerfile", "#384d54"),
    ("Elixir", "#6e4a7e"),
    ("Go", "#00add8"),
    ("HCL", "#844fba"),
    ("HTML", "#e34c26"),
    ("Haskell", "#5e5086"),
    ("Java", "#b07219"),
    ("JavaScript", "#f1e05a"),
    ("Jupyter Notebook", "#da5b0b"),
    ("Kotlin", "#a97bff"),
    ("Lua", "#000080"),
    ("Makefile", "#427819"),
    ("Nix", "#7e7eff"),
    ("PHP", "#4f5d95"),
    ("Python", "#3572a5"),
    ("Ruby", "#701516"),
    ("Rust", "#dea584"),
    ("SCSS", "#c6538c"),
    ("Scala", "#c22d40"),
    ("Shell", "#89e051"),
    ("Swift", "#f05138"),
    ("TypeScript", "#3178c6"),
    ("Vue", "#41b883"),
    ("Zig", "#ec915c"),
];

/// Display color of a language, gray if unknown.
pub fn language_color(name: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(lang, _)| *lang == name)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Percentage shares of a single byte-count map, in map order.
///
/// Each share is rounded on its own, so the sum may be off 100 by a point or two.
pub fn shares(languages: &LanguageBytes) -> Vec<LanguageStat> {
    let total = languages.total();
    if total == 0 {
        return Vec::new();
    }

    languages
        .iter()
        .map(|(name, bytes)| LanguageStat {
            name: name.to_string(),
            percentage: (100.0 * bytes as f64 / total as f64).round() as u8,
            color: language_color(name),
        })
        .collect()
}

/// Sum language bytes across repositories and compute each language's share.
///
/// Languages appear in order of first occurrence. An empty set yields no stats.
pub fn aggregate(repositories: &[Repository]) -> Vec<LanguageStat> {
    let mut totals = LanguageBytes::new();
    for repo in repositories {
        for (name, bytes) in repo.languages.iter() {
            totals.add(name, bytes);
        }
    }
    shares(&totals)
}
