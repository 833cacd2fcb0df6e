// List rendering for repositories and pull requests.
// Provides styled list views with loading, error, and empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::aggregate;
use crate::model::{PullRequest, Repository};
use crate::state::{LoadingState, SelectableList};

use super::chart;

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render the placeholder for a list with no items, by loading state.
fn render_placeholder(frame: &mut Frame, area: Rect, state: &LoadingState, what: &str) {
    match state {
        LoadingState::Idle | LoadingState::Loading => {
            render_loading(frame, area, &format!("Loading {}", what))
        }
        LoadingState::Error(e) => render_error(frame, area, e),
        LoadingState::Loaded => render_empty(frame, area, &format!("No {} found", what)),
    }
}

/// Block title with item count and a marker while refreshing.
fn list_title<T>(name: &str, list: &SelectableList<T>) -> String {
    let marker = if list.state.is_loading() { " ⟳" } else { "" };
    format!(" {} ({}){} ", name, list.len(), marker)
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Render the repository list with a detail pane for the selection.
pub fn render_repositories(frame: &mut Frame, list: &mut SelectableList<Repository>, area: Rect) {
    if list.is_empty() {
        render_placeholder(frame, area, &list.state, "repositories");
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let items: Vec<ListItem> = list
        .items
        .iter()
        .map(|repo| {
            let updated = repo
                .updated_at
                .as_ref()
                .map(format_relative_time)
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(&repo.name, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("  ★{}  {}", repo.stars, updated),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(list_title("Repositories", list)),
        )
        .highlight_style(highlight())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, chunks[0], &mut list.list_state);

    if let Some(repo) = list.selected_item() {
        render_repository_detail(frame, repo, chunks[1]);
    }
}

fn render_repository_detail(frame: &mut Frame, repo: &Repository, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            repo.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(
            repo.description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
        ),
        Line::from(""),
    ];

    let shares = aggregate::shares(&repo.languages);
    if shares.is_empty() {
        lines.push(Line::from(Span::styled("No language data", label)));
    } else {
        lines.push(chart::share_strip(&shares, area.width.saturating_sub(2)));
        lines.push(chart::share_legend(&shares));
    }
    lines.push(Line::from(""));

    match &repo.last_commit {
        Some(commit) => {
            lines.push(Line::from(vec![
                Span::styled("Last commit  ", label),
                Span::styled(commit.short_sha(), Style::default().fg(Color::Yellow)),
                Span::raw(format!(" {}", commit.summary())),
            ]));
            lines.push(Line::from(vec![
                Span::styled("             ", label),
                Span::raw(format!(
                    "{} · {}",
                    commit.author,
                    format_relative_time(&commit.date)
                )),
            ]));
        }
        None => lines.push(Line::from(Span::styled("No commits", label))),
    }
    lines.push(Line::from(""));

    if let Some(excerpt) = &repo.readme_excerpt {
        lines.push(Line::from(Span::styled("README", label)));
        lines.push(Line::from(excerpt.clone()));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("URL     ", label),
        Span::raw(repo.url.clone()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("README  ", label),
        Span::raw(repo.readme_url.clone()),
    ]));

    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

/// Render the open pull request list.
pub fn render_pull_requests(frame: &mut Frame, list: &mut SelectableList<PullRequest>, area: Rect) {
    if list.is_empty() {
        render_placeholder(frame, area, &list.state, "open pull requests");
        return;
    }

    let items: Vec<ListItem> = list
        .items
        .iter()
        .map(|pr| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}#{} ", pr.repo, pr.number),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(pr.title.clone()),
                Span::styled(
                    format!("  {} · {}", pr.author, format_relative_time(&pr.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(list_title("Open Pull Requests", list)),
        )
        .highlight_style(highlight())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}
