// UI module for rendering the TUI.
// Contains widgets for tabs, repository and pull request lists, language charts, and modals.

mod chart;
mod list;
mod modal;
mod tabs;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};
use crate::state::ConsoleLevel;

pub use list::format_relative_time;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Last activity
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    tabs::draw_tabs(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_activity_line(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    if let Some(pending) = &app.pending_close {
        modal::draw_close_modal(frame, pending);
    }

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the main content area based on active tab.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        Tab::Repositories => list::render_repositories(frame, &mut app.repositories, area),
        Tab::Languages => chart::render_languages(
            frame,
            &app.languages,
            app.repositories.state.is_loading(),
            area,
        ),
        Tab::PullRequests => list::render_pull_requests(frame, &mut app.pull_requests, area),
        Tab::Console => draw_console_tab(frame, app, area),
    }
}

/// Draw the Console tab with activity messages.
fn draw_console_tab(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Console ");

    if app.console.messages.is_empty() {
        let text = Paragraph::new("No messages")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
    } else {
        // Show newest messages first (reverse order)
        let items: Vec<ListItem> = app
            .console
            .messages
            .iter()
            .rev()
            .map(|msg| {
                let (icon, color) = level_style(msg.level);
                let time = list::format_relative_time(&msg.timestamp);

                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", icon)),
                    Span::styled(time, Style::default().fg(Color::DarkGray)),
                    Span::raw(" "),
                    Span::styled(msg.message.clone(), Style::default().fg(color)),
                ]))
            })
            .collect();

        let list_widget = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list_widget, area, &mut app.console.list_state);
    }
}

fn level_style(level: ConsoleLevel) -> (&'static str, Color) {
    match level {
        ConsoleLevel::Error => ("❌", Color::Red),
        ConsoleLevel::Warn => ("⚠️", Color::Yellow),
        ConsoleLevel::Info => ("ℹ️", Color::Cyan),
    }
}

/// Draw the latest console message and the age of the displayed data.
fn draw_activity_line(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    let captured_at = match app.active_tab {
        Tab::PullRequests => app.pull_requests.captured_at,
        _ => app.repositories.captured_at,
    };
    if let Some(captured_at) = captured_at {
        spans.push(Span::styled(
            format!(" Updated {} ", list::format_relative_time(&captured_at)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(msg) = app.console.last() {
        let (icon, color) = level_style(msg.level);
        spans.push(Span::styled(
            format!(" {} {}", icon, msg.message),
            Style::default().fg(color),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the status bar with keybinding hints and rate limit.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        Span::raw("  Tab "),
        Span::styled("Switch", Style::default().fg(Color::DarkGray)),
        Span::raw("  r "),
        Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
    ];
    if app.active_tab == Tab::PullRequests {
        hints.push(Span::raw("  c "));
        hints.push(Span::styled("Close PR", Style::default().fg(Color::DarkGray)));
    }
    hints.extend([
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ]);

    // Add rate limit info on the right once a response has been seen
    let rate = app.refresher().client().rate_limit();
    if rate.limit > 0 {
        let rate_color = if rate.remaining < 100 {
            Color::Red
        } else if rate.remaining < 500 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        hints.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 50u16.min(area.width);
    let popup_height = 15u16.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Navigate list"),
        key("  Tab/Shift-Tab ", "Switch tabs"),
        key("  r             ", "Refresh current data"),
        key("  c             ", "Close pull request (admin)"),
        key("  y/n           ", "Confirm / cancel close"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
