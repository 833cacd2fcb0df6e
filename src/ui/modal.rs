// Modal UI components.
// Confirmation dialog shown before closing a pull request.

use ratatui::{prelude::*, widgets::*};

use crate::app::PendingClose;

/// Draw the close confirmation modal on top of the current view.
pub fn draw_close_modal(frame: &mut Frame, pending: &PendingClose) {
    let area = frame.area();

    // Create centered modal
    let modal_width = 60u16.min(area.width);
    let modal_height = 7u16.min(area.height);
    let modal_x = (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = (area.height.saturating_sub(modal_height)) / 2;

    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let text = vec![
        Line::from(vec![
            Span::raw("Close "),
            Span::styled(
                format!("{}#{}", pending.repo, pending.number),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(Span::styled(
            pending.title.clone(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(Color::Yellow)),
            Span::styled(" = Close  ", Style::default().fg(Color::DarkGray)),
            Span::styled("n/Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" = Cancel ", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let modal = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Close Pull Request "),
        );
    frame.render_widget(modal, modal_area);
}
