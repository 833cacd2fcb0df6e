// Language share rendering.
// Horizontal bars for the organization summary and a stacked strip per repository.

use ratatui::{prelude::*, widgets::*};

use crate::model::LanguageStat;

use super::list::render_empty;

/// Parse a `#rrggbb` color, falling back to gray.
pub fn hex_color(hex: &str) -> Color {
    let parsed = hex
        .strip_prefix('#')
        .filter(|h| h.len() == 6)
        .and_then(|h| u32::from_str_radix(h, 16).ok());
    match parsed {
        Some(rgb) => Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
        None => Color::Gray,
    }
}

/// One stacked strip of `width` cells split by share.
pub fn share_strip(shares: &[LanguageStat], width: u16) -> Line<'static> {
    let spans: Vec<Span> = shares
        .iter()
        .map(|stat| {
            let cells = (width as usize * stat.percentage as usize) / 100;
            Span::styled("█".repeat(cells), Style::default().fg(hex_color(stat.color)))
        })
        .collect();
    Line::from(spans)
}

/// Legend line such as "● Rust 80%  ● Shell 20%".
pub fn share_legend(shares: &[LanguageStat]) -> Line<'static> {
    let mut spans = Vec::new();
    for stat in shares {
        spans.push(Span::styled("● ", Style::default().fg(hex_color(stat.color))));
        spans.push(Span::raw(format!("{} {}%  ", stat.name, stat.percentage)));
    }
    Line::from(spans)
}

/// Render the organization-wide language summary.
pub fn render_languages(frame: &mut Frame, stats: &[LanguageStat], loading: bool, area: Rect) {
    let title = if loading {
        " Languages ⟳ "
    } else {
        " Languages "
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if stats.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(frame, inner, "No language data");
        return;
    }

    let name_width = stats.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    // Name, a space, and the trailing " 100%" leave the rest for the bar.
    let bar_width = area
        .width
        .saturating_sub(2)
        .saturating_sub(name_width as u16 + 7);

    let mut sorted: Vec<&LanguageStat> = stats.iter().collect();
    sorted.sort_by(|a, b| b.percentage.cmp(&a.percentage));

    let lines: Vec<Line> = sorted
        .iter()
        .map(|stat| {
            let cells = (bar_width as usize * stat.percentage as usize) / 100;
            Line::from(vec![
                Span::raw(format!("{:<width$} ", stat.name, width = name_width)),
                Span::styled("█".repeat(cells), Style::default().fg(hex_color(stat.color))),
                Span::styled(
                    format!(" {:>3}%", stat.percentage),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(name: &str, percentage: u8, color: &'static str) -> LanguageStat {
        LanguageStat {
            name: name.to_string(),
            percentage,
            color,
        }
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#dea584"), Color::Rgb(0xde, 0xa5, 0x84));
        assert_eq!(hex_color("dea584"), Color::Gray);
        assert_eq!(hex_color("#xyz"), Color::Gray);
    }

    #[test]
    fn test_share_strip_widths() {
        let shares = vec![stat("A", 75, "#ffffff"), stat("B", 25, "#000000")];
        let line = share_strip(&shares, 40);

        let widths: Vec<usize> = line.spans.iter().map(|s| s.content.chars().count()).collect();
        assert_eq!(widths, vec![30, 10]);
    }

    #[test]
    fn test_share_legend() {
        let shares = vec![stat("Rust", 100, "#dea584")];
        let text: String = share_legend(&shares)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "● Rust 100%  ");
    }
}
