use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;

pub fn render(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 16, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        header_line("Keys"),
        key_line("?", "Toggle this help"),
        key_line("q / Esc / Ctrl+C", "Save the session and quit"),
        Line::raw(""),
        header_line("Chart"),
        Line::styled(
            "    Each point is the CO2 emitted during one sampling interval.",
            theme::label_style(),
        ),
        Line::styled(
            "    The window starts zero-filled; zeros before the first",
            theme::label_style(),
        ),
        Line::styled("    sample are not saved.", theme::label_style()),
        Line::raw(""),
        header_line("Totals"),
        key_line("session", "Sum over the visible window"),
        key_line("history", "Sum over saved sessions at startup"),
        key_line("skipped", "Ticks dropped while a sample was running"),
    ];

    let block = Block::default()
        .title(Line::styled(" Help ", theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .style(ratatui::style::Style::default().bg(theme::BASE));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

fn header_line(text: &str) -> Line<'_> {
    Line::from(Span::styled(format!("  {text}"), theme::title_style()))
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<20}"), theme::key_hint_style()),
        Span::styled(desc, theme::label_style()),
    ])
}

fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_pct) / 2),
            Constraint::Percentage(width_pct),
            Constraint::Percentage((100 - width_pct) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
