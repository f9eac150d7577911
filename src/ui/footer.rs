use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::time::Duration;

use super::theme;

pub fn render(frame: &mut Frame, area: Rect, sampling: bool, period: Duration) {
    let hints = vec![
        Span::styled(" q", theme::key_hint_style()),
        Span::styled(" quit  ", theme::label_style()),
        Span::styled("?", theme::key_hint_style()),
        Span::styled(" help", theme::label_style()),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(24)])
        .split(area);

    let line = Line::from(hints);
    frame.render_widget(Paragraph::new(line).style(theme::footer_style()), chunks[0]);

    let period_ms = period.as_millis();
    let period_text = if period_ms >= 1000 {
        format!("{:.1}s ", period_ms as f64 / 1000.0)
    } else {
        format!("{period_ms}ms ")
    };
    let state = if sampling { "sampling " } else { "idle " };
    let status_line = Line::from(vec![
        Span::styled(state, theme::value_style()),
        Span::styled("every ", theme::label_style()),
        Span::styled(period_text, theme::value_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line)
            .alignment(Alignment::Right)
            .style(theme::footer_style()),
        chunks[1],
    );
}
