use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::theme;
use super::widgets::usage_gauge;
use crate::metrics::TimeUnit;
use crate::util::format_grams;

pub struct Totals {
    pub last_sample: Option<f64>,
    pub last_usage: Option<f64>,
    pub session: f64,
    pub historical: f64,
    pub x_unit: TimeUnit,
    pub skipped_ticks: u64,
    pub failed_samples: u64,
}

pub fn render(frame: &mut Frame, area: Rect, totals: &Totals) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(area);

    usage_gauge::render(frame, chunks[0], "CPU", totals.last_usage);

    let last = totals
        .last_sample
        .map(format_grams)
        .unwrap_or_else(|| "-".to_string());
    let mut spans = vec![
        Span::styled(" last ", theme::label_style()),
        Span::styled(last, theme::value_style()),
        Span::styled("  session ", theme::label_style()),
        Span::styled(format_grams(totals.session), theme::value_style()),
        Span::styled("  history ", theme::label_style()),
        Span::styled(format_grams(totals.historical), theme::value_style()),
        Span::styled(format!("  per {}", totals.x_unit.letter()), theme::label_style()),
        Span::styled("  skipped ", theme::label_style()),
        Span::styled(totals.skipped_ticks.to_string(), theme::value_style()),
    ];
    if totals.failed_samples > 0 {
        spans.push(Span::styled("  failed ", theme::label_style()));
        spans.push(Span::styled(
            totals.failed_samples.to_string(),
            ratatui::style::Style::default().fg(theme::RED),
        ));
    }

    let block = Block::default()
        .title(Line::styled(" Totals ", theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[1]);
}
