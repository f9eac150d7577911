use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Gauge};
use ratatui::Frame;

use crate::ui::theme;
use crate::util::format_percent;

/// CPU utilization of the last sample; empty until the first one arrives.
pub fn render(frame: &mut Frame, area: Rect, title: &str, usage: Option<f64>) {
    let clamped = usage.unwrap_or(0.0).clamp(0.0, 100.0);
    let label = usage
        .map(format_percent)
        .unwrap_or_else(|| "waiting".to_string());

    let block = Block::default()
        .title(Line::styled(format!(" {title} "), theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style());

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(theme::gauge_style(clamped))
        .percent(clamped as u16)
        .label(label);

    frame.render_widget(gauge, area);
}
