use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::theme;
use crate::app::SessionInfo;
use crate::util::{format_elapsed, format_percent};

pub fn render(frame: &mut Frame, area: Rect, info: &SessionInfo, hostname: &str, elapsed_secs: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    // Top line: app name + hostname + session time + zone
    let info_line = Line::from(vec![
        Span::styled(" energymon ", theme::title_style()),
        Span::styled(format!("  {hostname}"), theme::value_style()),
        Span::styled(format!("  running {}", format_elapsed(elapsed_secs)), theme::label_style()),
        Span::styled("  zone ", theme::label_style()),
        Span::styled(info.zone.clone(), theme::value_style()),
    ]);
    frame.render_widget(
        Paragraph::new(info_line).style(theme::header_style()),
        chunks[0],
    );

    // Grid and CPU line
    let fossil = info
        .fossil_percentage
        .map(format_percent)
        .unwrap_or_else(|| "n/a".to_string());
    let grid_line = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:.0} {}", info.carbon_intensity, info.intensity_unit),
            theme::intensity_style(info.carbon_intensity),
        ),
        Span::styled("  fossil ", theme::label_style()),
        Span::styled(fossil, theme::value_style()),
        Span::styled("  cpu ", theme::label_style()),
        Span::styled(info.cpu_name.clone(), theme::value_style()),
        Span::styled(format!("  TDP {} W", info.cpu_tdp_watts), theme::label_style()),
    ]);
    frame.render_widget(
        Paragraph::new(grid_line).style(theme::header_style()),
        chunks[1],
    );
}
