use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};
use ratatui::Frame;

use crate::ui::theme;
use crate::util::format_grams;

/// Smallest y range drawn, so an idle series still shows a flat line.
const MIN_Y_SPAN: f64 = 1e-6;

pub struct ChartStyle {
    pub line: Color,
    pub axis: Color,
    pub text: Color,
    pub marker: Marker,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    points: &[(f64, f64)],
    x_labels: Vec<String>,
    x_title: String,
    style: &ChartStyle,
) {
    let max = points.iter().map(|&(_, y)| y).fold(0.0_f64, f64::max);
    let [y_min, y_max] = y_bounds(max);
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let dataset = Dataset::default()
        .marker(style.marker)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(style.line))
        .data(points);

    let axis_style = Style::default().fg(style.axis);
    let text_style = Style::default().fg(style.text);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(Line::styled(format!(" {title} "), theme::title_style()))
                .borders(Borders::ALL)
                .border_style(theme::border_style()),
        )
        .x_axis(
            Axis::default()
                .title(Line::styled(x_title, text_style))
                .style(axis_style)
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Line::styled("CO2", text_style))
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels(y_labels(y_max)),
        );

    frame.render_widget(chart, area);
}

/// Y range with a tenth of headroom above the highest point.
pub fn y_bounds(max: f64) -> [f64; 2] {
    [0.0, (max * 1.1).max(MIN_Y_SPAN)]
}

fn y_labels(y_max: f64) -> Vec<String> {
    [0.0, y_max / 2.0, y_max]
        .into_iter()
        .map(format_grams)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_series_still_has_a_y_range() {
        assert_eq!(y_bounds(0.0), [0.0, MIN_Y_SPAN]);
    }

    #[test]
    fn headroom_above_the_peak() {
        let [low, high] = y_bounds(2.0);
        assert_eq!(low, 0.0);
        assert!((high - 2.2).abs() < 1e-12);
    }

    #[test]
    fn y_labels_span_the_range() {
        assert_eq!(y_labels(2.0), vec!["0 g", "1.00 g", "2.00 g"]);
    }
}
