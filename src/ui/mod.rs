pub mod footer;
pub mod header;
pub mod help;
pub mod layout;
pub mod theme;
pub mod totals;
pub mod widgets;

use ratatui::Frame;

use crate::app::App;
use crate::metrics::cpu::UsageSampler;
use widgets::emission_chart::{self, ChartStyle};

pub fn render<S: UsageSampler + 'static>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area);

    header::render(
        frame,
        app_layout.header,
        &app.info,
        &app.hostname,
        app.elapsed().as_secs(),
    );

    let axis = &app.axis;
    let points = app.series.points();
    let style = ChartStyle {
        line: theme::rgb(app.colors.line),
        axis: theme::rgb(app.colors.axis),
        text: theme::rgb(app.colors.text),
        marker: theme::marker(app.marker),
    };
    emission_chart::render(
        frame,
        app_layout.chart,
        &format!("CO2 per {} s", axis.sampling_interval()),
        &points,
        axis.labels(points.len()),
        format!("time ({})", axis.x_unit()),
        &style,
    );

    let totals = totals::Totals {
        last_sample: app.series.last(),
        last_usage: app.last_usage,
        session: app.session_total(),
        historical: app.historical_total,
        x_unit: axis.x_unit(),
        skipped_ticks: app.skipped_ticks(),
        failed_samples: app.failed_samples,
    };
    totals::render(frame, app_layout.totals, &totals);

    footer::render(frame, app_layout.footer, app.is_sampling(), app.period());

    if app.show_help {
        help::render(frame, area);
    }
}
