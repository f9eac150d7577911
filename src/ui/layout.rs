use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub header: Rect,
    pub chart: Rect,
    pub totals: Rect,
    pub footer: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // session info
            Constraint::Min(8),    // emission chart
            Constraint::Length(3), // totals
            Constraint::Length(1), // footer
        ])
        .split(area);

    AppLayout {
        header: chunks[0],
        chart: chunks[1],
        totals: chunks[2],
        footer: chunks[3],
    }
}
