use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;

use crate::config::{ChartMarker, Rgb};

// Catppuccin Mocha-inspired palette
pub const BASE: Color = Color::Rgb(30, 30, 46);
pub const SURFACE0: Color = Color::Rgb(49, 50, 68);
pub const SURFACE1: Color = Color::Rgb(69, 71, 90);
pub const TEXT: Color = Color::Rgb(205, 214, 244);
pub const SUBTEXT: Color = Color::Rgb(166, 173, 200);
pub const BLUE: Color = Color::Rgb(137, 180, 250);
pub const GREEN: Color = Color::Rgb(166, 227, 161);
pub const RED: Color = Color::Rgb(243, 139, 168);
pub const YELLOW: Color = Color::Rgb(249, 226, 175);
pub const PEACH: Color = Color::Rgb(250, 179, 135);

pub fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

pub fn marker(marker: ChartMarker) -> Marker {
    match marker {
        ChartMarker::Braille => Marker::Braille,
        ChartMarker::Dot => Marker::Dot,
        ChartMarker::Block => Marker::Block,
    }
}

pub fn title_style() -> Style {
    Style::default().fg(BLUE).add_modifier(Modifier::BOLD)
}

pub fn header_style() -> Style {
    Style::default().fg(TEXT).bg(SURFACE0)
}

pub fn footer_style() -> Style {
    Style::default().fg(SUBTEXT).bg(SURFACE0)
}

pub fn key_hint_style() -> Style {
    Style::default().fg(BLUE)
}

pub fn label_style() -> Style {
    Style::default().fg(SUBTEXT)
}

pub fn value_style() -> Style {
    Style::default().fg(TEXT)
}

/// Carbon intensity colored from clean (green) to dirty (red), in gCO2eq/kWh.
pub fn intensity_style(grams_per_kwh: f64) -> Style {
    let color = if grams_per_kwh > 600.0 {
        RED
    } else if grams_per_kwh > 400.0 {
        PEACH
    } else if grams_per_kwh > 200.0 {
        YELLOW
    } else {
        GREEN
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn gauge_style(percent: f64) -> Style {
    let color = if percent > 90.0 {
        RED
    } else if percent > 70.0 {
        YELLOW
    } else if percent > 50.0 {
        PEACH
    } else {
        GREEN
    };
    Style::default().fg(color).bg(BASE)
}

pub fn border_style() -> Style {
    Style::default().fg(SURFACE1)
}
