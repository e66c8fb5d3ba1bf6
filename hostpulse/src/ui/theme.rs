//! Shared UI theme constants.

use ratatui::style::Color;

use crate::types::HostStatus;

// CPU line (#3b82f6)
pub const CHART_LINE: Color = Color::Rgb(59, 130, 246);
pub const PANEL_IDLE: Color = Color::Rgb(110, 110, 120);

pub fn status_color(s: HostStatus) -> Color {
    match s {
        HostStatus::Normal => Color::Green,
        HostStatus::Overloaded => Color::Red,
        HostStatus::Offline => Color::DarkGray,
    }
}
