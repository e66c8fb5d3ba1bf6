//! Top header with agent address, host counts and last sample time.

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

pub struct HeaderInfo<'a> {
    pub url: &'a str,
    pub charts: usize,
    pub panels: usize,
    pub last_sample: Option<i64>,
}

pub fn header_title(h: &HeaderInfo<'_>) -> String {
    let last = h
        .last_sample
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "waiting".into());
    format!(
        "hostpulse — agent: {} | charts: {}/{} | last sample: {}  (press 'q' to quit)",
        h.url, h.charts, h.panels, last
    )
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, h: &HeaderInfo<'_>) {
    f.render_widget(
        Block::default().title(header_title(h)).borders(Borders::BOTTOM),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_before_first_sample() {
        let t = header_title(&HeaderInfo {
            url: "ws://127.0.0.1:8080/ws",
            charts: 0,
            panels: 2,
            last_sample: None,
        });
        assert!(t.contains("ws://127.0.0.1:8080/ws"));
        assert!(t.contains("charts: 0/2"));
        assert!(t.contains("last sample: waiting"));
    }
}
