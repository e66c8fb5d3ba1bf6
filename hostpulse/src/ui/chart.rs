//! Per-host panel: status line plus the rolling CPU line chart.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::charts::ChartConfig;
use crate::history::Series;
use crate::types::{HostStatus, ServerSummary};
use crate::ui::theme::{status_color, CHART_LINE, PANEL_IDLE};
use crate::ui::util::{fmt_rate, fmt_uptime, truncate_middle};

/// What a panel shows for one host. `series` is `None` when no live chart
/// is bound to the panel.
pub struct PanelView<'a> {
    pub host: &'a str,
    pub series: Option<&'a Series>,
    pub summary: Option<&'a ServerSummary>,
    pub status: HostStatus,
    pub uptime: Option<i64>,
    pub net: Option<(f64, f64)>,
}

pub fn draw_host_panel(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &PanelView<'_>,
    config: &ChartConfig,
) {
    let color = if view.series.is_some() { status_color(view.status) } else { PANEL_IDLE };
    let max_title = area.width.saturating_sub(4) as usize;
    let title = truncate_middle(&format!(" {} · {} ", view.host, view.status), max_title);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD)));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    f.render_widget(Paragraph::new(stats_line(view)), rows[0]);

    let Some(series) = view.series else {
        f.render_widget(
            Paragraph::new("no chart").style(Style::default().fg(PANEL_IDLE)),
            rows[1],
        );
        return;
    };

    let points = series.plot_points();
    let mut dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(CHART_LINE))
        .data(&points);
    if config.legend {
        dataset = dataset.name(config.series_label);
    }

    let x_max = series.capacity().saturating_sub(1).max(1) as f64;
    let mut x_axis = Axis::default().bounds([0.0, x_max]);
    let mut y_axis = Axis::default().bounds(config.y_bounds);
    if config.axis_labels {
        let [lo, hi] = config.y_bounds;
        y_axis = y_axis.labels(vec![format!("{lo:.0}"), format!("{hi:.0}")]);
        x_axis = x_axis.labels(vec![String::new(), String::new()]);
    }

    let mut chart = Chart::new(vec![dataset])
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(None);
    if config.tooltip {
        if let Some(last) = series.last().filter(|v| v.is_finite()) {
            chart = chart.block(
                Block::default()
                    .title_top(Line::from(format!("{last:.1}%")).right_aligned())
                    .title_style(Style::default().fg(CHART_LINE)),
            );
        }
    }
    f.render_widget(chart, rows[1]);
}

fn stats_line(view: &PanelView<'_>) -> Line<'static> {
    let Some(s) = view.summary else {
        return Line::from(Span::styled("waiting for samples…", Style::default().fg(PANEL_IDLE)));
    };
    let mut spans = vec![
        Span::styled(
            format!("CPU {:>5.1}%", s.metrics.cpu),
            Style::default().fg(CHART_LINE).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  RAM {:>5.1}%", s.metrics.ram)),
        Span::raw(format!("  Disk {}", fmt_rate(s.metrics.disk))),
    ];
    if let Some((rx, tx)) = view.net {
        spans.push(Span::raw(format!("  ↓{} ↑{}", fmt_rate(rx), fmt_rate(tx))));
    }
    if let Some(up) = view.uptime {
        spans.push(Span::raw(format!("  up {}", fmt_uptime(up))));
    }
    Line::from(spans)
}
