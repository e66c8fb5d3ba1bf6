//! Dashboard page: one chart panel per host key, laid out as a grid.
//!
//! `DashboardSurface` is the [`RenderSurface`] the chart registry draws on.
//! Redraw requests mark the page dirty; the event loop flushes it with a
//! single terminal draw.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::charts::{ChartConfig, RenderSurface, TARGET_PREFIX};
use crate::history::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelId(usize);

#[derive(Debug, Clone)]
pub struct Panel {
    pub key: String,
    /// Live charts bound to this panel; a re-open binds the new chart
    /// before the old one is released.
    charts: u32,
    pub redraws: u64,
}

impl Panel {
    pub fn attached(&self) -> bool {
        self.charts > 0
    }

    pub fn host(&self) -> &str {
        self.key.strip_prefix(TARGET_PREFIX).unwrap_or(&self.key)
    }
}

#[derive(Debug, Default)]
pub struct DashboardSurface {
    panels: Vec<Panel>,
    dirty: bool,
}

impl DashboardSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_panels<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut s = Self::new();
        for k in keys {
            s.add_panel(k);
        }
        s
    }

    /// Returns false if a panel with that key already exists.
    pub fn add_panel(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.panels.iter().any(|p| p.key == key) {
            return false;
        }
        self.panels.push(Panel {
            key,
            charts: 0,
            redraws: 0,
        });
        self.dirty = true;
        true
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// True if anything changed since the last call.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl RenderSurface for DashboardSurface {
    type Target = PanelId;

    fn resolve(&mut self, key: &str) -> Option<PanelId> {
        let idx = self.panels.iter().position(|p| p.key == key)?;
        self.panels[idx].charts += 1;
        Some(PanelId(idx))
    }

    fn redraw(&mut self, target: &PanelId, _series: &Series, _config: &ChartConfig) {
        if let Some(p) = self.panels.get_mut(target.0) {
            p.redraws += 1;
            self.dirty = true;
        }
    }

    fn release(&mut self, target: PanelId) {
        if let Some(p) = self.panels.get_mut(target.0) {
            p.charts = p.charts.saturating_sub(1);
            self.dirty = true;
        }
    }
}

/// Split `area` into `n` cells, row-major, up to three columns.
pub fn grid_cells(area: Rect, n: usize) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let cols = match n {
        1 => 1,
        2..=4 => 2,
        _ => 3,
    };
    let rows = n.div_ceil(cols);
    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows).map(|_| Constraint::Ratio(1, rows as u32)))
        .split(area);

    let mut cells = Vec::with_capacity(n);
    for r in row_rects.iter() {
        let col_rects = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..cols).map(|_| Constraint::Ratio(1, cols as u32)))
            .split(*r);
        for c in col_rects.iter() {
            if cells.len() == n {
                break;
            }
            cells.push(*c);
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{target_key, ChartRegistry, ChartStatus};

    #[test]
    fn resolve_attaches_and_release_detaches() {
        let mut s = DashboardSurface::with_panels([target_key("a")]);
        assert!(s.take_dirty());
        let id = s.resolve("chart-a").unwrap();
        assert!(s.panels()[0].attached());
        assert!(s.resolve("chart-b").is_none());
        s.release(id);
        assert!(!s.panels()[0].attached());
        assert!(s.take_dirty());
        assert!(!s.take_dirty());
    }

    #[test]
    fn reopen_keeps_panel_attached() {
        let mut reg = ChartRegistry::new(DashboardSurface::with_panels([target_key("db")]));
        let _ = reg.open("db");
        assert_eq!(reg.open("db"), ChartStatus::Replaced);
        assert!(reg.surface().panels()[0].attached());
        let _ = reg.close("db");
        assert!(!reg.surface().panels()[0].attached());
    }

    #[test]
    fn duplicate_panels_are_rejected() {
        let mut s = DashboardSurface::new();
        assert!(s.add_panel("chart-x"));
        assert!(!s.add_panel("chart-x"));
        assert_eq!(s.panels().len(), 1);
        assert_eq!(s.panels()[0].host(), "x");
    }

    #[test]
    fn registry_updates_count_redraws_on_the_panel() {
        let mut reg = ChartRegistry::new(DashboardSurface::with_panels([target_key("db")]));
        assert_eq!(reg.open("db"), ChartStatus::Created);
        let _ = reg.surface_mut().take_dirty();
        for v in 0..3 {
            let _ = reg.update("db", v as f64);
        }
        assert_eq!(reg.surface().panels()[0].redraws, 3);
        assert!(reg.surface_mut().take_dirty());
    }

    #[test]
    fn grid_has_one_cell_per_panel() {
        let area = Rect::new(0, 0, 120, 40);
        for n in 0..=8 {
            assert_eq!(grid_cells(area, n).len(), n, "n={n}");
        }
        let two = grid_cells(area, 2);
        assert_eq!(two[0].y, two[1].y);
        assert!(two[1].x > two[0].x);
    }
}
