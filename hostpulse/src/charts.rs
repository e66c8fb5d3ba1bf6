//! Live chart registry: one bounded CPU series per host, drawn on a render surface.
//!
//! The registry is an explicit object owned by the rendering layer. Every
//! operation reports what it did through [`ChartStatus`]; missing render
//! targets and unregistered hosts are skipped, never fatal.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::history::Series;

/// Points kept (and shown) per chart.
pub const WINDOW_LEN: usize = 15;
/// Vertical bounds of every chart, in percent.
pub const Y_MIN: f64 = 0.0;
pub const Y_MAX: f64 = 100.0;
/// Render targets are looked up as `"chart-" + host`.
pub const TARGET_PREFIX: &str = "chart-";

pub fn target_key(host: &str) -> String {
    format!("{TARGET_PREFIX}{host}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub series_label: &'static str,
    pub y_bounds: [f64; 2],
    pub legend: bool,
    /// Show the newest value in the chart's top-right corner.
    pub tooltip: bool,
    pub axis_labels: bool,
    /// Minimum spacing between redraws of updated charts; zero redraws
    /// right after every update.
    pub redraw_duration: Duration,
    pub max_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            kind: ChartKind::Line,
            series_label: "CPU %",
            y_bounds: [Y_MIN, Y_MAX],
            legend: false,
            tooltip: false,
            axis_labels: false,
            redraw_duration: Duration::ZERO,
            max_points: WINDOW_LEN,
        }
    }
}

/// Outcome of a registry operation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStatus {
    Created,
    /// An existing chart was released and replaced by an empty one.
    Replaced,
    Updated,
    Closed,
    SkippedMissingTarget,
    SkippedUnregistered,
}

impl ChartStatus {
    pub fn is_skipped(self) -> bool {
        matches!(
            self,
            ChartStatus::SkippedMissingTarget | ChartStatus::SkippedUnregistered
        )
    }
}

/// Presentation layer the registry draws on: addressable targets plus the
/// charting backend that redraws and frees them.
pub trait RenderSurface {
    type Target;

    /// Look up the drawable target registered under `key`.
    fn resolve(&mut self, key: &str) -> Option<Self::Target>;

    /// Synchronously redraw `target` from `series`.
    fn redraw(&mut self, target: &Self::Target, series: &Series, config: &ChartConfig);

    /// Free whatever the chart on `target` holds.
    fn release(&mut self, target: Self::Target);
}

struct LiveChart<T> {
    target: T,
    series: Series,
}

pub struct ChartRegistry<S: RenderSurface> {
    surface: S,
    config: ChartConfig,
    charts: HashMap<String, LiveChart<S::Target>>,
}

impl<S: RenderSurface> ChartRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, ChartConfig::default())
    }

    pub fn with_config(surface: S, config: ChartConfig) -> Self {
        Self {
            surface,
            config,
            charts: HashMap::new(),
        }
    }

    /// Register an empty chart for `host` on its `chart-<host>` target.
    /// Re-opening a host releases the previous chart first.
    pub fn open(&mut self, host: &str) -> ChartStatus {
        let key = target_key(host);
        let Some(target) = self.surface.resolve(&key) else {
            debug!(host, key = %key, "no render target, chart not created");
            return ChartStatus::SkippedMissingTarget;
        };
        let chart = LiveChart {
            target,
            series: Series::new(self.config.max_points),
        };
        match self.charts.insert(host.to_string(), chart) {
            Some(old) => {
                self.surface.release(old.target);
                ChartStatus::Replaced
            }
            None => ChartStatus::Created,
        }
    }

    /// Append one sample to `host`'s chart and redraw it.
    pub fn update(&mut self, host: &str, value: f64) -> ChartStatus {
        let Some(chart) = self.charts.get_mut(host) else {
            debug!(host, value, "sample for unregistered host dropped");
            return ChartStatus::SkippedUnregistered;
        };
        chart.series.push("", value);
        self.surface
            .redraw(&chart.target, &chart.series, &self.config);
        ChartStatus::Updated
    }

    pub fn close(&mut self, host: &str) -> ChartStatus {
        match self.charts.remove(host) {
            Some(chart) => {
                self.surface.release(chart.target);
                ChartStatus::Closed
            }
            None => {
                debug!(host, "close on unregistered host");
                ChartStatus::SkippedUnregistered
            }
        }
    }

    pub fn series(&self, host: &str) -> Option<&Series> {
        self.charts.get(host).map(|c| &c.series)
    }

    pub fn contains(&self, host: &str) -> bool {
        self.charts.contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Registered hosts, sorted.
    pub fn hosts(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.charts.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
