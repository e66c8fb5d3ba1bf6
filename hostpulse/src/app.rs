//! App state and main loop: input handling, reading the snapshot stream,
//! feeding the chart registry, and drawing.

use std::{
    collections::HashMap,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::{debug, info};

use crate::charts::{target_key, ChartRegistry, ChartStatus};
use crate::error::Result;
use crate::types::{HostStatus, ServerMetrics, ServerSummary};
use crate::ui::chart::{draw_host_panel, PanelView};
use crate::ui::grid::{grid_cells, DashboardSurface};
use crate::ui::header::{draw_header, HeaderInfo};
use crate::ws::{connect, next_snapshot, parse_agent_url, WsStream};

/// A host with no sample for this long is shown as offline.
pub const STALE_AFTER: Duration = Duration::from_secs(5);
const TICK: Duration = Duration::from_millis(250);

struct HostSample {
    metrics: ServerMetrics,
    seen: Instant,
}

pub struct App {
    registry: ChartRegistry<DashboardSurface>,
    latest: HashMap<String, HostSample>,
    // No fixed panel list: every host seen gets a panel.
    auto_panels: bool,
    url: String,
    // Host part of the agent URL; snapshots carry no address of their own.
    agent_ip: String,
    last_sample_ts: Option<i64>,
    should_quit: bool,
}

impl App {
    /// `panels` lists the hosts that get a chart; empty means all hosts.
    pub fn new(panels: &[String]) -> Self {
        let surface = DashboardSurface::with_panels(panels.iter().map(|h| target_key(h)));
        Self {
            registry: ChartRegistry::new(surface),
            latest: HashMap::new(),
            auto_panels: panels.is_empty(),
            url: String::new(),
            agent_ip: String::new(),
            last_sample_ts: None,
            should_quit: false,
        }
    }

    pub fn set_agent_url(&mut self, url: &str) {
        self.url = url.to_string();
        self.agent_ip = parse_agent_url(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
    }

    pub fn registry(&self) -> &ChartRegistry<DashboardSurface> {
        &self.registry
    }

    /// Route one snapshot to its host's chart, opening the chart on first sight.
    pub fn ingest(&mut self, m: ServerMetrics) -> ChartStatus {
        self.ingest_at(m, Instant::now())
    }

    fn ingest_at(&mut self, m: ServerMetrics, now: Instant) -> ChartStatus {
        let host = m.hostname.clone();
        self.last_sample_ts = Some(m.timestamp);
        let cpu = m.cpu_usage;
        self.latest.insert(host.clone(), HostSample { metrics: m, seen: now });

        if !self.registry.contains(&host) {
            if self.auto_panels {
                self.registry.surface_mut().add_panel(target_key(&host));
            }
            let opened = self.registry.open(&host);
            if opened.is_skipped() {
                return opened;
            }
            info!(host = %host, "chart opened");
        }
        self.registry.update(&host, cpu)
    }

    pub fn status_of(&self, host: &str, now: Instant) -> HostStatus {
        match self.latest.get(host) {
            Some(s) => HostStatus::classify(
                s.metrics.cpu_usage,
                now.saturating_duration_since(s.seen) >= STALE_AFTER,
            ),
            None => HostStatus::Offline,
        }
    }

    pub fn summary(&self, host: &str, now: Instant) -> Option<ServerSummary> {
        self.latest
            .get(host)
            .map(|s| ServerSummary::from_metrics(&s.metrics, &self.agent_ip, self.status_of(host, now)))
    }

    /// True when the surface has pending redraws and the configured spacing
    /// since `last_draw` has elapsed.
    fn redraw_due(&self, last_draw: Instant, now: Instant) -> bool {
        self.registry.surface().is_dirty()
            && now.saturating_duration_since(last_draw) >= self.registry.config().redraw_duration
    }

    pub async fn run(&mut self, url: &str) -> Result<()> {
        self.set_agent_url(url);
        // Connect to agent
        let mut ws = connect(url).await?;

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, &mut ws).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        ws: &mut WsStream,
    ) -> Result<()> {
        let mut tick = tokio::time::interval(TICK);
        let mut last_draw = Instant::now();
        loop {
            // Input (non-blocking)
            while event::poll(Duration::ZERO)? {
                if let Event::Key(k) = event::read()? {
                    if matches!(k.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
                        self.should_quit = true;
                    }
                }
            }
            if self.should_quit {
                break;
            }

            let mut redraw = false;
            tokio::select! {
                next = next_snapshot(ws) => match next {
                    Some(Ok(m)) => {
                        let status = self.ingest(m);
                        debug!(?status, "snapshot ingested");
                    }
                    Some(Err(e)) => return Err(e),
                    None => {
                        info!("agent closed the stream");
                        break;
                    }
                },
                _ = tick.tick() => redraw = true,
            }

            if redraw || self.redraw_due(last_draw, Instant::now()) {
                let _ = self.registry.surface_mut().take_dirty();
                terminal.draw(|f| self.draw(f))?;
                last_draw = Instant::now();
            }
        }

        Ok(())
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let now = Instant::now();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(f.area());

        let panels = self.registry.surface().panels();
        draw_header(
            f,
            rows[0],
            &HeaderInfo {
                url: &self.url,
                charts: self.registry.len(),
                panels: panels.len(),
                last_sample: self.last_sample_ts,
            },
        );

        let cells = grid_cells(rows[1], panels.len());
        for (panel, cell) in panels.iter().zip(cells) {
            let host = panel.host();
            let sample = self.latest.get(host).map(|s| &s.metrics);
            let summary = self.summary(host, now);
            let view = PanelView {
                host,
                series: self.registry.series(host),
                summary: summary.as_ref(),
                status: self.status_of(host, now),
                uptime: sample.map(|m| m.uptime),
                net: sample.map(|m| (m.network_in, m.network_out)),
            };
            draw_host_panel(f, cell, &view, self.registry.config());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartConfig;

    fn snap(host: &str, cpu: f64) -> ServerMetrics {
        ServerMetrics {
            timestamp: 1_700_000_000,
            cpu_usage: cpu,
            memory_usage: 40.0,
            disk_io: 100.0,
            network_in: 10.0,
            network_out: 12.0,
            uptime: 30,
            hostname: host.into(),
        }
    }

    #[test]
    fn auto_panels_open_a_chart_per_host() {
        let mut app = App::new(&[]);
        assert_eq!(app.ingest(snap("server-1", 42.0)), ChartStatus::Updated);
        assert_eq!(app.ingest(snap("server-2", 7.0)), ChartStatus::Updated);
        assert_eq!(app.ingest(snap("server-1", 43.0)), ChartStatus::Updated);
        assert_eq!(app.registry().hosts(), vec!["server-1", "server-2"]);
        assert_eq!(
            app.registry().series("server-1").unwrap().values(),
            vec![42.0, 43.0]
        );
        assert_eq!(app.registry().surface().panels().len(), 2);
    }

    #[test]
    fn fixed_panels_skip_unlisted_hosts() {
        let mut app = App::new(&["db".to_string()]);
        assert_eq!(
            app.ingest(snap("web", 50.0)),
            ChartStatus::SkippedMissingTarget
        );
        assert!(!app.registry().contains("web"));
        assert_eq!(app.ingest(snap("db", 50.0)), ChartStatus::Updated);
        assert_eq!(app.registry().len(), 1);
        assert_eq!(app.registry().surface().panels().len(), 1);
    }

    #[test]
    fn window_stays_bounded_across_many_snapshots() {
        let mut app = App::new(&[]);
        for i in 0..100 {
            let _ = app.ingest(snap("h", i as f64));
        }
        let s = app.registry().series("h").unwrap();
        assert_eq!(s.len(), crate::charts::WINDOW_LEN);
        assert_eq!(s.last(), Some(99.0));
    }

    #[test]
    fn status_follows_cpu_and_staleness() {
        let mut app = App::new(&[]);
        let t0 = Instant::now();
        let _ = app.ingest_at(snap("busy", 95.0), t0);
        let _ = app.ingest_at(snap("calm", 20.0), t0);
        assert_eq!(app.status_of("busy", t0), HostStatus::Overloaded);
        assert_eq!(app.status_of("calm", t0), HostStatus::Normal);
        assert_eq!(app.status_of("calm", t0 + STALE_AFTER), HostStatus::Offline);
        assert_eq!(app.status_of("nobody", t0), HostStatus::Offline);

        let card = app.summary("busy", t0).unwrap();
        assert_eq!(card.status, "overloaded");
        assert_eq!(card.metrics.cpu, 95.0);
    }

    #[test]
    fn draw_renders_every_panel() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = App::new(&[]);
        let _ = app.ingest(snap("alpha", 10.0));
        let _ = app.ingest(snap("beta", 90.0));
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("alpha"));
        assert!(text.contains("beta"));
        assert!(text.contains("charts: 2/2"));
    }

    #[test]
    fn summary_carries_agent_host_as_ip() {
        let mut app = App::new(&[]);
        let t0 = Instant::now();
        let _ = app.ingest_at(snap("server-1", 30.0), t0);
        assert_eq!(app.summary("server-1", t0).unwrap().ip, "");

        app.set_agent_url("ws://10.0.0.7:8080/ws");
        let card = app.summary("server-1", t0).unwrap();
        assert_eq!(card.ip, "10.0.0.7");
        assert_eq!(card.name, "server-1");
    }

    #[test]
    fn redraws_wait_for_configured_spacing() {
        let config = ChartConfig {
            redraw_duration: Duration::from_millis(500),
            ..ChartConfig::default()
        };
        let mut app = App::new(&[]);
        app.registry = ChartRegistry::with_config(DashboardSurface::new(), config);
        let t0 = Instant::now();
        assert!(!app.redraw_due(t0, t0 + Duration::from_secs(1)), "nothing pending");

        let _ = app.ingest_at(snap("h", 10.0), t0);
        assert!(!app.redraw_due(t0, t0 + Duration::from_millis(100)));
        assert!(app.redraw_due(t0, t0 + Duration::from_millis(500)));

        // default config redraws immediately
        let mut app = App::new(&[]);
        let _ = app.ingest_at(snap("h", 10.0), t0);
        assert!(app.redraw_due(t0, t0));
    }
}
