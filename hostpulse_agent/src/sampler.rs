//! Real-host sampler: reads this machine through sysinfo and publishes it
//! alongside the simulated hosts.

use std::time::{Duration, Instant};

use chrono::Utc;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::state::AppState;
use crate::types::ServerMetrics;

const MB: f64 = 1024.0 * 1024.0;

pub struct LocalSampler {
    hostname: String,
    sys: System,
    // Keep Networks/Disks alive across samples so received()/usage() are deltas
    nets: Networks,
    disks: Disks,
    last: Instant,
}

impl LocalSampler {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());
        let sys = System::new_with_specifics(refresh_kind);
        Self {
            hostname: System::host_name().unwrap_or_else(|| "localhost".into()),
            sys,
            nets: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            last: Instant::now(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn sample(&mut self) -> ServerMetrics {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.nets.refresh(true);
        self.disks.refresh(true);

        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64().max(1e-6);
        self.last = now;

        let (rx, tx) = self.nets.iter().fold((0u64, 0u64), |(rx, tx), (_, data)| {
            (rx.saturating_add(data.received()), tx.saturating_add(data.transmitted()))
        });
        let disk_bytes = self.disks.list().iter().fold(0u64, |acc, d| {
            let u = d.usage();
            acc.saturating_add(u.read_bytes).saturating_add(u.written_bytes)
        });

        ServerMetrics {
            timestamp: Utc::now().timestamp(),
            cpu_usage: f64::from(self.sys.global_cpu_usage()),
            memory_usage: percent(self.sys.used_memory(), self.sys.total_memory()),
            disk_io: disk_bytes as f64 / MB / dt,
            network_in: rx as f64 / MB / dt,
            network_out: tx as f64 / MB / dt,
            uptime: i64::try_from(System::uptime()).unwrap_or(i64::MAX),
            hostname: self.hostname.clone(),
        }
    }
}

impl Default for LocalSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

pub fn spawn_local_sampler(period: Duration, state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sampler = LocalSampler::new();
        info!(host = %sampler.hostname(), ?period, "local sampler started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first CPU reading needs a baseline
        ticker.tick().await;
        sampler.sample();
        loop {
            ticker.tick().await;
            let m = sampler.sample();
            state.publish(&m).await;
        }
    })
}
