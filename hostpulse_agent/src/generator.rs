//! Synthetic host generator: one task per simulated host, one snapshot per tick.
//!
//! Every host carries a status (normal / overloaded / offline). After a dwell of
//! 30–59 ticks the status is re-rolled according to the host's temperament.
//! Offline hosts emit nothing but keep accumulating uptime. Gauge values come
//! from a wave seeded by the host name, so a given host/tick always yields the
//! same snapshot.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::state::AppState;
use crate::types::ServerMetrics;

const MIN_DWELL_TICKS: u64 = 30;
const DWELL_SPREAD_TICKS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temperament {
    /// Always normal.
    Steady,
    /// Starts overloaded; overloaded on 80% of re-rolls.
    Busy,
    /// Starts offline; back to normal on 10% of re-rolls.
    Flaky,
}

impl Temperament {
    fn initial_status(self) -> SimStatus {
        match self {
            Temperament::Steady => SimStatus::Normal,
            Temperament::Busy => SimStatus::Overloaded,
            Temperament::Flaky => SimStatus::Offline,
        }
    }

    /// `roll` is uniform in [0, 1).
    fn reroll(self, roll: f64) -> SimStatus {
        match self {
            Temperament::Steady => SimStatus::Normal,
            Temperament::Busy if roll < 0.8 => SimStatus::Overloaded,
            Temperament::Busy => SimStatus::Normal,
            Temperament::Flaky if roll < 0.1 => SimStatus::Normal,
            Temperament::Flaky => SimStatus::Offline,
        }
    }
}

impl FromStr for Temperament {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "steady" => Ok(Temperament::Steady),
            "busy" => Ok(Temperament::Busy),
            "flaky" => Ok(Temperament::Flaky),
            other => Err(format!("unknown temperament '{other}' (steady|busy|flaky)")),
        }
    }
}

impl fmt::Display for Temperament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Temperament::Steady => "steady",
            Temperament::Busy => "busy",
            Temperament::Flaky => "flaky",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Normal,
    Overloaded,
    Offline,
}

#[derive(Debug, Clone, Copy)]
struct Span(f64, f64);

impl Span {
    fn at(self, t: f64) -> f64 {
        self.0 + t * (self.1 - self.0)
    }
}

struct Profile {
    cpu: Span,
    mem: Span,
    disk: Span,
    net: Span,
}

const NORMAL: Profile = Profile {
    cpu: Span(20.0, 60.0),
    mem: Span(30.0, 70.0),
    disk: Span(50.0, 250.0),
    net: Span(20.0, 100.0),
};

const OVERLOADED: Profile = Profile {
    cpu: Span(80.0, 100.0),
    mem: Span(75.0, 100.0),
    disk: Span(400.0, 1000.0),
    net: Span(150.0, 500.0),
};

pub struct HostSim {
    name: String,
    temperament: Temperament,
    status: SimStatus,
    uptime: i64,
    tick: u64,
    last_change: u64,
    dwell: u64,
    seed: f64,
}

impl HostSim {
    pub fn new(name: impl Into<String>, temperament: Temperament) -> Self {
        let name = name.into();
        let seed = seed_from(&name);
        let mut sim = Self {
            name,
            temperament,
            status: temperament.initial_status(),
            uptime: 0,
            tick: 0,
            last_change: 0,
            dwell: 0,
            seed,
        };
        sim.dwell = sim.next_dwell();
        sim
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn uptime(&self) -> i64 {
        self.uptime
    }

    /// Advance one tick. `None` while the host is offline.
    pub fn step(&mut self, now_unix: i64) -> Option<ServerMetrics> {
        self.tick += 1;
        if self.tick - self.last_change >= self.dwell {
            let next = self.temperament.reroll(self.noise(0xA5));
            if next != self.status {
                debug!(host = %self.name, from = ?self.status, to = ?next, "status changed");
            }
            self.status = next;
            self.last_change = self.tick;
            self.dwell = self.next_dwell();
        }

        let uptime = self.uptime;
        self.uptime += 1;

        let p = match self.status {
            SimStatus::Offline => return None,
            SimStatus::Normal => &NORMAL,
            SimStatus::Overloaded => &OVERLOADED,
        };
        Some(ServerMetrics {
            timestamp: now_unix,
            cpu_usage: p.cpu.at(self.wave(0)),
            memory_usage: p.mem.at(self.wave(1)),
            disk_io: p.disk.at(self.wave(2)),
            network_in: p.net.at(self.wave(3)),
            network_out: p.net.at(self.wave(4)),
            uptime,
            hostname: self.name.clone(),
        })
    }

    fn next_dwell(&self) -> u64 {
        MIN_DWELL_TICKS + (self.noise(7) * DWELL_SPREAD_TICKS) as u64
    }

    /// Smooth per-channel wave with a little jitter, in [0, 1].
    fn wave(&self, channel: u32) -> f64 {
        let c = f64::from(channel);
        let t = self.tick as f64 / 8.0;
        let base = (t * (1.0 + 0.37 * c) + self.seed + c * 1.7).sin();
        let jitter = self.noise(channel + 1) - 0.5;
        (0.5 + 0.4 * base + 0.2 * jitter).clamp(0.0, 1.0)
    }

    /// Hash-like value in [0, 1) for this tick and salt.
    fn noise(&self, salt: u32) -> f64 {
        let x = (self.tick as f64 * 1.618 + f64::from(salt) * 12.9898 + self.seed * 78.233).sin()
            * 43_758.545_3;
        let f = x - x.floor();
        // tiny negative x rounds up to exactly 1.0
        if f < 1.0 { f } else { 0.0 }
    }
}

// FNV-1a, folded onto a phase in [0, TAU)
fn seed_from(name: &str) -> f64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in name.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0100_0000_01b3);
    }
    (h % 10_000) as f64 / 10_000.0 * TAU
}

pub fn spawn_host(mut sim: HostSim, period: Duration, state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(host = %sim.name(), temperament = %sim.temperament, ?period, "generator started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Some(m) = sim.step(Utc::now().timestamp()) {
                state.publish(&m).await;
            }
        }
    })
}
