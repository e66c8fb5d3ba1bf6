//! Types that mirror the agent's JSON schema, plus the label-keyed status card
//! the dashboard renders per host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// CPU percentage at or above which a live host is shown as overloaded.
pub const OVERLOAD_CPU_PCT: f64 = 80.0;

/// One point-in-time snapshot for a host, as streamed by the agent.
///
/// Values are carried as received: nothing here clamps or rejects
/// out-of-range, negative or non-finite gauges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    /// Unix seconds.
    pub timestamp: i64,
    /// Percent.
    pub cpu_usage: f64,
    /// Percent.
    pub memory_usage: f64,
    /// MB/s.
    pub disk_io: f64,
    /// MB/s.
    pub network_in: f64,
    /// MB/s.
    pub network_out: f64,
    /// Seconds.
    pub uptime: i64,
    pub hostname: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Normal,
    Overloaded,
    Offline,
}

impl HostStatus {
    /// Display status for a host: no recent sample wins over any CPU reading.
    pub fn classify(cpu_usage: f64, stale: bool) -> Self {
        if stale {
            HostStatus::Offline
        } else if cpu_usage >= OVERLOAD_CPU_PCT {
            HostStatus::Overloaded
        } else {
            HostStatus::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostStatus::Normal => "normal",
            HostStatus::Overloaded => "overloaded",
            HostStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gauges of the label-keyed card. Keys are display labels, not field names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryGauges {
    #[serde(rename = "CPU")]
    pub cpu: f64,
    #[serde(rename = "RAM")]
    pub ram: f64,
    /// MB/s. Older payloads spell the key in Cyrillic.
    #[serde(rename = "Disk", alias = "Диск")]
    pub disk: f64,
}

/// Label-keyed host card: display name, address, free-form status and gauges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub name: String,
    pub ip: String,
    pub status: String,
    pub metrics: SummaryGauges,
}

impl ServerSummary {
    pub fn from_metrics(m: &ServerMetrics, ip: impl Into<String>, status: HostStatus) -> Self {
        Self {
            name: m.hostname.clone(),
            ip: ip.into(),
            status: status.to_string(),
            metrics: SummaryGauges {
                cpu: m.cpu_usage,
                ram: m.memory_usage,
                disk: m.disk_io,
            },
        }
    }
}
