//! Data types sent to the client over WebSocket.
//! Keep this module minimal and stable: it defines the wire format.

use serde::{Deserialize, Serialize};

/// One snapshot per host per tick, serialized as a single JSON text frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    pub timestamp: i64,    // unix seconds
    pub cpu_usage: f64,    // percent
    pub memory_usage: f64, // percent
    pub disk_io: f64,      // MB/s
    pub network_in: f64,   // MB/s
    pub network_out: f64,  // MB/s
    pub uptime: i64,       // seconds
    pub hostname: String,
}
