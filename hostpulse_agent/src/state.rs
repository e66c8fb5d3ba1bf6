//! Shared agent state: snapshot fan-out channel and the latest JSON per host.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::warn;

use crate::types::ServerMetrics;

#[derive(Clone)]
pub struct AppState {
    // Serialized snapshots, one per message; every WS client subscribes
    pub tx: broadcast::Sender<String>,

    // Last serialized snapshot per host, replayed to new clients
    pub latest: Arc<RwLock<BTreeMap<String, String>>>,

    pub client_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            latest: Arc::new(RwLock::new(BTreeMap::new())),
            client_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serialize once, cache, and fan out. Having no subscribers is not an error.
    /// Cache and send happen under the same write lock as `subscribe`'s read.
    pub async fn publish(&self, m: &ServerMetrics) {
        let json = match serde_json::to_string(m) {
            Ok(js) => js,
            Err(e) => {
                warn!(host = %m.hostname, error = %e, "dropping unserializable snapshot");
                return;
            }
        };
        let mut latest = self.latest.write().await;
        latest.insert(m.hostname.clone(), json.clone());
        let _ = self.tx.send(json);
    }

    /// A receiver plus the latest snapshot of every host. Each publish lands
    /// in exactly one of the two.
    pub async fn subscribe(&self) -> (broadcast::Receiver<String>, Vec<String>) {
        let latest = self.latest.read().await;
        (self.tx.subscribe(), latest.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(host: &str, cpu: f64) -> ServerMetrics {
        ServerMetrics {
            timestamp: 1,
            cpu_usage: cpu,
            memory_usage: 0.0,
            disk_io: 0.0,
            network_in: 0.0,
            network_out: 0.0,
            uptime: 0,
            hostname: host.into(),
        }
    }

    #[tokio::test]
    async fn publish_fans_out_and_keeps_latest_per_host() {
        let state = AppState::new(8);
        let (mut rx, replay) = state.subscribe().await;
        assert!(replay.is_empty());

        state.publish(&snap("b", 1.0)).await;
        state.publish(&snap("a", 2.0)).await;
        state.publish(&snap("b", 3.0)).await;

        for expected in ["b", "a", "b"] {
            let js = rx.recv().await.unwrap();
            let m: ServerMetrics = serde_json::from_str(&js).unwrap();
            assert_eq!(m.hostname, expected);
        }

        let (_rx, latest) = state.subscribe().await;
        assert_eq!(latest.len(), 2);
        let b: ServerMetrics = serde_json::from_str(&latest[1]).unwrap();
        assert_eq!(b.cpu_usage, 3.0);
    }

    #[tokio::test]
    async fn publish_without_clients_still_caches() {
        let state = AppState::new(1);
        state.publish(&snap("solo", 5.0)).await;
        let (mut rx, latest) = state.subscribe().await;
        assert_eq!(latest.len(), 1);
        assert!(rx.try_recv().is_err());
    }
}
