//! End-to-end: start the agent, connect over WebSocket, read snapshots.
use assert_cmd::prelude::*;
use futures_util::StreamExt;
use std::process::{Child, Command};
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

struct Agent(Child);

impl Drop for Agent {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn start_agent(port: u16, hosts: &str) -> Agent {
    let child = Command::cargo_bin("hostpulse_agent")
        .expect("binary exists")
        .args(["-p", &port.to_string(), "--hosts", hosts, "--interval-ms", "50"])
        .spawn()
        .expect("spawn agent");
    Agent(child)
}

async fn connect_with_retry(url: &str) -> tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>> {
    // Poll up to ~3s for the listener to come up to avoid timing flakes
    let start = Instant::now();
    loop {
        match connect_async(url).await {
            Ok((ws, _)) => return ws,
            Err(e) if start.elapsed() > Duration::from_secs(3) => panic!("agent never came up: {e}"),
            Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
}

#[tokio::test]
async fn streams_snapshots_for_every_host() {
    let port = 39571;
    let _agent = start_agent(port, "alpha,beta:busy");
    let mut ws = connect_with_retry(&format!("ws://127.0.0.1:{port}/ws")).await;

    let mut seen = std::collections::HashMap::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while seen.len() < 2 && Instant::now() < deadline {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("snapshot within timeout")
            .expect("stream open")
            .expect("ws frame");
        if let Message::Text(js) = msg {
            let v: serde_json::Value = serde_json::from_str(&js).expect("json snapshot");
            for key in ["timestamp", "cpu_usage", "memory_usage", "disk_io", "network_in", "network_out", "uptime"] {
                assert!(v.get(key).is_some(), "missing {key}: {js}");
            }
            let host = v["hostname"].as_str().expect("hostname").to_string();
            seen.insert(host, v["cpu_usage"].as_f64().expect("cpu"));
        }
    }
    assert!(seen["alpha"] >= 20.0 && seen["alpha"] <= 60.0, "{seen:?}");
    assert!(seen["beta"] >= 80.0 && seen["beta"] <= 100.0, "{seen:?}");
}

#[tokio::test]
async fn late_client_gets_latest_snapshot_replayed() {
    let port = 39572;
    let _agent = start_agent(port, "gamma");
    let url = format!("ws://127.0.0.1:{port}/ws");
    // first connection just waits for the agent to be up and publishing
    let mut first = connect_with_retry(&url).await;
    let _ = tokio::time::timeout(Duration::from_secs(2), first.next()).await;

    let (mut late, _) = connect_async(url.as_str()).await.expect("connect");
    let msg = tokio::time::timeout(Duration::from_millis(500), late.next())
        .await
        .expect("replayed snapshot arrives promptly")
        .expect("stream open")
        .expect("ws frame");
    let Message::Text(js) = msg else { panic!("expected text frame, got {msg:?}") };
    assert!(js.contains("\"hostname\":\"gamma\""), "{js}");
}
