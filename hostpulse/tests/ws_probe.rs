use hostpulse::ws::{connect, next_snapshot};

// Integration probe: only runs when HOSTPULSE_WS is set to an agent WebSocket URL.
// Example: HOSTPULSE_WS=ws://127.0.0.1:8080/ws cargo test -p hostpulse --test ws_probe -- --nocapture
#[tokio::test]
async fn probe_snapshot_stream() {
    // Gate the test to avoid CI failures when no agent is running.
    let url = match std::env::var("HOSTPULSE_WS") {
        Ok(v) if !v.is_empty() => v,
        _ => {
            eprintln!(
                "skipping ws_probe: set HOSTPULSE_WS=ws://host:port/ws to run this integration test"
            );
            return;
        }
    };

    let mut ws = connect(&url).await.expect("connect ws");

    let m = tokio::time::timeout(std::time::Duration::from_secs(5), next_snapshot(&mut ws))
        .await
        .expect("snapshot within timeout")
        .expect("stream open")
        .expect("decodable snapshot");
    assert!(!m.hostname.is_empty());
}
