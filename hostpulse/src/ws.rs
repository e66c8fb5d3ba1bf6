//! Minimal WebSocket client helpers for reading the agent's snapshot stream.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::types::ServerMetrics;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The agent speaks plain `ws://` only.
pub fn parse_agent_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Url {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "ws" {
        return Err(Error::Url {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}', expected ws", url.scheme()),
        });
    }
    Ok(url)
}

// Connect to the agent and return the WS stream
pub async fn connect(raw: &str) -> Result<WsStream> {
    let url = parse_agent_url(raw)?;
    let (ws, _) = connect_async(url.as_str()).await?;
    debug!(url = %url, "connected to agent");
    Ok(ws)
}

/// Wait for the next snapshot. `None` once the agent closes the stream.
/// Frames that fail to decode are logged and skipped.
///
/// Only awaits `ws.next()`, so it is safe to race in `tokio::select!`.
pub async fn next_snapshot(ws: &mut WsStream) -> Option<Result<ServerMetrics>> {
    loop {
        match ws.next().await? {
            Ok(Message::Text(json)) => match decode_snapshot(&json) {
                Ok(m) => return Some(Ok(m)),
                Err(e) => warn!(error = %e, "skipping malformed snapshot"),
            },
            Ok(Message::Close(_)) => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e.into())),
        }
    }
}

pub fn decode_snapshot(json: &str) -> Result<ServerMetrics> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_ws_urls_only() {
        assert!(parse_agent_url("ws://127.0.0.1:8080/ws").is_ok());
        assert!(matches!(
            parse_agent_url("http://127.0.0.1:8080/ws"),
            Err(Error::Url { .. })
        ));
        assert!(matches!(parse_agent_url("not a url"), Err(Error::Url { .. })));
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        assert!(decode_snapshot(r#"{"name":"x"}"#).is_err());
        let ok = decode_snapshot(
            r#"{"timestamp":1,"cpu_usage":1,"memory_usage":2,"disk_io":3,
                "network_in":4,"network_out":5,"uptime":6,"hostname":"h"}"#,
        )
        .unwrap();
        assert_eq!(ok.hostname, "h");
    }
}
