//! Entry point for the hostpulse agent. Parses config, starts the host
//! generators and serves the WebSocket until Ctrl-C.

use std::env;
use std::net::SocketAddr;

use hostpulse_agent::config::parse_args;
use hostpulse_agent::generator::{spawn_host, HostSim};
use hostpulse_agent::router;
use hostpulse_agent::sampler::spawn_local_sampler;
use hostpulse_agent::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Snapshots buffered per client before a slow reader starts skipping
const FANOUT_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match parse_args(env::args(), |k| env::var(k).ok()) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            if msg.starts_with("Usage:") {
                return Ok(());
            }
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::new(FANOUT_CAPACITY);
    let mut tasks: Vec<_> = cfg
        .hosts
        .iter()
        .map(|h| spawn_host(HostSim::new(&h.name, h.temperament), cfg.interval, state.clone()))
        .collect();
    if cfg.local {
        tasks.push(spawn_local_sampler(cfg.interval, state.clone()));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, hosts = cfg.hosts.len(), local = cfg.local, "hostpulse_agent listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for t in tasks {
        t.abort();
    }
    info!("hostpulse_agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
