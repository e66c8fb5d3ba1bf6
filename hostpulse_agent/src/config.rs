//! Agent configuration: CLI flags with environment fallbacks.
//!
//! Flags win over `HOSTPULSE_PORT`, `HOSTPULSE_HOSTS` and
//! `HOSTPULSE_INTERVAL_MS`, which win over the built-in defaults.

use std::time::Duration;

use crate::generator::Temperament;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_HOSTS: &str = "server-1:busy,server-2:busy,server-3:flaky,server-4,server-5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub name: String,
    pub temperament: Temperament,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub port: u16,
    pub hosts: Vec<HostSpec>,
    pub interval: Duration,
    pub local: bool,
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PORT|-p PORT] [--hosts NAME[:steady|busy|flaky],...] [--interval-ms MS] [--local]"
    )
}

/// `name` or `name:temperament`, comma separated. Blank entries are ignored.
pub fn parse_hosts(v: &str) -> Result<Vec<HostSpec>, String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.split_once(':') {
            Some((name, t)) if !name.is_empty() => Ok(HostSpec {
                name: name.to_string(),
                temperament: t.parse()?,
            }),
            Some(_) => Err(format!("empty host name in '{s}'")),
            None => Ok(HostSpec {
                name: s.to_string(),
                temperament: Temperament::Steady,
            }),
        })
        .collect()
}

fn parse_port(v: &str) -> Result<u16, String> {
    v.parse::<u16>().map_err(|_| format!("invalid port '{v}'"))
}

fn parse_interval(v: &str) -> Result<Duration, String> {
    match v.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(format!("invalid interval '{v}' (milliseconds, > 0)")),
    }
}

/// Parse argv, consulting `env` for anything not given on the command line.
/// `Err` carries the message to print: usage for `--help`, otherwise the problem.
pub fn parse_args<I, E>(args: I, env: E) -> Result<AgentConfig, String>
where
    I: IntoIterator<Item = String>,
    E: Fn(&str) -> Option<String>,
{
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hostpulse_agent".into());
    let mut port: Option<String> = None;
    let mut hosts: Option<String> = None;
    let mut interval: Option<String> = None;
    let mut local = false;

    while let Some(a) = it.next() {
        match a.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--port" | "-p" => port = it.next(),
            "--hosts" => hosts = it.next(),
            "--interval-ms" => interval = it.next(),
            "--local" => local = true,
            _ => match a.split_once('=') {
                Some(("--port", v)) => port = Some(v.to_string()),
                Some(("--hosts", v)) => hosts = Some(v.to_string()),
                Some(("--interval-ms", v)) => interval = Some(v.to_string()),
                _ => return Err(format!("Unexpected argument '{a}'. {}", usage(&prog))),
            },
        }
    }

    let port = match port.or_else(|| env("HOSTPULSE_PORT")) {
        Some(v) => parse_port(&v)?,
        None => DEFAULT_PORT,
    };
    let hosts = parse_hosts(
        &hosts
            .or_else(|| env("HOSTPULSE_HOSTS"))
            .unwrap_or_else(|| DEFAULT_HOSTS.to_string()),
    )?;
    let interval = match interval.or_else(|| env("HOSTPULSE_INTERVAL_MS")) {
        Some(v) => parse_interval(&v)?,
        None => DEFAULT_INTERVAL,
    };
    if hosts.is_empty() && !local {
        return Err("no hosts to serve: pass --hosts or --local".into());
    }

    Ok(AgentConfig {
        port,
        hosts,
        interval,
        local,
    })
}
