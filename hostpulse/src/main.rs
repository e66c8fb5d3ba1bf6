//! Entry point for the hostpulse TUI. Parses args, resolves the profile and runs the App.

use hostpulse::app::App;
use hostpulse::error::Result;
use hostpulse::profiles::{
    load_profiles, save_profiles, ProfileEntry, ProfileRequest, ProfilesFile, ResolveProfile,
};
use std::env;
use std::io::{self, Write};

const DEMO_PORT: u16 = 3231;

#[derive(Debug)]
struct ParsedArgs {
    url: Option<String>,
    profile: Option<String>,
    hosts: Vec<String>,
    save: bool,
    demo: bool,
    dry_run: bool,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--profile NAME|-P NAME] [--hosts a,b,c|-H a,b,c] [--save] [--demo] [--dry-run] [ws://HOST:PORT/ws]"
    )
}

fn split_hosts(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> std::result::Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hostpulse".into());
    let mut url: Option<String> = None;
    let mut profile: Option<String> = None;
    let mut hosts: Vec<String> = Vec::new();
    let mut save = false; // --save
    let mut demo = false; // --demo
    let mut dry_run = false; // --dry-run: resolve/save profile, don't connect

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--profile" | "-P" => {
                profile = it.next();
            }
            "--hosts" | "-H" => {
                hosts = it.next().as_deref().map(split_hosts).unwrap_or_default();
            }
            "--save" => save = true,
            "--demo" => demo = true,
            "--dry-run" => dry_run = true,
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--hosts=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    hosts = split_hosts(v);
                }
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }
    Ok(ParsedArgs {
        url,
        profile,
        hosts,
        save,
        demo,
        dry_run,
    })
}

/// Logs go to a file (the terminal belongs to the TUI), and only when asked for.
fn init_logging() {
    let Some(path) = env::var_os("HOSTPULSE_LOG_FILE") else {
        return;
    };
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("hostpulse: cannot open log file {}: {e}", path.to_string_lossy());
            return;
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };
    init_logging();

    // Demo mode short-circuit (ignore other args)
    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        return run_demo_mode(&parsed.hosts, parsed.dry_run).await;
    }

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        hosts: parsed.hosts.clone(),
    };
    let resolved = req.resolve(&profiles_file);

    // Determine final connection parameters (and maybe mutated profiles to persist)
    let mut profiles_mut = profiles_file.clone();
    let entry: ProfileEntry = match resolved {
        ResolveProfile::Direct(entry) => {
            if let Some(name) = parsed.profile.as_ref() {
                remember_profile(&mut profiles_mut, name, &entry, parsed.save)?;
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(mut names) => {
            // Always add demo option to list
            if !names.iter().any(|n| n == "demo") {
                names.push("demo".into());
            }
            let Some(name) = prompt_select(&names)? else {
                return Ok(());
            };
            if name == "demo" {
                return run_demo_mode(&parsed.hosts, parsed.dry_run).await;
            }
            match profiles_mut.profiles.get(&name) {
                Some(entry) => entry.clone(),
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let hosts = prompt_string("Hosts to chart, comma separated (blank = all): ")?;
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                hosts: split_hosts(&hosts),
            };
            profiles_mut.profiles.insert(name, entry.clone());
            save_profiles(&profiles_mut)?;
            entry
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(());
        }
    };

    if parsed.dry_run {
        eprintln!("hostpulse: would connect to {}", entry.url);
        return Ok(());
    }

    let mut app = App::new(&entry.hosts);
    app.run(&entry.url).await
}

/// New profiles are saved right away; changed ones only with --save or a yes at the prompt.
fn remember_profile(
    pf: &mut ProfilesFile,
    name: &str,
    entry: &ProfileEntry,
    force: bool,
) -> Result<()> {
    let overwrite = match pf.profiles.get(name) {
        None => true,
        Some(existing) if existing == entry => false,
        Some(_) => force || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: ")),
    };
    if overwrite {
        pf.profiles.insert(name.to_string(), entry.clone());
        save_profiles(pf)?;
    }
    Ok(())
}

fn prompt_select(names: &[String]) -> Result<Option<String>> {
    eprintln!("Select profile:");
    for (i, n) in names.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, n);
    }
    let line = prompt_string("Enter number (or blank to abort): ")?;
    Ok(line
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|idx| idx.checked_sub(1))
        .and_then(|idx| names.get(idx).cloned()))
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

async fn run_demo_mode(hosts: &[String], dry_run: bool) -> Result<()> {
    let url = format!("ws://127.0.0.1:{DEMO_PORT}/ws");
    if dry_run {
        eprintln!("hostpulse: would start a demo agent and connect to {url}");
        return Ok(());
    }
    let child = spawn_demo_agent(DEMO_PORT)?;
    let mut app = App::new(hosts);
    // Use select to handle Ctrl-C and normal quit
    tokio::select! {
        res = app.run(&url) => { drop(child); res }
        _ = tokio::signal::ctrl_c() => {
            // Drop child (kills agent) then return
            drop(child);
            Ok(())
        }
    }
}

struct DemoGuard(std::process::Child);

impl Drop for DemoGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_demo_agent(port: u16) -> Result<DemoGuard> {
    let candidate = find_agent_executable();
    let mut cmd = std::process::Command::new(candidate);
    cmd.arg("--port")
        .arg(port.to_string())
        .arg("--interval-ms")
        .arg("500")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    let child = cmd.spawn()?;
    // Give the agent a brief moment to start
    std::thread::sleep(std::time::Duration::from_millis(300));
    Ok(DemoGuard(child))
}

fn find_agent_executable() -> std::path::PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            #[cfg(windows)]
            let name = "hostpulse_agent.exe";
            #[cfg(not(windows))]
            let name = "hostpulse_agent";
            let candidate = parent.join(name);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    // Fallback to relying on PATH
    std::path::PathBuf::from("hostpulse_agent")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("hostpulse")
            .chain(v.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_flags_and_url() {
        let p = parse_args(args(&["-P", "prod", "--hosts", "a, b,,c", "--save", "ws://x/ws"]))
            .unwrap();
        assert_eq!(p.profile.as_deref(), Some("prod"));
        assert_eq!(p.hosts, vec!["a", "b", "c"]);
        assert!(p.save && !p.demo && !p.dry_run);
        assert_eq!(p.url.as_deref(), Some("ws://x/ws"));
    }

    #[test]
    fn assignment_forms() {
        let p = parse_args(args(&["--profile=dev", "--hosts=db"])).unwrap();
        assert_eq!(p.profile.as_deref(), Some("dev"));
        assert_eq!(p.hosts, vec!["db"]);
    }

    #[test]
    fn help_and_extra_positional_are_errors() {
        assert!(parse_args(args(&["--help"])).unwrap_err().starts_with("Usage:"));
        assert!(parse_args(args(&["ws://a/ws", "ws://b/ws"])).is_err());
    }
}
