//! CLI arg parsing tests for hostpulse_agent (server)
use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn test_help_lists_flags() {
    let out = Command::cargo_bin("hostpulse_agent")
        .expect("binary exists")
        .arg("--help")
        .output()
        .expect("run agent");
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stderr);
    for flag in ["--port", "-p", "--hosts", "--interval-ms", "--local"] {
        assert!(text.contains(flag), "help missing {flag}\n{text}");
    }
}

#[test]
fn test_bad_port_is_reported_without_binding() {
    let out = Command::cargo_bin("hostpulse_agent")
        .expect("binary exists")
        .args(["--port", "not-a-port"])
        .output()
        .expect("run agent");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid port"));
}

#[test]
fn test_port_short_long() {
    // Flags are accepted if the process starts and keeps running (then we kill quickly).
    for args in [["--port", "39555"], ["-p", "39556"]] {
        let mut child = Command::cargo_bin("hostpulse_agent")
            .expect("binary exists")
            .args(args)
            .spawn()
            .expect("spawn agent");
        // Give it a moment to bind
        std::thread::sleep(std::time::Duration::from_millis(150));
        assert!(child.try_wait().expect("poll agent").is_none(), "agent exited early with {args:?}");
        let _ = child.kill();
        let _ = child.wait();
    }
}
