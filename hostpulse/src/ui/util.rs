//! Small UI helpers: rates, uptime, truncation.

pub fn fmt_rate(mb_per_s: f64) -> String {
    if !mb_per_s.is_finite() {
        return "--".into();
    }
    if mb_per_s.abs() >= 1024.0 {
        format!("{:.1} GB/s", mb_per_s / 1024.0)
    } else {
        format!("{mb_per_s:.1} MB/s")
    }
}

pub fn fmt_uptime(secs: i64) -> String {
    if secs < 0 {
        return "--".into();
    }
    let (d, rem) = (secs / 86_400, secs % 86_400);
    let (h, rem) = (rem / 3_600, rem % 3_600);
    let (m, s) = (rem / 60, rem % 60);
    if d > 0 {
        format!("{d}d {h:02}h")
    } else if h > 0 {
        format!("{h}h {m:02}m")
    } else {
        format!("{m}m {s:02}s")
    }
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max { return s.to_string(); }
    if max <= 3 { return "...".into(); }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}
