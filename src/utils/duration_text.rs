//! Duration <-> text codec
//!
//! Shared by the manual-entry fields and by the parser that reads durations
//! back out of previously saved record details. Unparsable input is 0.

use once_cell::sync::Lazy;
use regex::Regex;

static UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d+)\s*(hours|hour|hrs|hr|h|minutes|minute|mins|min|m|seconds|second|secs|sec|s)",
    )
    .expect("unit duration regex")
});

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):(\d{1,2})(?::(\d{1,2}))?").expect("clock duration regex"));

static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("bare duration regex"));

/// Parse free-form duration text into whole seconds
///
/// Accepts `1h 2m 3s`, `2m 30s`, `90s`, `MM:SS`, `HH:MM:SS` and a bare number
/// of minutes, optionally embedded in longer text such as `Duration: 2m 30s`.
pub fn parse_duration_text(text: &str) -> u64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let mut matched = false;
    let mut total: u64 = 0;
    for caps in UNIT_RE.captures_iter(text) {
        let value: u64 = caps[1].parse().unwrap_or(0);
        let factor = match caps[2].to_ascii_lowercase().chars().next() {
            Some('h') => 3600,
            Some('m') => 60,
            _ => 1,
        };
        total = total.saturating_add(value.saturating_mul(factor));
        matched = true;
    }
    if matched {
        return total;
    }

    if let Some(caps) = CLOCK_RE.captures(text) {
        let first: u64 = caps[1].parse().unwrap_or(0);
        let second: u64 = caps[2].parse().unwrap_or(0);
        return match caps.get(3) {
            Some(third) => {
                let third: u64 = third.as_str().parse().unwrap_or(0);
                first
                    .saturating_mul(3600)
                    .saturating_add(second * 60)
                    .saturating_add(third)
            }
            None => first.saturating_mul(60).saturating_add(second),
        };
    }

    if BARE_RE.is_match(text) {
        return text.parse::<u64>().unwrap_or(0).saturating_mul(60);
    }

    0
}

/// Parse one manual-entry field (hours, minutes or seconds)
pub fn parse_field(text: &str) -> u64 {
    let text = text.trim();
    if let Ok(value) = text.parse::<u64>() {
        return value;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.floor() as u64,
        _ => 0,
    }
}

/// Split whole seconds into hours, minutes and seconds
pub fn split_hms(total: u64) -> (u64, u64, u64) {
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Format as `Mm Ss`, folding hours into minutes
pub fn format_minutes_seconds(total: u64) -> String {
    format!("{}m {}s", total / 60, total % 60)
}

/// Format as `Hh Mm Ss`
pub fn format_hours_minutes_seconds(total: u64) -> String {
    let (hours, minutes, seconds) = split_hms(total);
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// Stopwatch display, `HH:MM:SS`
pub fn format_clock(total: u64) -> String {
    let (hours, minutes, seconds) = split_hms(total);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
