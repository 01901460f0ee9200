//! # Utils Module
//!
//! Formatting helpers shared by the segments: context limits, percentages,
//! currency, and ANSI-aware width.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::io::Read;
use unicode_width::UnicodeWidthStr;

use crate::cli::ContextWindowArg;

pub const FULL_CONTEXT_LIMIT: u64 = 200_000;
pub const EXTENDED_CONTEXT_LIMIT: u64 = 1_000_000;
/// Share of the window that is usable before auto-compact kicks in.
pub const USABLE_CONTEXT_RATIO: f64 = 0.8;

static ANSI_SGR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    ANSI_SGR_RE.replace_all(s, "")
}

/// Terminal columns taken by `s` once color escapes are removed.
pub fn visible_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_ref())
}

// Context limit detection that mirrors Claude Code behavior:
// - explicit override always wins
// - display name tagged "[1m]" (or mentioning a 1M context) means 1,000,000 tokens
// - otherwise 200,000, optionally reduced to the usable share
pub fn context_limit(
    model_id: &str,
    display_name: &str,
    window: ContextWindowArg,
    override_limit: Option<u64>,
) -> u64 {
    if let Some(v) = override_limit.filter(|v| *v > 0) {
        return v;
    }
    let dn_l = display_name.to_lowercase();
    let mid_l = model_id.to_lowercase();
    let full = if dn_l.contains("[1m]")
        || (dn_l.contains("1m") && dn_l.contains("context"))
        || mid_l.ends_with("[1m]")
        || mid_l.ends_with("-1m")
    {
        EXTENDED_CONTEXT_LIMIT
    } else {
        FULL_CONTEXT_LIMIT
    };
    match window {
        ContextWindowArg::Full => full,
        ContextWindowArg::Usable => (full as f64 * USABLE_CONTEXT_RATIO).round() as u64,
    }
}

/// Rounded share of the context window. Not clamped: 125 means the window
/// was overrun by a quarter.
pub fn token_percent(tokens: u64, limit: u64) -> u32 {
    if limit == 0 {
        return if tokens == 0 { 0 } else { 100 };
    }
    ((tokens as f64 * 100.0) / limit as f64).round() as u32
}

/// Dollar amount with one decimal, shortened with k/m past a thousand.
pub fn format_currency(v: Option<f64>) -> String {
    let Some(v) = v.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };
    if v < 1_000.0 {
        format!("{v:.1}")
    } else if v < 1_000_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{:.1}m", v / 1_000_000.0)
    }
}

/// Percentage difference between today's cost and the mean of earlier days.
/// `None` when there is no usable baseline or the change is within ±1%.
pub fn cost_delta(today: f64, history: &[f64]) -> Option<i64> {
    if history.is_empty() || !today.is_finite() {
        return None;
    }
    let average = history.iter().sum::<f64>() / history.len() as f64;
    if average <= 0.0 {
        return None;
    }
    let pct = ((today - average) / average * 100.0).round() as i64;
    if pct.abs() > 1 { Some(pct) } else { None }
}

/// Token count such as `200000`, `200_000`, `200k` or `1.5m`. Zero and
/// anything unreadable give `None`.
pub fn parse_token_count(raw: &str) -> Option<u64> {
    let t = raw.trim().to_ascii_lowercase().replace(['_', ','], "");
    let (digits, scale) = match t.strip_suffix('k') {
        Some(d) => (d, 1_000.0),
        None => match t.strip_suffix('m') {
            Some(d) => (d, 1_000_000.0),
            None => (t.as_str(), 1.0),
        },
    };
    let v = digits.trim().parse::<f64>().ok()? * scale;
    (v.is_finite() && v >= 1.0).then(|| v.round() as u64)
}

pub(crate) fn parse_bool(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
