//! # Window Module
//!
//! Labels the active 5-hour block as `"<place> HH:MM~HH:MM"` in the display
//! timezone.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;

use crate::models::QuotaBlock;

pub const CLOCK_PLACEHOLDER: &str = "--:--";

/// Timezone used for the block window label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    /// IANA zone from configuration
    Named(Tz),
    /// Fixed offset from configuration ("UTC+8", "+05:30")
    Fixed(FixedOffset),
    /// Host timezone
    Local,
}

impl DisplayZone {
    /// Resolve a configured override; anything unrecognised falls back to the host zone.
    pub fn resolve(override_tz: Option<&str>) -> Self {
        let Some(raw) = override_tz.map(str::trim).filter(|s| !s.is_empty()) else {
            return DisplayZone::Local;
        };
        if let Ok(tz) = raw.parse::<Tz>() {
            // "UTC"/"GMT" parse as IANA names but read better as offsets
            if !matches!(raw.to_ascii_uppercase().as_str(), "UTC" | "GMT" | "ETC/UTC") {
                return DisplayZone::Named(tz);
            }
        }
        parse_offset(raw)
            .map(DisplayZone::Fixed)
            .unwrap_or(DisplayZone::Local)
    }

    /// Short place name shown before the clock range.
    pub fn place(&self) -> String {
        match self {
            DisplayZone::Named(tz) => tz
                .name()
                .rsplit('/')
                .next()
                .unwrap_or("UTC")
                .replace('_', " "),
            DisplayZone::Fixed(off) => place_for_offset(off.local_minus_utc()),
            DisplayZone::Local => place_for_offset(Local::now().offset().fix().local_minus_utc()),
        }
    }

    /// `HH:MM` of `ts` in this zone.
    pub fn clock(&self, ts: DateTime<Utc>) -> String {
        match self {
            DisplayZone::Named(tz) => hh_mm(ts, tz),
            DisplayZone::Fixed(off) => hh_mm(ts, off),
            DisplayZone::Local => hh_mm(ts, &Local),
        }
    }
}

fn hh_mm<Z: TimeZone>(ts: DateTime<Utc>, zone: &Z) -> String
where
    Z::Offset: Display,
{
    ts.with_timezone(zone).format("%H:%M").to_string()
}

/// `"UTC+8"`, `"GMT-05:30"`, `"+0800"`, `"UTC"` and similar.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let upper = raw.trim().to_ascii_uppercase();
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper)
        .trim();
    if rest.is_empty() {
        return FixedOffset::east_opt(0);
    }
    let (sign, digits) = if let Some(d) = rest.strip_prefix('+') {
        (1, d)
    } else if let Some(d) = rest.strip_prefix('-') {
        (-1, d)
    } else {
        return None;
    };
    if !digits.is_ascii() {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None if digits.len() == 4 => (
            digits[..2].parse::<i32>().ok()?,
            digits[2..].parse::<i32>().ok()?,
        ),
        None => (digits.parse::<i32>().ok()?, 0),
    };
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// Representative city per standard UTC offset.
const OFFSET_PLACES: &[(i32, &str)] = &[
    (-36_000, "Honolulu"),
    (-28_800, "Los Angeles"),
    (-25_200, "Denver"),
    (-21_600, "Chicago"),
    (-18_000, "New York"),
    (-10_800, "Sao Paulo"),
    (0, "London"),
    (3_600, "Berlin"),
    (7_200, "Cairo"),
    (10_800, "Moscow"),
    (14_400, "Dubai"),
    (19_800, "Mumbai"),
    (25_200, "Bangkok"),
    (28_800, "Shanghai"),
    (32_400, "Tokyo"),
    (36_000, "Sydney"),
    (43_200, "Auckland"),
];

pub fn place_for_offset(offset_secs: i32) -> String {
    if let Some((_, place)) = OFFSET_PLACES.iter().find(|(o, _)| *o == offset_secs) {
        return (*place).to_string();
    }
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    format!("UTC{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

/// `"<place> HH:MM~HH:MM"` for the block; unknown ends render as `--:--`.
pub fn window_label(block: Option<&QuotaBlock>, zone: &DisplayZone) -> String {
    let clock = |ts: Option<DateTime<Utc>>| {
        ts.map(|t| zone.clock(t))
            .unwrap_or_else(|| CLOCK_PLACEHOLDER.to_string())
    };
    let start = clock(block.and_then(|b| b.start_time));
    let end = clock(block.and_then(|b| b.end_time));
    format!("{} {start}~{end}", zone.place())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: &str, end: &str) -> QuotaBlock {
        QuotaBlock {
            is_active: true,
            start_time: DateTime::parse_from_rfc3339(start)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            end_time: DateTime::parse_from_rfc3339(end)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            ..QuotaBlock::default()
        }
    }

    #[test]
    fn resolves_named_zone() {
        let zone = DisplayZone::resolve(Some("Asia/Shanghai"));
        assert_eq!(zone, DisplayZone::Named(chrono_tz::Asia::Shanghai));
        assert_eq!(zone.place(), "Shanghai");
        assert_eq!(DisplayZone::resolve(Some("America/New_York")).place(), "New York");
    }

    #[test]
    fn resolves_offsets() {
        assert_eq!(
            DisplayZone::resolve(Some("UTC+8")),
            DisplayZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap())
        );
        assert_eq!(
            DisplayZone::resolve(Some("+05:30")),
            DisplayZone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap())
        );
        assert_eq!(
            DisplayZone::resolve(Some("gmt-0500")),
            DisplayZone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap())
        );
        assert_eq!(
            DisplayZone::resolve(Some("UTC")),
            DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap())
        );
    }

    #[test]
    fn unknown_override_uses_host() {
        assert_eq!(DisplayZone::resolve(Some("Mars/Olympus")), DisplayZone::Local);
        assert_eq!(DisplayZone::resolve(Some("UTC+99")), DisplayZone::Local);
        assert_eq!(DisplayZone::resolve(Some("  ")), DisplayZone::Local);
        assert_eq!(DisplayZone::resolve(None), DisplayZone::Local);
    }

    #[test]
    fn places_for_offsets() {
        assert_eq!(place_for_offset(28_800), "Shanghai");
        assert_eq!(place_for_offset(0), "London");
        assert_eq!(place_for_offset(20_700), "UTC+05:45");
        assert_eq!(place_for_offset(-12_600), "UTC-03:30");
    }

    #[test]
    fn label_in_named_zone() {
        let zone = DisplayZone::resolve(Some("Asia/Tokyo"));
        let b = block("2025-08-20T01:00:00Z", "2025-08-20T06:00:00Z");
        assert_eq!(window_label(Some(&b), &zone), "Tokyo 10:00~15:00");
    }

    #[test]
    fn label_in_fixed_zone() {
        let zone = DisplayZone::resolve(Some("UTC+8"));
        let b = block("2025-08-20T18:00:00Z", "2025-08-20T23:00:00Z");
        assert_eq!(window_label(Some(&b), &zone), "Shanghai 02:00~07:00");
    }

    #[test]
    fn label_without_block() {
        let zone = DisplayZone::resolve(Some("UTC"));
        assert_eq!(window_label(None, &zone), "London --:--~--:--");
        let partial = block("2025-08-20T18:00:00Z", "garbage");
        assert_eq!(window_label(Some(&partial), &zone), "London 18:00~--:--");
    }
}
