use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenLimitStatus {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub percent_used: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// One usage window as reported by `ccusage blocks -j`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaBlock {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub token_limit_status: Option<TokenLimitStatus>,
    #[serde(default)]
    pub projection: Option<Projection>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Which field of the block produced its usage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentSource {
    Limit,
    PercentUsed,
    Projection,
}

impl PercentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "token-limit",
            Self::PercentUsed => "percent-used",
            Self::Projection => "projection",
        }
    }
}

impl QuotaBlock {
    pub fn usage_percent(&self) -> Option<u32> {
        self.usage_percent_with_source().map(|(pct, _)| pct)
    }

    /// Different `ccusage` query modes fill different fields, so try them in
    /// order: explicit limit, reported percentage, then projection.
    pub fn usage_percent_with_source(&self) -> Option<(u32, PercentSource)> {
        let total = self.total_tokens;
        if let Some(status) = self.token_limit_status.as_ref() {
            if let Some(limit) = status.limit.filter(|l| *l > 0) {
                if total > 0 {
                    return Some((ratio_percent(total, limit), PercentSource::Limit));
                }
            }
            if let Some(pct) = status.percent_used.filter(|p| p.is_finite()) {
                return Some((pct.max(0.0).round() as u32, PercentSource::PercentUsed));
            }
        }
        let projected = self
            .projection
            .as_ref()
            .and_then(|p| p.total_tokens)
            .filter(|p| *p > 0)?;
        Some((ratio_percent(total, projected), PercentSource::Projection))
    }
}

fn ratio_percent(part: u64, whole: u64) -> u32 {
    ((part as f64 * 100.0) / whole as f64).round() as u32
}

// Adapted from the strict RFC 3339 helper: an unparseable timestamp drops the
// field instead of the whole block.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(|s| {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
