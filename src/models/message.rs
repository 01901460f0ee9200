use serde::Deserialize;

/// Token counters as they appear on an assistant message. Every field must be
/// present for the record to count as a completed measurement.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageRecord {
    pub input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub output_tokens: u64,
}

impl UsageRecord {
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_creation_input_tokens)
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.output_tokens)
    }

    /// Parse one transcript line, yielding the usage only for assistant turns
    /// that carry all four counters.
    pub fn from_line(line: &str) -> Option<Self> {
        let t = line.trim();
        if t.is_empty() {
            return None;
        }
        let parsed: TranscriptLine = serde_json::from_str(t).ok()?;
        if parsed.r#type.as_deref() != Some("assistant") {
            return None;
        }
        parsed.message?.usage
    }
}

#[derive(Deserialize, Debug)]
pub struct MessageObj {
    #[serde(default, deserialize_with = "lenient_usage")]
    pub usage: Option<UsageRecord>,
}

#[derive(Deserialize, Debug)]
pub struct TranscriptLine {
    pub r#type: Option<String>,
    pub message: Option<MessageObj>,
}

// A partial usage object (missing a counter) is treated as absent instead of
// failing the whole line.
fn lenient_usage<'de, D>(deserializer: D) -> Result<Option<UsageRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value::<UsageRecord>(v).ok()))
}
