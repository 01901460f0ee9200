use serde::Deserialize;

pub const UNKNOWN_MODEL: &str = "Unknown";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct HookModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Session descriptor Claude Code pipes to the statusLine command on stdin.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct HookJson {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub model: Option<HookModel>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HookJson {
    pub fn model_name(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.display_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_MODEL)
    }

    pub fn model_id(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.id.as_deref())
            .unwrap_or("")
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
