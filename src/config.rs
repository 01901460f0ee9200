//! # Config Module
//!
//! Resolves runtime settings. Precedence: CLI flag, then environment variable
//! (both handled by clap), then the key=value config file, then defaults.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{Args, ContextWindowArg, LayoutArg, PlanTierArg};
use crate::utils::{parse_bool, parse_token_count};

pub const DEFAULT_CCUSAGE_BIN: &str = "ccusage";
pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const MAX_HISTORY_DAYS: u32 = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub debug: bool,
    pub plan_tier: Option<PlanTierArg>,
    pub plan_max_tokens: Option<u64>,
    pub timezone: Option<String>,
    pub context_window: ContextWindowArg,
    pub context_limit: Option<u64>,
    pub layout: LayoutArg,
    pub ccusage_bin: String,
    pub history_days: u32,
    /// Config file that contributed values, if any
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debug: false,
            plan_tier: None,
            plan_max_tokens: None,
            timezone: None,
            context_window: ContextWindowArg::Full,
            context_limit: None,
            layout: LayoutArg::Single,
            ccusage_bin: DEFAULT_CCUSAGE_BIN.to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            source: None,
        }
    }
}

impl Config {
    /// Quota ceiling when subscription mode is on: explicit max, else tier ceiling.
    pub fn quota_ceiling(&self) -> Option<u64> {
        self.plan_max_tokens
            .filter(|v| *v > 0)
            .or_else(|| self.plan_tier.map(PlanTierArg::token_ceiling))
    }

    pub fn subscription_mode(&self) -> bool {
        self.quota_ceiling().is_some()
    }

    /// Build the effective config from parsed arguments and the config file.
    /// A missing or unreadable file is not an error; defaults apply.
    pub fn load(args: &Args) -> Self {
        let (file, source) = match locate_config_file(args.config.as_deref()) {
            Some(path) => match read_env_file(&path) {
                Ok(values) => (values, Some(path)),
                Err(err) => {
                    if args.debug {
                        eprintln!("[debug] config: {err:#}");
                    }
                    (HashMap::new(), None)
                }
            },
            None => (HashMap::new(), None),
        };
        let mut cfg = Self::merge(args, &file);
        cfg.source = source;
        cfg
    }

    /// Overlay CLI/env values on top of file values.
    pub fn merge(args: &Args, file: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| lookup(file, keys);
        let defaults = Config::default();

        Config {
            debug: args.debug || get(&["DEBUG", "CLAUDE_DEBUG"]).is_some_and(parse_bool),
            plan_tier: args
                .plan_tier
                .as_deref()
                .and_then(PlanTierArg::parse_loose)
                .or_else(|| get(&["PLAN_TIER", "CLAUDE_PLAN_TIER"]).and_then(PlanTierArg::parse_loose)),
            plan_max_tokens: args
                .plan_max_tokens
                .as_deref()
                .and_then(parse_token_count)
                .or_else(|| {
                    get(&["PLAN_MAX_TOKENS", "CLAUDE_PLAN_MAX_TOKENS"]).and_then(parse_token_count)
                }),
            timezone: args
                .timezone
                .clone()
                .or_else(|| get(&["TIMEZONE", "CLAUDE_STATUSLINE_TZ"]).map(str::to_string)),
            context_window: args
                .context_window
                .or_else(|| get(&["CONTEXT_WINDOW"]).and_then(ContextWindowArg::parse_loose))
                .unwrap_or(defaults.context_window),
            context_limit: args
                .context_limit
                .as_deref()
                .and_then(parse_token_count)
                .or_else(|| get(&["CONTEXT_LIMIT", "CLAUDE_CONTEXT_LIMIT"]).and_then(parse_token_count)),
            layout: args
                .layout
                .or_else(|| get(&["LAYOUT"]).and_then(LayoutArg::parse_loose))
                .unwrap_or(defaults.layout),
            ccusage_bin: args
                .ccusage_bin
                .clone()
                .filter(|s| !s.trim().is_empty())
                .or_else(|| get(&["CCUSAGE_BIN"]).map(str::to_string))
                .unwrap_or(defaults.ccusage_bin),
            history_days: args
                .history_days
                .or_else(|| get(&["HISTORY_DAYS"]).and_then(|s| s.parse().ok()))
                .unwrap_or(defaults.history_days)
                .clamp(1, MAX_HISTORY_DAYS),
            source: None,
        }
    }
}

fn lookup<'a>(file: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| file.get(*k))
        .map(String::as_str)
        .filter(|s| !s.is_empty())
}

fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    let b = directories::BaseDirs::new()?;
    [
        b.home_dir().join(".claude").join("statusline.env"),
        b.config_dir().join("claude-dotline").join("config.env"),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    Ok(parse_env_file(&content))
}

/// Parse `KEY=value` lines. Keys are upper-cased; `#` comments, blank lines,
/// an `export ` prefix and surrounding quotes are accepted.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_uppercase();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        out.insert(key, value.to_string());
    }
    out
}
