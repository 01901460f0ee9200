use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTierArg {
    Pro,
    Max5x,
    Max20x,
}

impl PlanTierArg {
    /// Token ceiling handed to `ccusage blocks --token-limit`.
    pub fn token_ceiling(self) -> u64 {
        match self {
            PlanTierArg::Pro => 4_000_000,
            PlanTierArg::Max5x => 20_000_000,
            PlanTierArg::Max20x => 80_000_000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanTierArg::Pro => "pro",
            PlanTierArg::Max5x => "max5x",
            PlanTierArg::Max20x => "max20x",
        }
    }

    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pro" => Some(PlanTierArg::Pro),
            "max5x" | "max_5x" | "max-5x" | "5x" => Some(PlanTierArg::Max5x),
            "max20x" | "max_20x" | "max-20x" | "20x" => Some(PlanTierArg::Max20x),
            _ => None,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextWindowArg {
    /// Whole context window (200k, or 1M for [1m] models)
    #[default]
    Full,
    /// 80% of the window, where auto-compact usually triggers
    Usable,
}

impl ContextWindowArg {
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(ContextWindowArg::Full),
            "usable" | "safe" => Some(ContextWindowArg::Usable),
            _ => None,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutArg {
    /// Everything on one line
    #[default]
    Single,
    /// Quota/cost on a second line, bars aligned under each other
    Dual,
}

impl LayoutArg {
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "1" => Some(LayoutArg::Single),
            "dual" | "double" | "2" => Some(LayoutArg::Dual),
            _ => None,
        }
    }
}

#[derive(clap::Parser, Debug, Default)]
#[command(name = "claude-dotline", version, about = "Braille statusline for Claude Code")]
pub struct Args {
    // Env-backed values stay strings; `Config` parses them leniently.
    /// Plan tier: pro|max5x|max20x. Enables the quota bar and time window
    #[arg(long, env = "CLAUDE_PLAN_TIER")]
    pub plan_tier: Option<String>,

    /// Quota ceiling in tokens, e.g. 20000000 or 20m (overrides the tier ceiling)
    #[arg(long, env = "CLAUDE_PLAN_MAX_TOKENS")]
    pub plan_max_tokens: Option<String>,

    /// Timezone for the window label: IANA name (Asia/Tokyo) or offset (UTC+8)
    #[arg(long, env = "CLAUDE_STATUSLINE_TZ")]
    pub timezone: Option<String>,

    /// Context window basis: full|usable
    #[arg(long, value_enum)]
    pub context_window: Option<ContextWindowArg>,

    /// Context limit in tokens, e.g. 200000 or 200k (overrides model detection)
    #[arg(long, env = "CLAUDE_CONTEXT_LIMIT")]
    pub context_limit: Option<String>,

    /// Line layout: single|dual
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// ccusage executable name or path
    #[arg(long, env = "CCUSAGE_BIN")]
    pub ccusage_bin: Option<String>,

    /// Days of daily cost history used for the average comparison
    #[arg(long)]
    pub history_days: Option<u32>,

    /// key=value config file (default: ~/.claude/statusline.env)
    #[arg(long, env = "CLAUDE_STATUSLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug mode: show detailed calculation information
    #[arg(
        long,
        env = "CLAUDE_DEBUG",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub debug: bool,
}

impl Args {
    /// Parse the command line. `--help` and `--version` exit as usual; any
    /// other argument error drops the flags and keeps environment values, so a
    /// line is still printed.
    pub fn parse() -> Self {
        match <Args as clap::Parser>::try_parse() {
            Ok(args) => args,
            Err(err) => Self::recover(err),
        }
    }

    fn recover(err: clap::Error) -> Self {
        use clap::error::ErrorKind;
        if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            err.exit();
        }
        let program = std::env::args_os()
            .next()
            .unwrap_or_else(|| "claude-dotline".into());
        let args = <Args as clap::Parser>::try_parse_from([program]).unwrap_or_default();
        if args.debug {
            eprintln!("[debug] arguments ignored: {}", err.kind());
        }
        args
    }
}
