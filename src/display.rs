//! # Display Module
//!
//! Assembles the statusline from the session, the transcript and the usage
//! source. Every segment has a fallback, so composing never fails.

use std::path::Path;

use crate::cli::LayoutArg;
use crate::config::Config;
use crate::glyph;
use crate::models::{CostSnapshot, HookJson, PercentSource, QuotaBlock, UsageRecord};
use crate::oracle::UsageSource;
use crate::palette::Tone;
use crate::transcript;
use crate::utils::{context_limit, cost_delta, format_currency, token_percent, visible_width};
use crate::window::{window_label, DisplayZone};

/// Printed when stdin is empty or cannot be understood.
pub const FALLBACK_LINE: &str = "Claude Code ❯ [waiting for valid input]";

const SEGMENT_GAP: &str = "  ";
const FILLER: char = '⠀';

/// Rendered lines plus the figures behind them, kept for the debug block.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub lines: Vec<String>,
    pub usage: Option<UsageRecord>,
    pub tokens: u64,
    pub context_limit: u64,
    pub token_percent: u32,
    pub oracle_available: bool,
    pub subscription: bool,
    pub quota: Option<QuotaBlock>,
    pub quota_percent: Option<(u32, PercentSource)>,
    pub window: Option<String>,
    pub costs: Option<CostSnapshot>,
    pub cost_delta: Option<i64>,
}

impl StatusLine {
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// `<bar> <N%>` in one accent; the bar is clamped, the label is not.
fn progress_segment(percent: u32, tone: Tone) -> String {
    format!(
        "{} {}",
        tone.paint(glyph::render(percent)),
        tone.paint(&format!("{percent}%"))
    )
}

fn delta_suffix(delta: Option<i64>) -> String {
    match delta {
        Some(d) if d > 0 => format!(
            "{}{}{}",
            Tone::Cost.paint("("),
            Tone::Increase.paint(&format!("+{d}%")),
            Tone::Cost.paint(")")
        ),
        Some(d) => format!(
            "{}{}{}",
            Tone::Cost.paint("("),
            Tone::Decrease.paint(&format!("{d}%")),
            Tone::Cost.paint(")")
        ),
        None => String::new(),
    }
}

fn cost_segment(costs: &CostSnapshot, delta: Option<i64>) -> String {
    let figures = format!(
        "${}/{}",
        format_currency(costs.daily_cost),
        format_currency(costs.monthly_cost)
    );
    format!("{}{}", Tone::Cost.paint(&figures), delta_suffix(delta))
}

pub fn compose(session: &HookJson, config: &Config, source: &dyn UsageSource) -> StatusLine {
    let mut status = StatusLine {
        subscription: config.subscription_mode(),
        ..StatusLine::default()
    };

    status.usage = session
        .transcript()
        .and_then(|p| transcript::last_usage(Path::new(p)));
    status.tokens = status.usage.map(|u| u.total()).unwrap_or(0);
    status.context_limit = context_limit(
        session.model_id(),
        session.model_name(),
        config.context_window,
        config.context_limit,
    );
    status.token_percent = token_percent(status.tokens, status.context_limit);

    let model_segment = Tone::Model.paint(session.model_name());
    let token_segment = progress_segment(status.token_percent, Tone::Context);

    // Unavailable oracle: no subprocess at all, placeholders below.
    status.oracle_available = source.is_available();

    let mut trailing: Vec<String> = Vec::new();
    if let Some(ceiling) = config.quota_ceiling() {
        if status.oracle_available {
            status.quota = source.query_active_block(Some(ceiling));
        }
        status.quota_percent = status
            .quota
            .as_ref()
            .and_then(QuotaBlock::usage_percent_with_source);
        let quota_pct = status.quota_percent.map(|(p, _)| p).unwrap_or(0);
        trailing.push(progress_segment(quota_pct, Tone::Quota));

        let zone = DisplayZone::resolve(config.timezone.as_deref());
        let label = window_label(status.quota.as_ref(), &zone);
        trailing.push(Tone::Clock.paint(&label));
        status.window = Some(label);
    } else {
        let mut costs = CostSnapshot::default();
        if status.oracle_available {
            costs = source.query_daily_costs(config.history_days);
            costs.monthly_cost = source.query_monthly_cost();
        }
        status.cost_delta = costs
            .daily_cost
            .and_then(|today| cost_delta(today, &costs.history));
        trailing.push(cost_segment(&costs, status.cost_delta));
        status.costs = Some(costs);
    }

    status.lines = match config.layout {
        LayoutArg::Single => {
            let mut all = vec![model_segment, token_segment];
            all.extend(trailing);
            vec![all.join(SEGMENT_GAP)]
        }
        LayoutArg::Dual => {
            let filler: String = std::iter::repeat_n(FILLER, visible_width(&model_segment)).collect();
            let first = [model_segment, token_segment].join(SEGMENT_GAP);
            let second = format!("{filler}{SEGMENT_GAP}{}", trailing.join(SEGMENT_GAP));
            vec![first, second]
        }
    };
    status
}
