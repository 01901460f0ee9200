use anyhow::{Context, Result};
use std::panic::{self, AssertUnwindSafe};

use claude_dotline::cli::Args;
use claude_dotline::config::Config;
use claude_dotline::display::{compose, StatusLine, FALLBACK_LINE};
use claude_dotline::models::HookJson;
use claude_dotline::oracle::OracleClient;
use claude_dotline::palette::Tone;
use claude_dotline::utils::{format_currency, read_stdin};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args);
    if !config.debug {
        // Keep stderr quiet in the statusline; the fallback line is enough.
        panic::set_hook(Box::new(|_| {}));
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| render(&config)));
    match outcome {
        Ok(Ok(Some((hook, status)))) => {
            println!("{}", status.render());
            if config.debug {
                print_debug(&hook, &config, &status);
            }
        }
        Ok(Ok(None)) => println!("{FALLBACK_LINE}"),
        Ok(Err(err)) => {
            if config.debug {
                eprintln!("[debug] {err:#}");
            }
            println!("{FALLBACK_LINE}");
        }
        Err(_) => {
            if config.debug {
                eprintln!("[debug] statusline rendering panicked");
            }
            println!("{FALLBACK_LINE}");
        }
    }
    Ok(())
}

/// `None` when stdin carried nothing to render.
fn render(config: &Config) -> Result<Option<(HookJson, StatusLine)>> {
    let stdin = read_stdin().context("read stdin")?;
    if stdin.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let hook: HookJson = serde_json::from_slice(&stdin).context("parse hook json")?;
    let source = OracleClient::new(config.ccusage_bin.clone(), config.debug);
    let status = compose(&hook, config, &source);
    Ok(Some((hook, status)))
}

fn print_debug(hook: &HookJson, config: &Config, status: &StatusLine) {
    eprintln!();
    eprintln!("{}", Tone::Muted.paint("=== Debug Information ==="));
    eprintln!(
        "Session: {} (Claude Code {})",
        hook.session_id.as_deref().unwrap_or("-"),
        hook.version.as_deref().unwrap_or("unknown")
    );
    eprintln!(
        "Model: {} (id: {})",
        hook.model_name(),
        if hook.model_id().is_empty() { "-" } else { hook.model_id() }
    );
    match (hook.transcript(), status.usage) {
        (None, _) => eprintln!("Transcript: none in session payload"),
        (Some(path), None) => eprintln!("Transcript: {path} (no assistant usage found)"),
        (Some(path), Some(u)) => eprintln!(
            "Transcript: {path} (input={}, cache_create={}, cache_read={}, output={})",
            u.input_tokens, u.cache_creation_input_tokens, u.cache_read_input_tokens, u.output_tokens
        ),
    }
    eprintln!(
        "Context: {} / {} tokens ({}%, window: {:?})",
        status.tokens, status.context_limit, status.token_percent, config.context_window
    );
    eprintln!(
        "ccusage: {} ({})",
        config.ccusage_bin,
        if status.oracle_available { "available" } else { "not found" }
    );
    if status.subscription {
        eprintln!(
            "Plan: tier={}, ceiling={:?} tokens",
            config.plan_tier.map(|t| t.as_str()).unwrap_or("custom"),
            config.quota_ceiling()
        );
        match (&status.quota, status.quota_percent) {
            (None, _) => eprintln!("Quota: no active block"),
            (Some(b), Some((pct, src))) => eprintln!(
                "Quota: {}% of block ({} tokens, source: {})",
                pct,
                b.total_tokens,
                src.as_str()
            ),
            (Some(b), None) => eprintln!("Quota: active block without a percentage ({} tokens)", b.total_tokens),
        }
        if let Some(label) = &status.window {
            eprintln!("Window: {label} (tz override: {:?})", config.timezone);
        }
    }
    if let Some(costs) = &status.costs {
        eprintln!(
            "Cost: today=${}, month=${}, history={} days, delta={:?}",
            format_currency(costs.daily_cost),
            format_currency(costs.monthly_cost),
            costs.history.len(),
            status.cost_delta
        );
    }
    eprintln!(
        "Config: layout={:?}, file={}",
        config.layout,
        config
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    eprintln!("{}", Tone::Muted.paint("========================"));
}
