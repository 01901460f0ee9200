//! # Oracle Module
//!
//! Client for the `ccusage` CLI, which reports 5-hour blocks and daily/monthly
//! spend as JSON. Every failure degrades to an empty result so the statusline
//! always renders.

use chrono::{Duration as ChronoDuration, Local};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::{CostRow, CostSnapshot, QuotaBlock};

pub const BLOCKS_TIMEOUT: Duration = Duration::from_secs(5);
pub const DAILY_TIMEOUT: Duration = Duration::from_secs(10);
pub const MONTHLY_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why a `ccusage` call produced no data.
#[derive(Debug, Error)]
pub enum Unavailable {
    #[error("{0} not found on PATH")]
    NotInstalled(String),
    #[error("failed to run: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("exited with status {0:?}")]
    NonZeroExit(Option<i32>),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of quota and cost data for the composer.
pub trait UsageSource {
    fn is_available(&self) -> bool;

    /// The active block, shaping `tokenLimitStatus` with `limit_tokens` when given.
    fn query_active_block(&self, limit_tokens: Option<u64>) -> Option<QuotaBlock>;

    /// Daily costs for the trailing `since_days_ago` days; today is the last row.
    fn query_daily_costs(&self, since_days_ago: u32) -> CostSnapshot;

    fn query_monthly_cost(&self) -> Option<f64>;
}

#[derive(Debug, Clone)]
pub struct OracleClient {
    program: String,
    debug: bool,
}

impl OracleClient {
    pub fn new(program: impl Into<String>, debug: bool) -> Self {
        OracleClient {
            program: program.into(),
            debug,
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    /// Run `ccusage <args>` and parse stdout as JSON, giving up after `timeout`.
    pub fn call(&self, args: &[&str], timeout: Duration) -> Result<Value, Unavailable> {
        let exe = self
            .resolve()
            .ok_or_else(|| Unavailable::NotInstalled(self.program.clone()))?;
        let mut child = Command::new(exe)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        // Drain stdout on a separate thread so a large reply cannot fill the
        // pipe and stall the child while we poll.
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout not captured"))?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Unavailable::Timeout(timeout));
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };
        if !status.success() {
            return Err(Unavailable::NonZeroExit(status.code()));
        }
        // A grandchild may still hold the pipe after the child exits; the
        // deadline covers the read too.
        let remaining = deadline.saturating_duration_since(Instant::now());
        let body = match rx.recv_timeout(remaining) {
            Ok(body) => body,
            Err(RecvTimeoutError::Timeout) => return Err(Unavailable::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Vec::new(),
        };
        Ok(serde_json::from_slice(&body)?)
    }

    fn note(&self, what: &str, err: &Unavailable) {
        if self.debug {
            eprintln!("[debug] {} {what}: {err}", self.program);
        }
    }
}

impl UsageSource for OracleClient {
    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn query_active_block(&self, limit_tokens: Option<u64>) -> Option<QuotaBlock> {
        let limit = limit_tokens.map(|l| l.to_string());
        let mut args = vec!["blocks", "--active", "-j"];
        if let Some(l) = limit.as_deref() {
            args.extend(["--token-limit", l]);
        }
        match self.call(&args, BLOCKS_TIMEOUT) {
            Ok(v) => parse_blocks(&v).into_iter().find(|b| b.is_active),
            Err(err) => {
                self.note("blocks", &err);
                None
            }
        }
    }

    fn query_daily_costs(&self, since_days_ago: u32) -> CostSnapshot {
        let since = (Local::now() - ChronoDuration::days(i64::from(since_days_ago)))
            .format("%Y%m%d")
            .to_string();
        match self.call(&["daily", "--since", &since, "-j"], DAILY_TIMEOUT) {
            Ok(v) => CostSnapshot::from_daily_rows(&parse_daily(&v)),
            Err(err) => {
                self.note("daily", &err);
                CostSnapshot::default()
            }
        }
    }

    fn query_monthly_cost(&self) -> Option<f64> {
        match self.call(&["monthly", "-j"], MONTHLY_TIMEOUT) {
            Ok(v) => parse_monthly(&v),
            Err(err) => {
                self.note("monthly", &err);
                None
            }
        }
    }
}

/// Blocks from `{ "blocks": [...] }`; entries that do not deserialize are skipped.
pub fn parse_blocks(v: &Value) -> Vec<QuotaBlock> {
    rows(v, "blocks")
}

/// Daily rows from `{ "daily": [...] }`, oldest first.
pub fn parse_daily(v: &Value) -> Vec<CostRow> {
    rows(v, "daily")
}

/// Latest month's `totalCost` from `{ "monthly": [...] }`.
pub fn parse_monthly(v: &Value) -> Option<f64> {
    rows::<CostRow>(v, "monthly")
        .last()
        .and_then(|r| r.total_cost)
        .filter(|c| c.is_finite())
}

fn rows<T: serde::de::DeserializeOwned>(v: &Value, key: &str) -> Vec<T> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_blocks_skips_malformed_entries() {
        let v = json!({
            "blocks": [
                { "isActive": false, "totalTokens": 10 },
                { "isActive": true, "totalTokens": "lots" },
                {
                    "isActive": true,
                    "totalTokens": 2_000_000,
                    "tokenLimitStatus": { "limit": 20_000_000, "percentUsed": 10.0 },
                    "startTime": "2025-08-20T10:00:00.000Z",
                    "endTime": "2025-08-20T15:00:00.000Z"
                }
            ]
        });
        let blocks = parse_blocks(&v);
        assert_eq!(blocks.len(), 2);
        let active = blocks.into_iter().find(|b| b.is_active).unwrap();
        assert_eq!(active.total_tokens, 2_000_000);
        assert_eq!(active.usage_percent(), Some(10));
        assert!(active.start_time.is_some());
    }

    #[test]
    fn parse_blocks_missing_key() {
        assert!(parse_blocks(&json!({})).is_empty());
        assert!(parse_blocks(&json!({ "blocks": "nope" })).is_empty());
        assert!(parse_blocks(&json!([1, 2])).is_empty());
    }

    #[test]
    fn parse_daily_into_snapshot() {
        let v = json!({
            "daily": [
                { "date": "2025-08-18", "totalCost": 10.0 },
                { "date": "2025-08-19" },
                { "date": "2025-08-20", "totalCost": 12.5 }
            ]
        });
        let snap = CostSnapshot::from_daily_rows(&parse_daily(&v));
        assert_eq!(snap.daily_cost, Some(12.5));
        assert_eq!(snap.history, vec![10.0, 0.0]);
        assert_eq!(snap.monthly_cost, None);
    }

    #[test]
    fn parse_daily_empty() {
        let snap = CostSnapshot::from_daily_rows(&parse_daily(&json!({ "daily": [] })));
        assert_eq!(snap, CostSnapshot::default());
    }

    #[test]
    fn parse_monthly_takes_latest() {
        let v = json!({ "monthly": [ { "totalCost": 80.0 }, { "totalCost": 456.78 } ] });
        assert_eq!(parse_monthly(&v), Some(456.78));
        assert_eq!(parse_monthly(&json!({ "monthly": [] })), None);
        assert_eq!(parse_monthly(&json!({ "monthly": [ {} ] })), None);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let client = OracleClient::new("ccusage-definitely-not-installed-7f3a", false);
        assert!(!client.is_available());
        assert!(matches!(
            client.call(&["blocks", "-j"], BLOCKS_TIMEOUT),
            Err(Unavailable::NotInstalled(_))
        ));
        assert!(client.query_active_block(Some(1)).is_none());
        assert_eq!(client.query_daily_costs(30), CostSnapshot::default());
        assert_eq!(client.query_monthly_cost(), None);
    }

    // Scripts are written then executed; run one at a time so a concurrent
    // fork cannot hold the file open for writing (ETXTBSY).
    #[cfg(unix)]
    mod stub {
        use super::*;
        use serial_test::serial;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn stub_ccusage(script: &str) -> (TempDir, OracleClient) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("ccusage");
            fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            let client = OracleClient::new(path.to_string_lossy().into_owned(), false);
            (dir, client)
        }

        #[test]
        #[serial]
        fn dispatches_subcommands() {
            let (_dir, client) = stub_ccusage(
                r#"case "$1" in
  blocks) echo '{"blocks":[{"isActive":true,"totalTokens":5000000,"tokenLimitStatus":{"limit":20000000}}]}' ;;
  daily) echo '{"daily":[{"totalCost":10},{"totalCost":10},{"totalCost":10},{"totalCost":12}]}' ;;
  monthly) echo '{"monthly":[{"totalCost":1500}]}' ;;
  *) exit 2 ;;
esac"#,
            );
            assert!(client.is_available());
            let block = client.query_active_block(Some(20_000_000)).unwrap();
            assert_eq!(block.usage_percent(), Some(25));
            let snap = client.query_daily_costs(30);
            assert_eq!(snap.daily_cost, Some(12.0));
            assert_eq!(snap.history, vec![10.0, 10.0, 10.0]);
            assert_eq!(client.query_monthly_cost(), Some(1500.0));
        }

        #[test]
        #[serial]
        fn token_limit_is_forwarded() {
            let (_dir, client) = stub_ccusage(
                r#"for a in "$@"; do
  if [ "$prev" = "--token-limit" ]; then limit="$a"; fi
  prev="$a"
done
echo "{\"blocks\":[{\"isActive\":true,\"totalTokens\":1,\"tokenLimitStatus\":{\"limit\":${limit:-0}}}]}""#,
            );
            let block = client.query_active_block(Some(4_000_000)).unwrap();
            assert_eq!(
                block.token_limit_status.and_then(|s| s.limit),
                Some(4_000_000)
            );
        }

        #[test]
        #[serial]
        fn non_zero_exit() {
            let (_dir, client) = stub_ccusage("echo '{}'; exit 3");
            assert!(matches!(
                client.call(&["blocks"], BLOCKS_TIMEOUT),
                Err(Unavailable::NonZeroExit(Some(3)))
            ));
            assert!(client.query_active_block(None).is_none());
        }

        #[test]
        #[serial]
        fn malformed_json() {
            let (_dir, client) = stub_ccusage("echo 'Loading pricing data...'");
            assert!(matches!(
                client.call(&["daily"], DAILY_TIMEOUT),
                Err(Unavailable::Malformed(_))
            ));
            assert_eq!(client.query_daily_costs(10), CostSnapshot::default());
        }

        #[test]
        #[serial]
        fn timeout_kills_child() {
            let (_dir, client) = stub_ccusage("sleep 5");
            let started = Instant::now();
            assert!(matches!(
                client.call(&["blocks"], Duration::from_millis(200)),
                Err(Unavailable::Timeout(_))
            ));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        #[serial]
        fn lingering_pipe_holder_hits_deadline() {
            let (_dir, client) =
                stub_ccusage(r#"(sleep 3; echo) & echo '{"blocks":[]}'"#);
            let started = Instant::now();
            assert!(matches!(
                client.call(&["blocks"], Duration::from_millis(200)),
                Err(Unavailable::Timeout(_))
            ));
            assert!(started.elapsed() < Duration::from_secs(2));
        }

        #[test]
        #[serial]
        fn no_active_block() {
            let (_dir, client) =
                stub_ccusage(r#"echo '{"blocks":[{"isActive":false,"totalTokens":9}]}'"#);
            assert!(client.query_active_block(None).is_none());
        }
    }
}
