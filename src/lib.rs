//! # Claude Dotline
//!
//! A braille-dot statusline for Claude Code sessions.
//!
//! ## Overview
//!
//! Reads the session JSON that Claude Code pipes on stdin and prints one or
//! two lines showing:
//! - The model name
//! - Context window usage of the latest assistant turn, as a 10-cell braille bar
//! - With a plan tier: the active 5-hour block's quota bar and its clock window
//! - Without a plan tier: today's and this month's spend, with the change
//!   against the recent daily average
//!
//! Quota and cost figures come from the `ccusage` CLI. When it is missing or
//! misbehaves the affected segment shows a placeholder and the rest of the
//! line is unaffected.
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Command-line argument parsing
pub mod cli;

/// Effective settings from flags, environment and the config file
pub mod config;

/// Statusline composition and layouts
pub mod display;

/// Braille progress bars
pub mod glyph;

/// Data models for the hook payload, transcript lines and ccusage reports
pub mod models;

/// `ccusage` subprocess client
pub mod oracle;

/// Segment colors
pub mod palette;

/// Transcript token extraction
pub mod transcript;

/// Formatting helpers and context limits
pub mod utils;

/// Block window label and display timezone
pub mod window;
