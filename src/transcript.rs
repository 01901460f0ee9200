//! # Transcript Module
//!
//! Reads the token usage of the latest assistant turn from a Claude Code
//! transcript (one JSON record per line).

use std::fs;
use std::path::Path;

use crate::models::UsageRecord;

/// Usage of the most recent assistant turn that reports all four counters.
///
/// Lines that are not valid JSON, belong to other roles, or carry partial
/// usage are skipped. A missing or unreadable file yields `None`.
pub fn last_usage(transcript_path: &Path) -> Option<UsageRecord> {
    let raw = fs::read(transcript_path).ok()?;
    // Split on raw bytes so a line with invalid UTF-8 cannot end the scan early.
    raw.split(|b| *b == b'\n')
        .rev()
        .find_map(|line| UsageRecord::from_line(&String::from_utf8_lossy(line)))
}

/// Total tokens of the latest assistant turn, or 0 when nothing qualifies.
pub fn extract(transcript_path: &Path) -> u64 {
    last_usage(transcript_path)
        .map(|u| u.total())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn transcript(lines: &[&str]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for l in lines {
            writeln!(f, "{l}").unwrap();
        }
        f.flush().unwrap();
        f
    }

    const ASSISTANT_15: &str = r#"{"type":"assistant","message":{"usage":{"input_tokens":10,"cache_creation_input_tokens":0,"cache_read_input_tokens":0,"output_tokens":5}}}"#;

    #[test]
    fn single_assistant_record() {
        let f = transcript(&[ASSISTANT_15]);
        assert_eq!(extract(f.path()), 15);
    }

    #[test]
    fn empty_file_is_zero() {
        let f = transcript(&[]);
        assert_eq!(extract(f.path()), 0);
    }

    #[test]
    fn malformed_lines_are_zero() {
        let f = transcript(&["{not json", "]]", "", "null", "42"]);
        assert_eq!(extract(f.path()), 0);
    }

    #[test]
    fn missing_file_is_zero() {
        assert_eq!(extract(Path::new("/nonexistent/transcript.jsonl")), 0);
    }

    #[test]
    fn latest_qualifying_record_wins() {
        let f = transcript(&[
            r#"{"type":"assistant","message":{"usage":{"input_tokens":1,"cache_creation_input_tokens":2,"cache_read_input_tokens":3,"output_tokens":4}}}"#,
            r#"{"type":"assistant","message":{"usage":{"input_tokens":100,"cache_creation_input_tokens":200,"cache_read_input_tokens":300000,"output_tokens":400}}}"#,
            // partial usage is skipped
            r#"{"type":"assistant","message":{"usage":{"input_tokens":7,"output_tokens":8}}}"#,
            // other roles are skipped even with full usage
            r#"{"type":"user","message":{"usage":{"input_tokens":9,"cache_creation_input_tokens":9,"cache_read_input_tokens":9,"output_tokens":9}}}"#,
            "{broken",
        ]);
        assert_eq!(extract(f.path()), 300_700);
        let rec = last_usage(f.path()).unwrap();
        assert_eq!(rec.cache_read_input_tokens, 300_000);
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "{ASSISTANT_15}").unwrap();
        f.write_all(&[0xff, 0xfe, b'{', b'\n']).unwrap();
        f.flush().unwrap();
        assert_eq!(extract(f.path()), 15);
    }

    #[test]
    fn assistant_without_usage_is_skipped() {
        let f = transcript(&[
            ASSISTANT_15,
            r#"{"type":"assistant","message":{"content":"hi"}}"#,
            r#"{"type":"assistant"}"#,
        ]);
        assert_eq!(extract(f.path()), 15);
    }
}
