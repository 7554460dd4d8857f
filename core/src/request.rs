//! Request records and the JSONL trace reader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A single trace request, immutable once read
///
/// `arrival_time_ms` is a relative offset, not a wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique request identifier
    pub request_id: String,

    /// Prompt text
    pub prompt: String,

    /// Cap on generated output tokens
    pub max_output_tokens: u64,

    /// Arrival offset in milliseconds
    pub arrival_time_ms: i64,

    /// Session identifier for multi-turn traces; an empty string
    /// normalizes to absent
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
}

fn empty_as_none<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(d)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Read a newline-delimited JSON trace
///
/// One JSON object per line with required fields `request_id`,
/// `prompt`, `max_output_tokens`, `arrival_time_ms` and optional
/// `session_id`. Blank lines are skipped. A malformed line fails
/// immediately with the source path and 1-based line number; there is
/// no partial or best-effort mode.
pub fn read_requests(path: &Path) -> Result<Vec<Request>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let request: Request = serde_json::from_str(trimmed).map_err(|e| Error::Parse {
            path: path.display().to_string(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        out.push(request);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("loadshape-{name}-{}.jsonl", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_valid_trace() {
        let path = write_trace(
            "valid",
            concat!(
                r#"{"request_id":"r1","prompt":"hello","max_output_tokens":64,"arrival_time_ms":0}"#,
                "\n\n",
                r#"{"request_id":"r2","prompt":"world","max_output_tokens":32,"arrival_time_ms":150,"session_id":"s1"}"#,
                "\n",
            ),
        );
        let reqs = read_requests(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].request_id, "r1");
        assert_eq!(reqs[0].session_id, None);
        assert_eq!(reqs[1].session_id.as_deref(), Some("s1"));
        assert_eq!(reqs[1].arrival_time_ms, 150);
    }

    #[test]
    fn test_empty_session_id_normalizes_to_none() {
        let path = write_trace(
            "emptysid",
            r#"{"request_id":"r1","prompt":"x","max_output_tokens":1,"arrival_time_ms":0,"session_id":""}"#,
        );
        let reqs = read_requests(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(reqs[0].session_id, None);
    }

    #[test]
    fn test_missing_field_reports_line_number() {
        let path = write_trace(
            "missing",
            concat!(
                r#"{"request_id":"r1","prompt":"ok","max_output_tokens":1,"arrival_time_ms":0}"#,
                "\n",
                r#"{"request_id":"r2","prompt":"no arrival"}"#,
                "\n",
            ),
        );
        let err = read_requests(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_aborts_whole_read() {
        let path = write_trace(
            "invalid",
            concat!(
                r#"{"request_id":"r1","prompt":"ok","max_output_tokens":1,"arrival_time_ms":0}"#,
                "\n",
                "not json\n",
                r#"{"request_id":"r3","prompt":"ok","max_output_tokens":1,"arrival_time_ms":2}"#,
                "\n",
            ),
        );
        assert!(read_requests(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
