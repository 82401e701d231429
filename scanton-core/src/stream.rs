//! Line framing for streamed recovery responses.
//!
//! The backend writes newline-delimited records. Lines starting with
//! `data: ` carry a JSON progress object; anything else, including a
//! `data: ` payload that is not JSON, is plain log text.

use serde::{Deserialize, Serialize};

const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecoveryProgress {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub gap_index: Option<u32>,
    pub total_gaps: Option<u32>,
    pub recovered_events: Option<u64>,
    pub percent: Option<f64>,
    pub done: bool,
    pub error: Option<String>,
}

impl RecoveryProgress {
    pub fn is_terminal(&self) -> bool {
        self.done || matches!(self.kind.as_deref(), Some("complete") | Some("error"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Progress(RecoveryProgress),
    Log(String),
}

/// Parse one complete line. Blank lines yield nothing.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }
    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) => match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(value) if value.is_object() => serde_json::from_value(value)
                .map(StreamEvent::Progress)
                .ok()
                .or_else(|| Some(StreamEvent::Log(payload.to_string()))),
            _ => Some(StreamEvent::Log(payload.to_string())),
        },
        None => Some(StreamEvent::Log(line.to_string())),
    }
}

/// Reassembles lines across arbitrary chunk boundaries, including ones that
/// split a multi-byte character.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_line_with_json_is_progress() {
        let event = parse_line(r#"data: {"type":"progress","gapIndex":2,"totalGaps":5,"percent":40.0}"#)
            .unwrap();
        match event {
            StreamEvent::Progress(p) => {
                assert_eq!(p.kind.as_deref(), Some("progress"));
                assert_eq!(p.gap_index, Some(2));
                assert_eq!(p.total_gaps, Some(5));
                assert!(!p.is_terminal());
            }
            other => panic!("expected progress, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_lines_are_log_text() {
        assert_eq!(
            parse_line("data: fetching updates 10-20"),
            Some(StreamEvent::Log("fetching updates 10-20".to_string()))
        );
        assert_eq!(
            parse_line("plain backend output\r"),
            Some(StreamEvent::Log("plain backend output".to_string()))
        );
        assert_eq!(
            parse_line("data: [1,2]"),
            Some(StreamEvent::Log("[1,2]".to_string()))
        );
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn test_complete_record_is_terminal() {
        match parse_line(r#"data: {"type":"complete","recoveredEvents":120}"#) {
            Some(StreamEvent::Progress(p)) => assert!(p.is_terminal()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_buffer_reassembles_split_lines() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: {\"type\":").is_empty());
        let lines = buf.push(b"\"progress\"}\nlog one\nlog t");
        assert_eq!(lines, vec!["data: {\"type\":\"progress\"}", "log one"]);
        assert_eq!(buf.push(b"wo\n"), vec!["log two"]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_buffer_handles_split_utf8_and_tail() {
        let mut buf = LineBuffer::new();
        let bytes = "gap ✓ done".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xE2).unwrap() + 1;
        assert!(buf.push(&bytes[..split]).is_empty());
        assert!(buf.push(&bytes[split..]).is_empty());
        assert_eq!(buf.finish().as_deref(), Some("gap ✓ done"));
    }
}
