//! Streamed gap recovery: turn the backend's line stream into a bounded log
//! plus the latest progress record. Stopping is done by aborting the future
//! (see [`crate::task::cancellable`]); there is no client-side resume.

use std::collections::VecDeque;

use tracing::{info, warn};

use crate::api::backfill::RecoveryRequest;
use crate::api::ScantonClient;
use crate::error::ScantonError;
use crate::stream::{parse_line, LineBuffer, RecoveryProgress, StreamEvent};
use crate::transport::Transport;

pub const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryLog {
    pub phase: RecoveryPhase,
    pub lines: VecDeque<String>,
    pub progress: Option<RecoveryProgress>,
    pub error: Option<String>,
}

impl RecoveryLog {
    pub fn start(&mut self) {
        *self = Self {
            phase: RecoveryPhase::Running,
            ..Self::default()
        };
    }

    pub fn is_running(&self) -> bool {
        self.phase == RecoveryPhase::Running
    }

    fn push_line(&mut self, line: String) {
        if self.lines.len() == MAX_LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Log(text) => self.push_line(text),
            StreamEvent::Progress(progress) => {
                if let Some(message) = &progress.message {
                    self.push_line(message.clone());
                }
                if let Some(error) = &progress.error {
                    self.error = Some(error.clone());
                } else if progress.kind.as_deref() == Some("error") {
                    self.error = Some(
                        progress
                            .message
                            .clone()
                            .unwrap_or_else(|| "Recovery failed".to_string()),
                    );
                }
                self.progress = Some(progress);
            }
        }
    }

    /// Settle the phase once the stream has ended one way or another.
    pub fn finish(&mut self, result: &Result<(), ScantonError>) {
        self.phase = match result {
            Ok(()) if self.error.is_some() => RecoveryPhase::Failed,
            Ok(()) => RecoveryPhase::Completed,
            Err(ScantonError::Aborted) => {
                self.push_line("Recovery stopped by user".to_string());
                RecoveryPhase::Stopped
            }
            Err(e) => {
                self.error = Some(e.to_string());
                RecoveryPhase::Failed
            }
        };
    }

    /// Percent complete from the latest record, derived from the gap counter
    /// when the backend does not send one.
    pub fn percent(&self) -> Option<f64> {
        let progress = self.progress.as_ref()?;
        if let Some(p) = progress.percent {
            return Some(p.clamp(0.0, 100.0));
        }
        match (progress.gap_index, progress.total_gaps) {
            (Some(i), Some(total)) if total > 0 => Some(i as f64 / total as f64 * 100.0),
            _ => None,
        }
    }
}

/// Drive one recovery run, forwarding each parsed line to `on_event`.
pub async fn run_recovery<T: Transport>(
    client: &ScantonClient<T>,
    request: &RecoveryRequest,
    on_event: &mut dyn FnMut(StreamEvent),
) -> Result<(), ScantonError> {
    info!("Starting gap recovery (dry run: {})", request.dry_run);
    let mut buffer = LineBuffer::new();
    {
        let mut on_chunk = |chunk: &[u8]| {
            for line in buffer.push(chunk) {
                if let Some(event) = parse_line(&line) {
                    on_event(event);
                }
            }
        };
        if let Err(e) = client.recover_gaps(request, &mut on_chunk).await {
            warn!("Gap recovery stream failed: {}", e);
            return Err(e);
        }
    }
    if let Some(event) = buffer.finish().as_deref().and_then(parse_line) {
        on_event(event);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::task::cancellable;
    use crate::transport::mock::{MockTransport, Reply};
    use crate::transport::Method;

    #[tokio::test]
    async fn test_stream_fills_log_and_progress() {
        let transport = MockTransport::new().on(
            Method::Post,
            "/api/backfill/gaps/recover",
            Reply::Chunks(vec![
                "data: {\"type\":\"progress\",\"gapIndex\":1,\"totalGaps\":4,\"mess".to_string(),
                "age\":\"gap 1 of 4\"}\nfetching updates\n".to_string(),
                "data: {\"type\":\"complete\",\"done\":true,\"recoveredEvents\":310}".to_string(),
            ]),
        );
        let client = ScantonClient::with_transport(ApiConfig::default(), transport);
        let mut log = RecoveryLog::default();
        log.start();
        let result = run_recovery(&client, &RecoveryRequest::default(), &mut |e| log.apply(e)).await;
        log.finish(&result);

        assert_eq!(log.phase, RecoveryPhase::Completed);
        assert_eq!(log.lines, vec!["gap 1 of 4", "fetching updates"]);
        assert_eq!(log.progress.as_ref().unwrap().recovered_events, Some(310));
    }

    #[tokio::test]
    async fn test_http_failure_marks_failed() {
        let transport = MockTransport::new().on(
            Method::Post,
            "/api/backfill/gaps/recover",
            Reply::Status(502),
        );
        let client = ScantonClient::with_transport(ApiConfig::default(), transport);
        let mut log = RecoveryLog::default();
        log.start();
        let result = run_recovery(&client, &RecoveryRequest::default(), &mut |e| log.apply(e)).await;
        log.finish(&result);
        assert_eq!(log.phase, RecoveryPhase::Failed);
        assert!(log.error.as_deref().unwrap().contains("502"));
    }

    #[tokio::test]
    async fn test_abort_marks_stopped() {
        let (run, handle) = cancellable(futures_util::future::pending::<Result<(), ScantonError>>());
        handle.abort();
        let result = run.await;
        let mut log = RecoveryLog::default();
        log.start();
        log.finish(&result);
        assert_eq!(log.phase, RecoveryPhase::Stopped);
        assert!(!log.is_running());
    }

    #[test]
    fn test_error_record_without_error_field_fails_run() {
        let mut log = RecoveryLog::default();
        log.start();
        let event = parse_line("data: {\"type\":\"error\",\"message\":\"DuckDB write failed\"}").unwrap();
        log.apply(event);
        log.finish(&Ok(()));
        assert_eq!(log.phase, RecoveryPhase::Failed);
        assert_eq!(log.error.as_deref(), Some("DuckDB write failed"));
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = RecoveryLog::default();
        for i in 0..MAX_LOG_LINES + 10 {
            log.apply(StreamEvent::Log(format!("line {}", i)));
        }
        assert_eq!(log.lines.len(), MAX_LOG_LINES);
        assert_eq!(log.lines.front().map(String::as_str), Some("line 10"));
    }

    #[test]
    fn test_percent_from_gap_counter() {
        let mut log = RecoveryLog::default();
        log.apply(StreamEvent::Progress(RecoveryProgress {
            gap_index: Some(3),
            total_gaps: Some(12),
            ..Default::default()
        }));
        assert_eq!(log.percent(), Some(25.0));
    }
}
