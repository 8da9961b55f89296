//! Progress notifications emitted while polling an execution.

use std::sync::Arc;

use crate::types::ExecutionStatus;

/// One progress update derived from a status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub percent: f64,
    pub completed: u32,
    pub total: u32,
    pub current_test: Option<String>,
}

/// Sink for progress events. The poller calls this once per distinct percentage.
pub type ProgressSink = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Format a progress line, e.g. `Progress: 40% (2/5 tests) - Running: login`.
#[must_use]
pub fn format_progress_line(event: &ProgressEvent) -> String {
    let mut line = format!(
        "Progress: {}% ({}/{} tests)",
        event.percent, event.completed, event.total
    );
    if let Some(test) = event.current_test.as_deref().filter(|t| !t.is_empty()) {
        line.push_str(" - Running: ");
        line.push_str(test);
    }
    line
}

/// Default sink: one `info` log line per event.
pub fn log_progress_sink() -> ProgressSink {
    Arc::new(|event: &ProgressEvent| {
        tracing::info!("{}", format_progress_line(event));
    })
}

/// Remembers the last reported percentage so repeated polls stay quiet.
#[derive(Debug, Default)]
pub(crate) struct ProgressTracker {
    last: Option<f64>,
}

impl ProgressTracker {
    /// Returns an event only when the snapshot carries a new percentage.
    pub(crate) fn observe(&mut self, status: &ExecutionStatus) -> Option<ProgressEvent> {
        let percent = status.progress?;
        if self.last == Some(percent) {
            return None;
        }
        self.last = Some(percent);

        Some(ProgressEvent {
            percent,
            completed: status.completed_tests.unwrap_or(0),
            total: status.total_tests.unwrap_or(0),
            current_test: status.current_test.clone(),
        })
    }
}
