//! Fire-and-forget notification channel.
//!
//! The catalog reports the outcome of every mutating operation here. The
//! sink's availability is not a correctness dependency: implementations must
//! not fail the calling operation.

use std::sync::Mutex;

/// How a message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A delivered message, as captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Success/failure channel with a severity tag and human-readable text.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str);
}

/// Default sink: structured log records.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        match severity {
            Severity::Info => tracing::info!(title, message, "notification"),
            Severity::Error => tracing::error!(title, message, "notification"),
        }
    }
}

/// Captures notifications for assertions in tests/dev.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, severity: Severity, title: &str, message: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(Notification {
                severity,
                title: title.to_string(),
                message: message.to_string(),
            });
        }
    }
}
