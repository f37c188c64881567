//! Sync notifications.
//!
//! The sync orchestrator reports every run through a [`Notifier`]: success,
//! partial update, or failure. Delivery is pluggable. [`LogNotifier`] reports
//! through `tracing`, tagging each event with the configured recipient so a
//! log shipper can route it.

use std::fmt;

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Failure,
}

impl Level {
    pub fn icon(self) -> &'static str {
        match self {
            Level::Success => "✅",
            Level::Warning => "⚠️",
            Level::Failure => "❌",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.icon())
    }
}

/// Side channel for sync reports. Delivery failures are the notifier's own
/// business and never fail the sync.
pub trait Notifier {
    fn notify(&self, level: Level, subject: &str, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, level: Level, subject: &str, message: &str) {
        (**self).notify(level, subject, message)
    }
}

/// Reports notifications as log events.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    prefix: String,
    recipient: Option<String>,
}

impl LogNotifier {
    pub fn new(prefix: impl Into<String>, recipient: Option<&str>) -> Self {
        Self {
            prefix: prefix.into(),
            recipient: recipient.map(str::to_string),
        }
    }

    /// `[<prefix>] <icon> <subject>`
    pub fn subject_line(&self, level: Level, subject: &str) -> String {
        format!("[{}] {level} {subject}", self.prefix)
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, level: Level, subject: &str, message: &str) {
        let subject = self.subject_line(level, subject);
        let to = self.recipient.as_deref().unwrap_or("-");
        match level {
            Level::Success => tracing::info!(to, %subject, message, "notification"),
            Level::Warning => tracing::warn!(to, %subject, message, "notification"),
            Level::Failure => tracing::error!(to, %subject, message, "notification"),
        }
    }
}
