//! Logging utilities and the on-screen rolling log

use std::collections::VecDeque;

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Severity of a rolling log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational message
    Info,
    /// Error, always shown on screen
    Error,
}

/// One human-visible log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Severity
    pub level: LogLevel,
    /// Message text
    pub message: String,
}

/// Bounded log of human-visible messages, most recent first
///
/// Every entry is also forwarded to the `log` facade.
#[derive(Debug, Clone)]
pub struct RollingLog {
    entries: VecDeque<LogEntry>,
    max: usize,
}

impl RollingLog {
    /// Create a log keeping at most `max` entries
    pub fn new(max: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max),
            max: max.max(1),
        }
    }

    /// Record an informational message
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.push(LogEntry {
            level: LogLevel::Info,
            message,
        });
    }

    /// Record an error message
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.push(LogEntry {
            level: LogLevel::Error,
            message,
        });
    }

    /// Append an entry without forwarding it to the `log` facade
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.max);
    }

    /// Entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Whether any retained entry is an error
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for RollingLog {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_recent_first_and_bounded() {
        let mut log = RollingLog::new(2);
        log.info("one");
        log.info("two");
        log.error("three");

        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["three", "two"]);
        assert!(log.has_errors());
    }

    #[test]
    fn test_clear() {
        let mut log = RollingLog::new(4);
        log.error("boom");
        log.clear();
        assert!(log.is_empty());
        assert!(!log.has_errors());
    }
}
