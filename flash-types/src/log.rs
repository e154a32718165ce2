// SPDX-License-Identifier: GPL-3.0-only

use std::collections::VecDeque;

/// How a log entry is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    /// A line printed by the flash script.
    #[default]
    Output,
    /// A status line written by the utility itself.
    Notice,
    /// A failure; shown highlighted.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub text: String,
}

impl LogEntry {
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Output,
            text: text.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Notice,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

/// The most recent `capacity` log entries; older ones fall off the front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl RollingLog {
    pub const SELECTOR_CAPACITY: usize = 20;
    pub const BATCH_CAPACITY: usize = 500;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest entries if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.trim();
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        self.trim();
    }

    pub fn push_output(&mut self, text: impl Into<String>) {
        self.push(LogEntry::output(text));
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.push(LogEntry::notice(text));
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.push(LogEntry::error(text));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The log as plain text, one entry per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

impl Default for RollingLog {
    fn default() -> Self {
        Self::new(Self::SELECTOR_CAPACITY)
    }
}
