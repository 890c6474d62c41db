use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::recorder::TapInterval;

pub const VISIBLE_LOG_LINES: usize = 20;
const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn line(&self) -> String {
        format!("{} {}", self.at.format("%H:%M:%S%.3f"), self.message)
    }
}

/// Bounded in-memory log shown in the event log panel
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Local::now(),
            message: message.into(),
        });
    }

    /// Log a recorded tap as its JSON form followed by its duration
    pub fn push_tap(&mut self, tap: &TapInterval, duration: u64) {
        self.push(format!("{tap}, {duration}"));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest `n` entries, oldest first
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }
}
