use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::events::GameEvent;

/// Entries kept on screen.
pub const LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Offset from the log's start instant.
    pub at: Duration,
    pub message: String,
}

impl LogEntry {
    /// `mm:ss` since the session's log was created, not time of day.
    pub fn stamp(&self) -> String {
        let secs = self.at.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Rolling window of the most recent event messages.
#[derive(Debug)]
pub struct EventLog {
    started: Instant,
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            entries: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn push(&mut self, event: &GameEvent, now: Instant) {
        self.push_message(event.to_string(), now);
    }

    pub fn push_message(&mut self, message: impl Into<String>, now: Instant) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: now.saturating_duration_since(self.started),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
