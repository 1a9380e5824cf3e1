//! Shared message log primitives for CLI and future UIs.
use std::collections::VecDeque;

use runtime::{Notice, NoticeKind, NoticeLevel};

/// Snapshot of a single message entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEntry {
    pub text: String,
    /// Unix milliseconds, when the frontend stamps entries
    pub timestamp: Option<u64>,
    pub level: NoticeLevel,
    pub kind: NoticeKind,
}

impl MessageEntry {
    pub fn new(text: impl Into<String>, timestamp: Option<u64>, level: NoticeLevel) -> Self {
        Self {
            text: text.into(),
            timestamp,
            level,
            kind: NoticeKind::Transient,
        }
    }

    pub fn from_notice(notice: &Notice, timestamp: Option<u64>) -> Self {
        Self {
            text: notice.text.clone(),
            timestamp,
            level: notice.level,
            kind: notice.kind,
        }
    }
}

/// Circular buffer of messages displayed to the player.
///
/// A progress entry is replaced by whatever is pushed after it, so a command
/// shows one line that moves from "Submitting..." to its result.
#[derive(Clone, Debug)]
pub struct MessageLog {
    entries: VecDeque<MessageEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let bounded_capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(bounded_capacity),
            capacity: bounded_capacity,
        }
    }

    pub fn push(&mut self, entry: MessageEntry) {
        if self
            .entries
            .back()
            .is_some_and(|last| last.kind == NoticeKind::Progress)
        {
            self.entries.pop_back();
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn push_notice(&mut self, notice: &Notice, timestamp: Option<u64>) {
        self.push(MessageEntry::from_notice(notice, timestamp));
    }

    pub fn push_text(&mut self, message: impl Into<String>) {
        self.push(MessageEntry::new(message, None, NoticeLevel::Info));
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter().rev().take(limit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entries_fall_off() {
        let mut log = MessageLog::new(2);
        log.push_text("one");
        log.push_text("two");
        log.push_text("three");

        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.recent(1).next().unwrap().text, "three");
    }

    #[test]
    fn progress_is_superseded() {
        let mut log = MessageLog::new(8);
        log.push_notice(&Notice::progress("Submitting guess..."), None);
        log.push_notice(&Notice::success("Guess confirmed."), Some(5));

        assert_eq!(log.len(), 1);
        let entry = log.iter().next().unwrap();
        assert_eq!(entry.level, NoticeLevel::Success);
        assert_eq!(entry.timestamp, Some(5));
    }
}
