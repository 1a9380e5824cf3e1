//! Bounded, submission-ordered guess log.

use arrayvec::ArrayVec;

use game_core::{Profile, generate_hints};

use super::optimistic::Ticket;
use super::view::{GuessPhase, GuessRecord};

/// Compile-time mirror of `GameConfig::MAX_ATTEMPTS`.
const CAPACITY: usize = 8;

#[derive(Debug, Clone)]
struct Entry {
    ticket: Ticket,
    record: GuessRecord,
}

/// Guesses of the current session, one entry per accepted submission.
#[derive(Debug, Clone, Default)]
pub struct GuessLog {
    entries: ArrayVec<Entry, CAPACITY>,
}

impl GuessLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending record. Returns `false` when the log is full.
    pub fn push(&mut self, ticket: Ticket, record: GuessRecord) -> bool {
        self.entries.try_push(Entry { ticket, record }).is_ok()
    }

    /// Remove the record for `ticket`; later records move up one attempt.
    pub fn remove(&mut self, ticket: Ticket) -> Option<GuessRecord> {
        let index = self.entries.iter().position(|e| e.ticket == ticket)?;
        let removed = self.entries.remove(index);
        for entry in self.entries.iter_mut().skip(index) {
            entry.record.attempt = entry.record.attempt.saturating_sub(1);
        }
        Some(removed.record)
    }

    pub fn confirm(&mut self, ticket: Ticket) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.ticket == ticket) {
            entry.record.phase = GuessPhase::Confirmed;
        }
    }

    /// Bring the log in line with merged state: never longer than `attempts`,
    /// and hints filled in once the target is known.
    pub fn align(&mut self, attempts: u32, target: Option<&Profile>) {
        let limit = usize::try_from(attempts).unwrap_or(usize::MAX);
        if self.entries.len() > limit {
            self.entries.truncate(limit);
        }

        if let Some(target) = target {
            for entry in self.entries.iter_mut().filter(|e| e.record.hints.is_none()) {
                entry.record.hints = Some(generate_hints(&entry.record.guess, target));
            }
        }
    }

    pub fn records(&self) -> Vec<GuessRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Attributes, Association, Ecosystem, PfpTheme};

    fn profile(name: &str) -> Profile {
        Profile::new(
            name,
            name.to_lowercase(),
            Attributes {
                association: Association::Base,
                ecosystem: Ecosystem::Base,
                pfp_theme: PfpTheme::Human,
                followers: 1_000,
                age: 30,
            },
        )
    }

    fn pending(attempt: u32, name: &str) -> GuessRecord {
        GuessRecord {
            attempt,
            guess: profile(name),
            hints: None,
            phase: GuessPhase::Pending,
        }
    }

    #[test]
    fn removal_keeps_attempts_contiguous() {
        let mut log = GuessLog::new();
        log.push(10, pending(1, "a"));
        log.push(11, pending(2, "b"));
        log.push(12, pending(3, "c"));

        assert_eq!(log.remove(11).unwrap().guess.name, "b");
        let attempts: Vec<u32> = log.records().iter().map(|r| r.attempt).collect();
        assert_eq!(attempts, vec![1, 2]);
    }

    #[test]
    fn align_truncates_and_backfills() {
        let mut log = GuessLog::new();
        log.push(1, pending(1, "Target"));
        log.push(2, pending(2, "Other"));
        log.confirm(1);

        let target = profile("Target");
        log.align(1, Some(&target));

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].phase, GuessPhase::Confirmed);
        assert!(records[0].is_solved());
    }

    #[test]
    fn log_is_bounded() {
        let mut log = GuessLog::new();
        for attempt in 1..=8 {
            assert!(log.push(u64::from(attempt), pending(attempt, "x")));
        }
        assert!(!log.push(9, pending(9, "x")));
        assert_eq!(log.len(), 8);
    }
}
