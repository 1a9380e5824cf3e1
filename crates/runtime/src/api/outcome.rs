//! Command results.

use client_blockchain_core::TxHash;

/// How a session command ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Transaction included and the session reconciled.
    Confirmed(TxHash),

    /// Confirmation wait timed out; the transaction is tracked as stalled and
    /// settled later by reconciliation or `resume_pending`.
    StillPending(TxHash),

    /// Preconditions not met; nothing was submitted and nothing changed.
    Ignored,
}

impl CommandOutcome {
    pub fn tx(&self) -> Option<&TxHash> {
        match self {
            CommandOutcome::Confirmed(tx) | CommandOutcome::StillPending(tx) => Some(tx),
            CommandOutcome::Ignored => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, CommandOutcome::Confirmed(_))
    }
}

/// Result of re-checking stalled transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeReport {
    pub confirmed: Vec<TxHash>,
    pub failed: Vec<TxHash>,
    pub pending: Vec<TxHash>,
}
