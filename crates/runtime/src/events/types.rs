//! Event types for different topics.

use client_blockchain_core::TxHash;
use serde::Serialize;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Whether a notice reports ongoing work or a finished step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Transient,
    /// Superseded by the next notice of the same command
    Progress,
}

/// Non-blocking user-facing message published by the session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(level: NoticeLevel, kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
            kind,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, NoticeKind::Transient, text)
    }

    pub fn progress(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, NoticeKind::Progress, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, NoticeKind::Transient, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, NoticeKind::Transient, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, NoticeKind::Transient, text)
    }
}

/// Which command a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxAction {
    Start,
    Guess,
    Claim,
}

impl TxAction {
    pub fn label(self) -> &'static str {
        match self {
            TxAction::Start => "start",
            TxAction::Guess => "guess",
            TxAction::Claim => "claim",
        }
    }
}

/// Lifecycle stage of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStage {
    Submitted,
    Confirmed,
    Failed { reason: String },
    /// Confirmation wait timed out
    Stalled,
}

/// Events related to transactions the controller submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionEvent {
    pub action: TxAction,
    pub tx: TxHash,
    pub stage: TxStage,
}
