//! Published session view types.

use serde::Serialize;

use client_blockchain_core::{Address, RoundId, TxHash};
use game_core::{GameConfig, Hints, PlayerStatus, Profile, ProfileId, TokenAmount};

/// Whether a guess record has been confirmed on chain yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessPhase {
    Pending,
    Confirmed,
}

/// One submitted guess with its hint feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessRecord {
    /// 1-based submission order
    pub attempt: u32,
    pub guess: Profile,
    /// `None` while the assigned target cannot be resolved in the catalog
    pub hints: Option<Hints>,
    pub phase: GuessPhase,
}

impl GuessRecord {
    pub fn is_solved(&self) -> bool {
        self.hints.as_ref().is_some_and(Hints::is_solved)
    }
}

/// Conditions that stop every command until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockingCondition {
    WrongNetwork { expected: u64, actual: u64 },
    WalletDisconnected,
}

/// Merged session state observed by presentation layers.
///
/// Built from the authoritative snapshot with pending deltas applied on top;
/// every field without a live delta is the snapshot's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub account: Option<Address>,
    pub game_id: Option<RoundId>,
    pub player_status: PlayerStatus,
    pub attempts: u32,
    pub assigned_target: Option<ProfileId>,
    pub is_finalized: bool,
    pub winnings: TokenAmount,
    pub guesses: Vec<GuessRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub stalled: Vec<TxHash>,
    pub blocking: Option<BlockingCondition>,
}

impl SessionView {
    /// Guess input is live: Active, under the attempt cap, nothing blocking.
    pub fn can_guess(&self) -> bool {
        self.blocking.is_none()
            && self.player_status.accepts_guesses()
            && self.attempts < GameConfig::MAX_ATTEMPTS
    }

    pub fn is_terminal(&self) -> bool {
        self.player_status.is_terminal()
    }

    pub fn remaining_attempts(&self) -> u32 {
        GameConfig::MAX_ATTEMPTS.saturating_sub(self.attempts)
    }
}
